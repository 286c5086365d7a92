//! services/generation/src/adapters/stt.rs
//!
//! This module contains the adapter for Groq's Whisper speech-to-text
//! endpoint. It implements the `SpeechToTextService` port from the `core`
//! crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::audio::{AudioInput, CreateTranscriptionRequest},
    Client,
};
use async_trait::async_trait;
use courseforge_core::ports::{PortError, PortResult, SpeechToTextService};
use hound::{WavSpec, WavWriter};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechToTextService` port using the
/// Whisper transcription endpoint.
#[derive(Clone)]
pub struct GroqSttAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqSttAdapter {
    /// Creates a new `GroqSttAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn pcm16_to_wav(pcm_data: &[u8], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
        let mut cursor = std::io::Cursor::new(Vec::new());

        let spec = WavSpec {
            channels: 1, // Mono
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::new(&mut cursor, spec)?;

        // Convert byte array to i16 samples
        for chunk in pcm_data.chunks_exact(2) {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            writer.write_sample(sample)?;
        }

        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}

//=========================================================================================
// `SpeechToTextService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechToTextService for GroqSttAdapter {
    /// Transcribes a slice of raw PCM16 audio into text using the configured
    /// Whisper model. A non-success response fails fast; no retry, no
    /// partial result.
    async fn transcribe_audio(&self, audio_data: &[u8]) -> PortResult<String> {
        let wav_data = Self::pcm16_to_wav(audio_data, 48000)
            .map_err(|e| PortError::Transcription(format!("Failed to encode WAV: {}", e)))?;

        let input = AudioInput::from_vec_u8("user_audio.wav".into(), wav_data);

        let request = CreateTranscriptionRequest {
            file: input,
            model: self.model.clone(),
            language: Some("en".to_string()),
            temperature: Some(0.0),
            ..Default::default()
        };

        let response = self
            .client
            .audio()
            .transcription()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Transcription(e.to_string()))?;

        Ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::GroqSttAdapter;

    #[test]
    fn wraps_pcm16_samples_in_a_wav_container() {
        // Two little-endian samples: 1 and -2.
        let pcm: [u8; 4] = [0x01, 0x00, 0xFE, 0xFF];
        let wav = GroqSttAdapter::pcm16_to_wav(&pcm, 48000).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let mut reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48000);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![1, -2]);
    }
}
