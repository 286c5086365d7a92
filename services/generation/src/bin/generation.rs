//! services/generation/src/bin/generation.rs
//!
//! Smoke entry point: wires the full adapter stack from the environment and
//! runs one credit-gated roadmap generation for the given user.

use generation_lib::{bootstrap, config::Config, error::GenerationError};
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), GenerationError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    bootstrap::init_tracing(&config);
    info!("Configuration loaded.");

    let mut args = std::env::args().skip(1);
    let (user_id, title) = match (args.next(), args.next()) {
        (Some(user_arg), Some(title)) => match user_arg.parse::<Uuid>() {
            Ok(user_id) => (user_id, title),
            Err(_) => {
                eprintln!("'{user_arg}' is not a valid user UUID");
                std::process::exit(2);
            }
        },
        _ => {
            eprintln!("usage: generation <user-uuid> <roadmap-title>");
            std::process::exit(2);
        }
    };

    // --- 2. Wire the Adapter Stack ---
    let actions = bootstrap::build_actions(&config).await?;

    // --- 3. Run One Roadmap Generation ---
    let roadmap = actions.create_roadmap(user_id, &title).await?;
    println!("{}", serde_json::to_string_pretty(&roadmap).unwrap());

    Ok(())
}
