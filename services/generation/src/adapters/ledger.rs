//! services/generation/src/adapters/ledger.rs
//!
//! This module contains the credit-ledger adapters. The Postgres adapter is
//! the production implementation of the `CreditLedger` port; the conditional
//! decrement runs as a single UPDATE so concurrent requests cannot both pass
//! a stale sufficiency check. An in-memory implementation is provided for
//! tests and local experiments.

use async_trait::async_trait;
use courseforge_core::ports::{CreditLedger, PortError, PortResult};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

//=========================================================================================
// Postgres Adapter
//=========================================================================================

/// A ledger adapter backed by the `user_credits` table.
#[derive(Clone)]
pub struct PostgresLedgerAdapter {
    pool: PgPool,
}

impl PostgresLedgerAdapter {
    /// Creates a new `PostgresLedgerAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CreditLedger for PostgresLedgerAdapter {
    async fn balance(&self, user_id: Uuid) -> PortResult<u32> {
        let credits: Option<i32> =
            sqlx::query_scalar("SELECT credits FROM user_credits WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

        match credits {
            Some(credits) => Ok(credits.max(0) as u32),
            None => Err(PortError::NotFound(format!(
                "no credit account for user {user_id}"
            ))),
        }
    }

    async fn try_debit(&self, user_id: Uuid, amount: u32) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE user_credits SET credits = credits - $1 WHERE user_id = $2 AND credits >= $1",
        )
        .bind(amount as i32)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}

//=========================================================================================
// In-Memory Adapter
//=========================================================================================

/// A process-local ledger with the same atomicity contract, for tests and
/// local experiments.
#[derive(Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<Uuid, u32>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's balance, creating the account if needed.
    pub fn grant(&self, user_id: Uuid, credits: u32) {
        self.lock().insert(user_id, credits);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, u32>> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn balance(&self, user_id: Uuid) -> PortResult<u32> {
        self.lock()
            .get(&user_id)
            .copied()
            .ok_or_else(|| PortError::NotFound(format!("no credit account for user {user_id}")))
    }

    async fn try_debit(&self, user_id: Uuid, amount: u32) -> PortResult<bool> {
        let mut accounts = self.lock();
        let balance = accounts
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("no credit account for user {user_id}")))?;

        if *balance < amount {
            return Ok(false);
        }
        *balance -= amount;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryLedger;
    use courseforge_core::ports::CreditLedger;
    use uuid::Uuid;

    #[tokio::test]
    async fn debit_stops_at_the_floor() {
        let ledger = InMemoryLedger::new();
        let user = Uuid::new_v4();
        ledger.grant(user, 30);

        assert!(ledger.try_debit(user, 25).await.unwrap());
        assert_eq!(ledger.balance(user).await.unwrap(), 5);
        assert!(!ledger.try_debit(user, 25).await.unwrap());
        assert_eq!(ledger.balance(user).await.unwrap(), 5);
    }
}
