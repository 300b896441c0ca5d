//! Ledger operations. Each mutating op runs inside one storage transaction
//! so a balance adjustment and its owning record change are never observed
//! independently.

use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};

use crate::ResultEngine;

mod accounts;
mod cards;
mod categories;
mod expenses;
mod loans;
mod messages;
pub(crate) mod reports;
mod users;

pub use cards::CreditSnapshot;
pub use categories::CategoryTotal;
pub use expenses::{ExpenseUpdateFields, ListedExpense};
pub use loans::{LoanPaymentOutcome, LoanUpsertOutcome};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    pub(crate) database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

/// Idempotency key for an inbound message: the transport's message id when
/// present, otherwise a stable hash of the sender and text.
#[must_use]
pub fn idempotency_key(message_id: Option<&str>, sender_id: &str, text: &str) -> String {
    if let Some(id) = message_id {
        return id.to_string();
    }
    let mut hasher = Sha256::new();
    hasher.update(sender_id.as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Current date in the given IANA timezone, falling back to UTC when the
/// stored name does not resolve.
#[must_use]
pub fn local_today(timezone: &str) -> NaiveDate {
    timezone
        .parse::<chrono_tz::Tz>()
        .map(|tz| Utc::now().with_timezone(&tz).date_naive())
        .unwrap_or_else(|_| Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_is_used_verbatim() {
        assert_eq!(idempotency_key(Some("SM123"), "u", "text"), "SM123");
    }

    #[test]
    fn fallback_key_is_stable_and_sender_scoped() {
        let a = idempotency_key(None, "alice", "balance of sbi account");
        let b = idempotency_key(None, "alice", "balance of sbi account");
        let c = idempotency_key(None, "bob", "balance of sbi account");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
