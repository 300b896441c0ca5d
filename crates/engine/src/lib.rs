//! Command-interpretation and ledger-mutation engine for khata.
//!
//! A raw chat line goes through four stages: [`normalize`], [`classify`],
//! validation, and the ledger operations on [`Engine`]. Each stage is a pure
//! function over its inputs plus the database; nothing is cached between
//! messages.

pub use error::EngineError;
pub use handler::{MessageEnvelope, Reply, ReplyKind};
pub use intent::{CardMetric, Intent, RelativePeriod, SummaryPeriod, classify};
pub use money::Money;
pub use ops::{
    CategoryTotal, CreditSnapshot, Engine, EngineBuilder, ExpenseUpdateFields, ListedExpense,
    LoanPaymentOutcome, LoanUpsertOutcome, idempotency_key, local_today,
};
pub use text::normalize;

pub mod accounts;
pub mod cards;
pub mod categories;
mod error;
pub mod expenses;
mod handler;
mod help;
mod intent;
pub mod loan_payments;
pub mod loans;
pub mod messages;
mod money;
mod ops;
mod render;
mod text;
pub mod users;
mod validate;

type ResultEngine<T> = Result<T, EngineError>;
