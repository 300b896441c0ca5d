//! Field and business-rule validation, run strictly between classification
//! and the first write.

use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Statement};

use crate::{EngineError, Intent, Money, ResultEngine, ops::Engine, users};

/// Window of the soft duplicate-expense guard.
const DUPLICATE_WINDOW_MINUTES: i64 = 10;

fn positive(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::Validation(
            "Amount must be greater than zero.".to_string(),
        ));
    }
    Ok(())
}

/// Checks every field constraint for the intent; any failure carries the
/// user-facing reason. The grammar already guarantees most of these, but
/// the validator owns the rules so a grammar change cannot silently admit
/// bad writes.
pub(crate) async fn validate(
    engine: &Engine,
    user: &users::Model,
    intent: &Intent,
) -> ResultEngine<()> {
    match intent {
        Intent::ExpenseCreate {
            amount,
            category,
            source,
            ..
        } => {
            positive(*amount)?;
            if category.is_empty() || source.is_empty() {
                return Err(EngineError::Validation(
                    "Missing category or source.".to_string(),
                ));
            }
            duplicate_guard(engine, user, *amount, category, source).await
        }
        Intent::ExpenseUpdate {
            expense_id, amount, ..
        } => {
            let amount = amount.ok_or_else(|| {
                EngineError::Validation("Missing amount.".to_string())
            })?;
            positive(amount)?;
            if *expense_id <= 0 {
                return Err(EngineError::Validation("Missing expense id.".to_string()));
            }
            Ok(())
        }
        Intent::ExpenseDelete { expense_id } => {
            if *expense_id <= 0 {
                return Err(EngineError::Validation("Missing expense id.".to_string()));
            }
            Ok(())
        }
        Intent::AccountUpsert { balance, .. } => {
            if balance.minor() < 0 {
                return Err(EngineError::Validation(
                    "Balance must not be negative.".to_string(),
                ));
            }
            Ok(())
        }
        Intent::CardUpsert {
            credit_limit,
            billing_cycle_day,
            ..
        } => {
            if !credit_limit.is_positive() {
                return Err(EngineError::Validation(
                    "Credit limit must be greater than zero.".to_string(),
                ));
            }
            if let Some(day) = billing_cycle_day {
                if !(1..=31).contains(day) {
                    return Err(EngineError::Validation(
                        "Billing cycle day must be between 1 and 31.".to_string(),
                    ));
                }
            }
            Ok(())
        }
        Intent::LoanUpsert { name, amount, .. }
        | Intent::LoanPayment { name, amount, .. } => {
            positive(*amount)?;
            if name.is_empty() {
                return Err(EngineError::Validation("Missing loan name.".to_string()));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Soft guard against accidental resubmission: an expense by the same user
/// with the same amount, category name and source within the trailing
/// window is treated as a likely duplicate. Normalization lowercases the
/// command, so plain equality on the stored names is case-insensitive
/// equality on the input.
async fn duplicate_guard(
    engine: &Engine,
    user: &users::Model,
    amount: Money,
    category: &str,
    source: &str,
) -> ResultEngine<()> {
    let since = Utc::now() - Duration::minutes(DUPLICATE_WINDOW_MINUTES);
    let stmt = Statement::from_sql_and_values(
        engine.database.get_database_backend(),
        "SELECT COUNT(*) AS n \
         FROM expenses e \
         LEFT JOIN categories c ON c.id = e.category_id \
         LEFT JOIN accounts a ON a.id = e.source_account_id \
         LEFT JOIN cards k ON k.id = e.source_card_id \
         WHERE e.user_id = ? AND e.amount_minor = ? AND e.created_at >= ? \
           AND c.name = ? AND COALESCE(a.name, k.issuer) = ?",
        vec![
            user.id.into(),
            amount.minor().into(),
            since.into(),
            category.into(),
            source.into(),
        ],
    );
    let row = engine.database.query_one(stmt).await?;
    let matches: i64 = row.and_then(|r| r.try_get("", "n").ok()).unwrap_or(0);
    if matches > 0 {
        return Err(EngineError::Validation(
            "Potential duplicate detected. Please confirm.".to_string(),
        ));
    }
    Ok(())
}
