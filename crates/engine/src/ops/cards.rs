use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Money, ResultEngine,
    cards::{self, statement_window},
    users,
};

use super::{Engine, with_tx};

/// Card metrics derived for a credit query: outstanding over the current
/// statement window and the credit left under the limit.
#[derive(Clone, Debug)]
pub struct CreditSnapshot {
    pub card: cards::Model,
    pub outstanding: Money,
    pub available: Money,
}

impl Engine {
    /// Explicit upsert by the `(user, issuer, last4)` natural key.
    ///
    /// On an existing card only the supplied fields are overwritten; a
    /// missing `cycle` never blanks out a stored billing cycle day.
    pub async fn upsert_card(
        &self,
        user: &users::Model,
        issuer: &str,
        credit_limit: Money,
        billing_cycle_day: Option<u8>,
        last4: Option<&str>,
    ) -> ResultEngine<(cards::Model, bool)> {
        with_tx!(self, |db_tx| {
            let key_last4 = last4.unwrap_or("");
            let existing = cards::Entity::find()
                .filter(cards::Column::UserId.eq(user.id))
                .filter(cards::Column::Issuer.eq(issuer.trim()))
                .filter(cards::Column::Last4.eq(key_last4))
                .one(&db_tx)
                .await?;

            match existing {
                None => {
                    let active = cards::ActiveModel {
                        user_id: ActiveValue::Set(user.id),
                        issuer: ActiveValue::Set(issuer.trim().to_string()),
                        last4: ActiveValue::Set(key_last4.to_string()),
                        billing_cycle_day: ActiveValue::Set(
                            i32::from(billing_cycle_day.unwrap_or(1)),
                        ),
                        credit_limit_minor: ActiveValue::Set(credit_limit.minor()),
                        created_at: ActiveValue::Set(Utc::now()),
                        ..Default::default()
                    };
                    Ok((active.insert(&db_tx).await?, true))
                }
                Some(card) => {
                    let new_cycle = billing_cycle_day
                        .map(i32::from)
                        .unwrap_or(card.billing_cycle_day);
                    if card.credit_limit_minor == credit_limit.minor()
                        && card.billing_cycle_day == new_cycle
                    {
                        return Ok((card, false));
                    }
                    let mut active: cards::ActiveModel = card.into();
                    active.credit_limit_minor = ActiveValue::Set(credit_limit.minor());
                    active.billing_cycle_day = ActiveValue::Set(new_cycle);
                    Ok((active.update(&db_tx).await?, false))
                }
            }
        })
    }

    /// Outstanding/due/available-credit figures for a card.
    ///
    /// `today` is injected by the caller so window math stays testable.
    pub async fn credit_snapshot(
        &self,
        user: &users::Model,
        issuer: &str,
        last4: Option<&str>,
        today: NaiveDate,
    ) -> ResultEngine<CreditSnapshot> {
        let card = find_card(&self.database, user.id, issuer, last4)
            .await?
            .ok_or_else(|| {
                EngineError::NotFound(format!("No card named {} found.", issuer.trim()))
            })?;

        let (start, end) = statement_window(card.billing_cycle_day, today);
        let outstanding = card_outstanding(&self.database, card.id, start, end).await?;
        let available = Money::new(card.credit_limit_minor) - outstanding;
        Ok(CreditSnapshot {
            card,
            outstanding,
            available,
        })
    }

    /// All cards of a user, ordered by issuer then last4.
    pub async fn list_cards(&self, user: &users::Model) -> ResultEngine<Vec<cards::Model>> {
        let cards = cards::Entity::find()
            .filter(cards::Column::UserId.eq(user.id))
            .order_by_asc(cards::Column::Issuer)
            .order_by_asc(cards::Column::Last4)
            .all(&self.database)
            .await?;
        Ok(cards)
    }
}

/// Finds a card by issuer, optionally narrowed by last4.
///
/// Several cards under one issuer without a last4 to disambiguate is a
/// validation failure, never a silent pick.
pub(super) async fn find_card<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    issuer: &str,
    last4: Option<&str>,
) -> ResultEngine<Option<cards::Model>> {
    let mut query = cards::Entity::find()
        .filter(cards::Column::UserId.eq(user_id))
        .filter(cards::Column::Issuer.eq(issuer.trim()));
    if let Some(last4) = last4 {
        query = query.filter(cards::Column::Last4.eq(last4));
    }

    let mut matches = query.all(conn).await?;
    if matches.len() > 1 {
        return Err(EngineError::Validation(format!(
            "Multiple cards found for {}. Specify last4.",
            issuer.trim()
        )));
    }
    Ok(matches.pop())
}

/// Get-or-create used by expense creation; an unknown card is materialized
/// with a zero limit rather than rejecting the spend.
pub(super) async fn resolve_card<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    issuer: &str,
    last4: Option<&str>,
) -> ResultEngine<cards::Model> {
    if let Some(card) = find_card(conn, user_id, issuer, last4).await? {
        return Ok(card);
    }

    let active = cards::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        issuer: ActiveValue::Set(issuer.trim().to_string()),
        last4: ActiveValue::Set(last4.unwrap_or("").to_string()),
        billing_cycle_day: ActiveValue::Set(1),
        credit_limit_minor: ActiveValue::Set(0),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

async fn card_outstanding<C: ConnectionTrait>(
    conn: &C,
    card_id: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> ResultEngine<Money> {
    let stmt = Statement::from_sql_and_values(
        conn.get_database_backend(),
        "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
         FROM expenses \
         WHERE source_card_id = ? AND date >= ? AND date <= ?",
        vec![card_id.into(), start.into(), end.into()],
    );
    let row = conn.query_one(stmt).await?;
    let total: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
    Ok(Money::new(total))
}
