use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Money, ResultEngine, accounts,
    accounts::AccountKind,
    cards, categories,
    expenses::{self, SourceType},
    users,
};

use super::{
    Engine,
    accounts::{apply_balance_delta, get_or_create_account},
    cards::resolve_card,
    categories::resolve_category,
    with_tx,
};

/// Page size for transaction listings.
const LIST_LIMIT: u64 = 10;

/// Optional field patches for an expense update. Absent fields keep the
/// stored value; the source is only reassigned when both `source` and
/// `source_type` are present.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdateFields {
    pub amount: Option<Money>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub source_type: Option<SourceType>,
    pub card_last4: Option<String>,
    pub date: Option<NaiveDate>,
}

/// An expense joined with the names needed to render a listing line.
#[derive(Clone, Debug)]
pub struct ListedExpense {
    pub expense: expenses::Model,
    pub category_name: Option<String>,
    pub source_label: String,
}

fn account_kind_for(source_type: SourceType) -> AccountKind {
    match source_type {
        SourceType::Cash => AccountKind::Cash,
        _ => AccountKind::Bank,
    }
}

impl Engine {
    /// Creates an expense and applies its balance effect in one transaction.
    ///
    /// Category, account and card references are resolved get-or-create by
    /// natural key. Spending from an account or cash decreases the stored
    /// balance; card spending has no stored effect (outstanding is derived).
    #[allow(clippy::too_many_arguments)]
    pub async fn create_expense(
        &self,
        user: &users::Model,
        amount: Money,
        currency: Option<&str>,
        category: &str,
        source: &str,
        source_type: SourceType,
        card_last4: Option<&str>,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> ResultEngine<(expenses::Model, Option<accounts::Model>, String)> {
        with_tx!(self, |db_tx| {
            let category = resolve_category(&db_tx, user.id, category).await?;

            let mut source_account = None;
            let mut source_card = None;
            if source_type.is_account_backed() {
                source_account = Some(
                    get_or_create_account(&db_tx, user.id, source, account_kind_for(source_type))
                        .await?,
                );
            } else {
                source_card = Some(resolve_card(&db_tx, user.id, source, card_last4).await?);
            }

            let now = Utc::now();
            let active = expenses::ActiveModel {
                user_id: ActiveValue::Set(user.id),
                amount_minor: ActiveValue::Set(amount.minor()),
                currency: ActiveValue::Set(
                    currency.unwrap_or(&user.default_currency).to_string(),
                ),
                date: ActiveValue::Set(date.unwrap_or(today)),
                category_id: ActiveValue::Set(Some(category.id)),
                source_type: ActiveValue::Set(source_type.as_str().to_string()),
                source_account_id: ActiveValue::Set(source_account.as_ref().map(|a| a.id)),
                source_card_id: ActiveValue::Set(source_card.as_ref().map(|c| c.id)),
                note: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            let expense = active.insert(&db_tx).await?;

            let account = match source_account {
                Some(account) => {
                    Some(apply_balance_delta(&db_tx, account.id, -amount.minor()).await?)
                }
                None => None,
            };

            tracing::info!(expense_id = expense.id, source = source_type.as_str(), "expense created");
            Ok((expense, account, category.name))
        })
    }

    /// Updates an expense, reconciling account balances with two explicit
    /// sequenced deltas inside the same transaction: credit the prior linked
    /// account by the prior amount, debit the new linked account by the new
    /// amount. When only non-monetary fields change the two deltas cancel
    /// exactly.
    pub async fn update_expense(
        &self,
        user: &users::Model,
        expense_id: i32,
        fields: ExpenseUpdateFields,
    ) -> ResultEngine<(expenses::Model, Option<accounts::Model>)> {
        with_tx!(self, |db_tx| {
            let expense = expenses::Entity::find_by_id(expense_id)
                .filter(expenses::Column::UserId.eq(user.id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("Expense not found.".to_string()))?;

            let prior_account_id = expense.source_account_id;
            let prior_amount = expense.amount_minor;

            let mut active: expenses::ActiveModel = expense.into();
            if let Some(amount) = fields.amount {
                active.amount_minor = ActiveValue::Set(amount.minor());
            }
            if let Some(currency) = &fields.currency {
                active.currency = ActiveValue::Set(currency.clone());
            }
            if let Some(date) = fields.date {
                active.date = ActiveValue::Set(date);
            }
            if let Some(category) = &fields.category {
                let category = resolve_category(&db_tx, user.id, category).await?;
                active.category_id = ActiveValue::Set(Some(category.id));
            }
            if let (Some(source), Some(source_type)) = (&fields.source, fields.source_type) {
                if source_type.is_account_backed() {
                    let account = get_or_create_account(
                        &db_tx,
                        user.id,
                        source,
                        account_kind_for(source_type),
                    )
                    .await?;
                    active.source_account_id = ActiveValue::Set(Some(account.id));
                    active.source_card_id = ActiveValue::Set(None);
                } else {
                    let card = resolve_card(
                        &db_tx,
                        user.id,
                        source,
                        fields.card_last4.as_deref(),
                    )
                    .await?;
                    active.source_card_id = ActiveValue::Set(Some(card.id));
                    active.source_account_id = ActiveValue::Set(None);
                }
                active.source_type = ActiveValue::Set(source_type.as_str().to_string());
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let updated = active.update(&db_tx).await?;

            // Reconciliation skips a side whose reference was nulled by a
            // source deletion; the prior delta is no longer attributable.
            if let Some(prior_id) = prior_account_id {
                apply_balance_delta(&db_tx, prior_id, prior_amount).await?;
            }
            let account = match updated.source_account_id {
                Some(new_id) => {
                    Some(apply_balance_delta(&db_tx, new_id, -updated.amount_minor).await?)
                }
                None => None,
            };

            tracing::info!(expense_id = updated.id, "expense updated");
            Ok((updated, account))
        })
    }

    /// Deletes an expense, reversing its balance effect on the linked
    /// account first. Returns the refreshed account for the reply snapshot.
    pub async fn delete_expense(
        &self,
        user: &users::Model,
        expense_id: i32,
    ) -> ResultEngine<Option<accounts::Model>> {
        with_tx!(self, |db_tx| {
            let expense = expenses::Entity::find_by_id(expense_id)
                .filter(expenses::Column::UserId.eq(user.id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("Expense not found.".to_string()))?;

            let account = match expense.source_account_id {
                Some(account_id) => {
                    Some(apply_balance_delta(&db_tx, account_id, expense.amount_minor).await?)
                }
                None => None,
            };

            expenses::Entity::delete_by_id(expense.id).exec(&db_tx).await?;
            tracing::info!(expense_id, "expense deleted");
            Ok(account)
        })
    }

    /// Most recent expenses, by date then id descending, capped at the
    /// fixed page size.
    pub async fn list_expenses(&self, user: &users::Model) -> ResultEngine<Vec<ListedExpense>> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user.id))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .limit(LIST_LIMIT)
            .all(&self.database)
            .await?;

        let category_ids: Vec<i32> = rows.iter().filter_map(|e| e.category_id).collect();
        let account_ids: Vec<i32> = rows.iter().filter_map(|e| e.source_account_id).collect();
        let card_ids: Vec<i32> = rows.iter().filter_map(|e| e.source_card_id).collect();

        let categories: HashMap<i32, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let accounts: HashMap<i32, String> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect();
        let cards: HashMap<i32, String> = cards::Entity::find()
            .filter(cards::Column::Id.is_in(card_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|c| (c.id, c.issuer))
            .collect();

        let listed = rows
            .into_iter()
            .map(|expense| {
                let category_name = expense
                    .category_id
                    .and_then(|id| categories.get(&id).cloned());
                let source_label = match (
                    expense.source_account_id.and_then(|id| accounts.get(&id)),
                    expense.source_card_id.and_then(|id| cards.get(&id)),
                ) {
                    (Some(name), _) => format!("{name} {}", expense.source_type),
                    (None, Some(issuer)) => format!("{issuer} card"),
                    (None, None) => "unknown".to_string(),
                };
                ListedExpense {
                    expense,
                    category_name,
                    source_label,
                }
            })
            .collect();
        Ok(listed)
    }
}
