//! Message intake and dispatch: the single entry point a transport calls
//! per inbound message.

use chrono::Datelike;

use crate::{
    EngineError, Intent, ResultEngine,
    accounts::AccountKind,
    expenses::SourceType,
    help,
    intent::{CardMetric, RelativePeriod, SummaryPeriod, classify},
    messages::MessageStatus,
    ops::{
        Engine, ExpenseUpdateFields, LoanPaymentOutcome, idempotency_key, local_today,
        reports::{month_window, relative_month},
    },
    render,
    text::normalize,
    users,
    validate::validate,
};

/// Inbound message as handed over by the transport.
#[derive(Clone, Debug)]
pub struct MessageEnvelope {
    pub sender_id: String,
    pub text: String,
    /// Transport-level message id; used verbatim as the idempotency key
    /// when present.
    pub message_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Processed,
    Rejected,
    /// The idempotency key was already seen; nothing was reprocessed.
    Duplicate,
}

/// The single plain-text reply for one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

fn account_kind(source_type: SourceType) -> AccountKind {
    match source_type {
        SourceType::Cash => AccountKind::Cash,
        _ => AccountKind::Bank,
    }
}

/// Sender ids are phone-number-like and must not appear verbatim in logs.
fn mask_sender(sender: &str) -> String {
    let chars: Vec<char> = sender.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}

impl Engine {
    /// Processes one inbound message end to end and returns its reply.
    ///
    /// Routing, validation and lookup failures are terminal replies: the
    /// message is marked `rejected` and the error text goes back to the
    /// sender, with no mutation having occurred. A storage failure marks
    /// the message `failed` (best effort) and propagates; the transport
    /// owns the generic retry text for that case.
    pub async fn process_message(&self, envelope: &MessageEnvelope) -> ResultEngine<Reply> {
        let user = self.user_by_sender(&envelope.sender_id).await?;
        let key = idempotency_key(
            envelope.message_id.as_deref(),
            &envelope.sender_id,
            &envelope.text,
        );

        let Some(message) = self.intake_message(&user, &envelope.text, &key).await? else {
            tracing::info!(sender = %mask_sender(&envelope.sender_id), "duplicate delivery ignored");
            return Ok(Reply {
                kind: ReplyKind::Duplicate,
                text: render::duplicate(),
            });
        };

        match self.classify_and_handle(&user, &envelope.text).await {
            Ok((intent_name, text)) => {
                self.mark_message(message.id, MessageStatus::Processed, Some(intent_name))
                    .await?;
                tracing::info!(
                    sender = %mask_sender(&envelope.sender_id),
                    intent = intent_name,
                    "message processed"
                );
                Ok(Reply {
                    kind: ReplyKind::Processed,
                    text,
                })
            }
            Err(EngineError::Database(err)) => {
                if let Err(mark_err) = self
                    .mark_message(message.id, MessageStatus::Failed, None)
                    .await
                {
                    tracing::error!(error = %mark_err, "could not mark message failed");
                }
                tracing::error!(
                    sender = %mask_sender(&envelope.sender_id),
                    error = %err,
                    "message processing failed"
                );
                Err(EngineError::Database(err))
            }
            Err(err) => {
                self.mark_message(message.id, MessageStatus::Rejected, None)
                    .await?;
                tracing::warn!(
                    sender = %mask_sender(&envelope.sender_id),
                    reason = %err,
                    "message rejected"
                );
                Ok(Reply {
                    kind: ReplyKind::Rejected,
                    text: err.to_string(),
                })
            }
        }
    }

    async fn classify_and_handle(
        &self,
        user: &users::Model,
        raw_text: &str,
    ) -> ResultEngine<(&'static str, String)> {
        let normalized = normalize(raw_text);
        let intent = classify(&normalized)?;
        validate(self, user, &intent).await?;
        let intent_name = intent.name();
        let text = self.handle_intent(user, intent).await?;
        Ok((intent_name, text))
    }

    async fn handle_intent(&self, user: &users::Model, intent: Intent) -> ResultEngine<String> {
        let today = local_today(&user.timezone);
        let currency = user.default_currency.as_str();

        match intent {
            Intent::ExpenseCreate {
                amount,
                currency: expense_currency,
                category,
                source,
                source_type,
                card_last4,
                date,
            } => {
                let (expense, account, category_name) = self
                    .create_expense(
                        user,
                        amount,
                        expense_currency.as_deref(),
                        &category,
                        &source,
                        source_type,
                        card_last4.as_deref(),
                        date,
                        today,
                    )
                    .await?;
                Ok(render::expense_created(
                    &expense,
                    &category_name,
                    account.as_ref(),
                    currency,
                ))
            }
            Intent::ExpenseUpdate {
                expense_id,
                amount,
                currency: expense_currency,
                category,
                source,
                source_type,
                card_last4,
                date,
            } => {
                let fields = ExpenseUpdateFields {
                    amount,
                    currency: expense_currency,
                    category,
                    source,
                    source_type,
                    card_last4,
                    date,
                };
                let (expense, account) = self.update_expense(user, expense_id, fields).await?;
                Ok(render::expense_updated(&expense, account.as_ref(), currency))
            }
            Intent::ExpenseDelete { expense_id } => {
                let account = self.delete_expense(user, expense_id).await?;
                Ok(render::expense_deleted(expense_id, account.as_ref(), currency))
            }
            Intent::BalanceQuery {
                source,
                source_type,
                card_last4,
            } => {
                if source_type == SourceType::Card {
                    let snapshot = self
                        .credit_snapshot(user, &source, card_last4.as_deref(), today)
                        .await?;
                    return Ok(render::credit_summary(
                        &snapshot,
                        CardMetric::Outstanding,
                        currency,
                    ));
                }
                let kind = account_kind(source_type);
                let account = self.account_balance(user, &source, kind).await?;
                Ok(render::balance_summary(account.as_ref(), &source, kind, currency))
            }
            Intent::SummaryQuery { period } => match period {
                SummaryPeriod::Month { name, number, year } => {
                    let year = year.unwrap_or_else(|| today.year());
                    let (start, end) = month_window(year, number).ok_or_else(|| {
                        EngineError::Validation("Invalid month.".to_string())
                    })?;
                    let total = self.sum_expenses(user, start, end).await?;
                    Ok(render::month_summary(&name, year, total, currency))
                }
                SummaryPeriod::Relative(relative) => {
                    let offset = match relative {
                        RelativePeriod::ThisMonth => 0,
                        RelativePeriod::LastMonth => 1,
                    };
                    let (start, end) = relative_month(today, offset).ok_or_else(|| {
                        EngineError::Validation("Invalid month.".to_string())
                    })?;
                    let total = self.sum_expenses(user, start, end).await?;
                    Ok(render::relative_summary(relative, total, currency))
                }
            },
            Intent::CreditCardQuery {
                metric,
                source,
                card_last4,
            } => {
                let snapshot = self
                    .credit_snapshot(user, &source, card_last4.as_deref(), today)
                    .await?;
                Ok(render::credit_summary(&snapshot, metric, currency))
            }
            Intent::AccountList => {
                let accounts = self.list_accounts(user).await?;
                Ok(render::account_list(&accounts, currency))
            }
            Intent::CardList => {
                let cards = self.list_cards(user).await?;
                Ok(render::card_list(&cards))
            }
            Intent::TransactionList => {
                let expenses = self.list_expenses(user).await?;
                Ok(render::transaction_list(&expenses))
            }
            Intent::CategoryList => {
                let categories = self.list_categories(user).await?;
                Ok(render::category_list(&categories, currency))
            }
            Intent::LoanList => {
                let loans = self.list_loans(user).await?;
                Ok(render::loan_list(&loans, currency))
            }
            Intent::LoanUpsert {
                name,
                amount,
                description,
            } => {
                let outcome = self
                    .upsert_loan(user, &name, description.as_deref(), amount)
                    .await?;
                Ok(render::loan_upserted(
                    &outcome.loan,
                    outcome.created,
                    outcome.reopened,
                    currency,
                ))
            }
            Intent::LoanPayment { name, amount, date } => {
                let outcome = self
                    .pay_loan(user, &name, amount, date.unwrap_or(today))
                    .await?;
                match outcome {
                    LoanPaymentOutcome::AlreadyPaid(loan) => Ok(render::loan_already_paid(&loan)),
                    LoanPaymentOutcome::Recorded { loan, paid } => {
                        Ok(render::loan_paid(&loan, paid, currency))
                    }
                }
            }
            Intent::AccountUpsert {
                name,
                kind,
                balance,
            } => {
                let (account, created) = self.upsert_account(user, &name, kind, balance).await?;
                Ok(render::account_upserted(&account, created, currency))
            }
            Intent::CardUpsert {
                issuer,
                credit_limit,
                billing_cycle_day,
                last4,
            } => {
                let (card, created) = self
                    .upsert_card(user, &issuer, credit_limit, billing_cycle_day, last4.as_deref())
                    .await?;
                Ok(render::card_upserted(&card, created, currency))
            }
            Intent::CurrencySet { code } => {
                let (normalized, changed) = self.set_default_currency(user, &code).await?;
                Ok(render::currency_set(&normalized, changed))
            }
            Intent::Help { topic } => Ok(help::text(topic.as_deref())),
        }
    }
}
