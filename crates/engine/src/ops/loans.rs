use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Money, ResultEngine, loan_payments,
    loans::{self, LoanStatus},
    users,
};

use super::{Engine, with_tx};

/// Result of a loan upsert. `reopened` is set when a principal raise brought
/// a fully repaid loan back to active.
#[derive(Clone, Debug)]
pub struct LoanUpsertOutcome {
    pub loan: loans::Model,
    pub created: bool,
    pub reopened: bool,
}

/// Result of a repayment attempt.
#[derive(Clone, Debug)]
pub enum LoanPaymentOutcome {
    /// Outstanding was already zero; no payment row is written.
    AlreadyPaid(loans::Model),
    /// `paid` is the applied amount, clamped to the outstanding balance.
    Recorded { loan: loans::Model, paid: Money },
}

impl Engine {
    /// Creates a loan or revises an existing one's principal, keyed by name.
    ///
    /// Raising the principal adds the difference to the outstanding balance
    /// and reactivates a paid loan; lowering it clamps the outstanding down
    /// to the new principal. Payment history is never rewritten.
    pub async fn upsert_loan(
        &self,
        user: &users::Model,
        name: &str,
        description: Option<&str>,
        principal: Money,
    ) -> ResultEngine<LoanUpsertOutcome> {
        with_tx!(self, |db_tx| {
            let existing = loans::Entity::find()
                .filter(loans::Column::UserId.eq(user.id))
                .filter(loans::Column::Name.eq(name))
                .one(&db_tx)
                .await?;

            match existing {
                None => {
                    let loan = loans::ActiveModel {
                        user_id: ActiveValue::Set(user.id),
                        name: ActiveValue::Set(name.to_string()),
                        description: ActiveValue::Set(
                            description.unwrap_or_default().to_string(),
                        ),
                        principal_minor: ActiveValue::Set(principal.minor()),
                        outstanding_minor: ActiveValue::Set(principal.minor()),
                        status: ActiveValue::Set(LoanStatus::Active.as_str().to_string()),
                        created_at: ActiveValue::Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(&db_tx)
                    .await?;
                    tracing::info!(loan_id = loan.id, "loan created");
                    Ok(LoanUpsertOutcome {
                        loan,
                        created: true,
                        reopened: false,
                    })
                }
                Some(loan) => {
                    let delta = principal.minor() - loan.principal_minor;
                    let outstanding = if delta >= 0 {
                        loan.outstanding_minor + delta
                    } else {
                        loan.outstanding_minor.min(principal.minor())
                    };
                    let was_paid = loan.status == LoanStatus::Paid.as_str();
                    let status = if outstanding == 0 {
                        LoanStatus::Paid
                    } else {
                        LoanStatus::Active
                    };
                    let reopened = was_paid && outstanding > 0;

                    let mut active: loans::ActiveModel = loan.into();
                    active.principal_minor = ActiveValue::Set(principal.minor());
                    active.outstanding_minor = ActiveValue::Set(outstanding);
                    active.status = ActiveValue::Set(status.as_str().to_string());
                    if let Some(description) = description.filter(|d| !d.is_empty()) {
                        active.description = ActiveValue::Set(description.to_string());
                    }
                    let loan = active.update(&db_tx).await?;
                    tracing::info!(loan_id = loan.id, reopened, "loan revised");
                    Ok(LoanUpsertOutcome {
                        loan,
                        created: false,
                        reopened,
                    })
                }
            }
        })
    }

    /// Records a repayment against a loan, clamping the applied amount to
    /// the outstanding balance. A loan with nothing outstanding gets no
    /// payment row.
    pub async fn pay_loan(
        &self,
        user: &users::Model,
        name: &str,
        amount: Money,
        today: NaiveDate,
    ) -> ResultEngine<LoanPaymentOutcome> {
        with_tx!(self, |db_tx| {
            let loan = loans::Entity::find()
                .filter(loans::Column::UserId.eq(user.id))
                .filter(loans::Column::Name.eq(name))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::NotFound(format!("No loan named {name} found."))
                })?;

            if loan.outstanding_minor == 0 {
                return Ok(LoanPaymentOutcome::AlreadyPaid(loan));
            }

            let paid = Money::new(amount.minor().min(loan.outstanding_minor));
            let outstanding = loan.outstanding_minor - paid.minor();
            let status = if outstanding == 0 {
                LoanStatus::Paid
            } else {
                LoanStatus::Active
            };

            let loan_id = loan.id;
            let mut active: loans::ActiveModel = loan.into();
            active.outstanding_minor = ActiveValue::Set(outstanding);
            active.status = ActiveValue::Set(status.as_str().to_string());
            let loan = active.update(&db_tx).await?;

            loan_payments::ActiveModel {
                loan_id: ActiveValue::Set(loan_id),
                amount_minor: ActiveValue::Set(paid.minor()),
                paid_at: ActiveValue::Set(today),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(loan_id, paid = %paid, "loan payment recorded");
            Ok(LoanPaymentOutcome::Recorded { loan, paid })
        })
    }

    /// Loans ordered with active ones first, then by name.
    pub async fn list_loans(&self, user: &users::Model) -> ResultEngine<Vec<loans::Model>> {
        let loans = loans::Entity::find()
            .filter(loans::Column::UserId.eq(user.id))
            .order_by_asc(loans::Column::Status)
            .order_by_asc(loans::Column::Name)
            .all(&self.database)
            .await?;
        Ok(loans)
    }
}
