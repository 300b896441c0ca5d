//! Credit cards and the statement-window arithmetic behind "outstanding".
//!
//! A card stores no balance: outstanding is always recomputed as the sum of
//! card-sourced expense amounts whose date falls in the current statement
//! window.

use chrono::{Datelike, NaiveDate};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub issuer: String,
    /// Empty string means "the only card with this issuer"; part of the
    /// `(user, issuer, last4)` natural key.
    pub last4: String,
    pub billing_cycle_day: i32,
    pub credit_limit_minor: i64,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Display name: issuer plus the last4 suffix when present.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.last4.is_empty() {
            self.issuer.clone()
        } else {
            format!("{} {}", self.issuer, self.last4)
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Current statement window `[start, end]` (both inclusive) for a card.
///
/// The cycle day is clamped to `[1, 28]` so the window math never has to
/// reason about short months. If today's day-of-month is on or past the cycle
/// day the window started this month, otherwise it started the previous
/// month; it ends the day before the next occurrence of the cycle day.
#[must_use]
pub fn statement_window(billing_cycle_day: i32, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let cycle_day = billing_cycle_day.clamp(1, 28) as u32;

    let (start_year, start_month) = if today.day() >= cycle_day {
        (today.year(), today.month())
    } else {
        previous_month(today.year(), today.month())
    };
    let (next_year, next_month) = next_month(start_year, start_month);

    let start = date(start_year, start_month, cycle_day);
    let end = date(next_year, next_month, cycle_day).pred_opt().unwrap_or(start);
    (start, end)
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    // Day is clamped to 28, so this is always constructible.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
