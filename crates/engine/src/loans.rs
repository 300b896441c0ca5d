//! Loans and their lifecycle.
//!
//! `outstanding` stays within `[0, principal]` and `status` is `paid` exactly
//! when outstanding is zero. A paid loan reopens only through an upsert that
//! raises the principal.

use sea_orm::entity::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoanStatus {
    Active,
    Paid,
}

impl LoanStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paid => "paid",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "active" => Some(Self::Active),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: String,
    pub principal_minor: i64,
    pub outstanding_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
}

impl Model {
    #[must_use]
    pub fn status(&self) -> LoanStatus {
        LoanStatus::parse(&self.status).unwrap_or(LoanStatus::Active)
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
    #[sea_orm(has_many = "super::loan_payments::Entity")]
    LoanPayments,
}

impl Related<super::loan_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
