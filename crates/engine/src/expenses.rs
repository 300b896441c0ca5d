//! Expense rows: one per spend, linked to at most one source.

use sea_orm::entity::prelude::*;

/// Where an expense was paid from. Exactly one of the source references is
/// set accordingly, or neither if the source row was deleted afterwards (the
/// reference is nullified, never cascaded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceType {
    Card,
    Account,
    Cash,
}

impl SourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Account => "account",
            Self::Cash => "cash",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "card" => Some(Self::Card),
            "account" => Some(Self::Account),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }

    /// `account` and `cash` both resolve through the accounts table.
    #[must_use]
    pub fn is_account_backed(self) -> bool {
        matches!(self, Self::Account | Self::Cash)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub amount_minor: i64,
    pub currency: String,
    pub date: Date,
    pub category_id: Option<i32>,
    pub source_type: String,
    pub source_account_id: Option<i32>,
    pub source_card_id: Option<i32>,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::SourceAccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::cards::Entity",
        from = "Column::SourceCardId",
        to = "super::cards::Column::Id"
    )]
    Cards,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
