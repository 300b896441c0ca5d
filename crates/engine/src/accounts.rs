//! Accounts hold a signed balance and are created lazily on first reference.

use sea_orm::entity::prelude::*;

/// Storage kind of an account. The command grammar says `account` for what is
/// stored as `bank`; [`AccountKind::label`] is the user-facing word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountKind {
    Bank,
    Cash,
}

impl AccountKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Cash => "cash",
        }
    }

    /// The word used in command text and replies.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bank => "account",
            Self::Cash => "cash",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "account" | "bank" => Some(Self::Bank),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    /// `bank` or `cash`; part of the `(user, name, kind)` natural key.
    pub kind: String,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
}

impl Model {
    #[must_use]
    pub fn kind(&self) -> AccountKind {
        AccountKind::parse(&self.kind).unwrap_or(AccountKind::Bank)
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

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
