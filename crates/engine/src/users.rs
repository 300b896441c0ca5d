//! Chat users, keyed by the opaque sender address of the transport.

use sea_orm::entity::prelude::*;

pub const DEFAULT_CURRENCY: &str = "inr";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sender_id: String,
    pub locale: String,
    /// IANA timezone name; "today" for this user is derived from it.
    pub timezone: String,
    /// Lowercase currency code used when an expense does not carry one.
    pub default_currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
