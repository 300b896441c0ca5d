use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Money, ResultEngine,
    accounts::{self, AccountKind},
    users,
};

use super::{Engine, with_tx};

impl Engine {
    /// Explicit upsert by the `(user, name, kind)` natural key.
    ///
    /// On an existing account only the supplied balance is overwritten, and
    /// only when it actually changed.
    pub async fn upsert_account(
        &self,
        user: &users::Model,
        name: &str,
        kind: AccountKind,
        balance: Money,
    ) -> ResultEngine<(accounts::Model, bool)> {
        with_tx!(self, |db_tx| {
            let existing = find_account(&db_tx, user.id, name, kind).await?;
            match existing {
                None => {
                    let account = insert_account(&db_tx, user.id, name, kind, balance.minor()).await?;
                    Ok((account, true))
                }
                Some(account) => {
                    if account.balance_minor == balance.minor() {
                        return Ok((account, false));
                    }
                    let mut active: accounts::ActiveModel = account.into();
                    active.balance_minor = ActiveValue::Set(balance.minor());
                    let account = active.update(&db_tx).await?;
                    Ok((account, false))
                }
            }
        })
    }

    /// Account lookup for a balance query; a miss is an ordinary reply, not
    /// an error.
    pub async fn account_balance(
        &self,
        user: &users::Model,
        name: &str,
        kind: AccountKind,
    ) -> ResultEngine<Option<accounts::Model>> {
        find_account(&self.database, user.id, name, kind).await
    }

    /// All accounts of a user, ordered by kind then name.
    pub async fn list_accounts(&self, user: &users::Model) -> ResultEngine<Vec<accounts::Model>> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user.id))
            .order_by_asc(accounts::Column::Kind)
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;
        Ok(accounts)
    }
}

pub(super) async fn find_account<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    name: &str,
    kind: AccountKind,
) -> ResultEngine<Option<accounts::Model>> {
    let account = accounts::Entity::find()
        .filter(accounts::Column::UserId.eq(user_id))
        .filter(accounts::Column::Name.eq(name.trim()))
        .filter(accounts::Column::Kind.eq(kind.as_str()))
        .one(conn)
        .await?;
    Ok(account)
}

/// Get-or-create by natural key, used when an expense references an account
/// that does not exist yet.
pub(super) async fn get_or_create_account<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    name: &str,
    kind: AccountKind,
) -> ResultEngine<accounts::Model> {
    if let Some(account) = find_account(conn, user_id, name, kind).await? {
        return Ok(account);
    }
    insert_account(conn, user_id, name, kind, 0).await
}

async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    name: &str,
    kind: AccountKind,
    balance_minor: i64,
) -> ResultEngine<accounts::Model> {
    let active = accounts::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        name: ActiveValue::Set(name.trim().to_string()),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        balance_minor: ActiveValue::Set(balance_minor),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

/// Applies a signed delta to a stored balance and returns the refreshed row.
pub(super) async fn apply_balance_delta<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    delta_minor: i64,
) -> ResultEngine<accounts::Model> {
    let account = accounts::Entity::find_by_id(account_id)
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound("Account not found.".to_string()))?;
    let mut active: accounts::ActiveModel = account.clone().into();
    active.balance_minor = ActiveValue::Set(account.balance_minor + delta_minor);
    Ok(active.update(conn).await?)
}
