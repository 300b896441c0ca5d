use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, Statement, prelude::*};

use crate::{Money, ResultEngine, categories, users};

use super::Engine;

/// A category with its lifetime expense total, for listings.
#[derive(Clone, Debug)]
pub struct CategoryTotal {
    pub name: String,
    pub total: Money,
    pub alias_count: usize,
}

impl Engine {
    /// Categories ordered by name, each with an aggregated lifetime total
    /// over its currently linked expenses.
    pub async fn list_categories(&self, user: &users::Model) -> ResultEngine<Vec<CategoryTotal>> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT c.name AS name, c.aliases AS aliases, \
                    COALESCE(SUM(e.amount_minor), 0) AS total \
             FROM categories c \
             LEFT JOIN expenses e ON e.category_id = c.id \
             WHERE c.user_id = ? \
             GROUP BY c.id, c.name, c.aliases \
             ORDER BY c.name",
            vec![user.id.into()],
        );

        let rows = self.database.query_all(stmt).await?;
        let mut totals = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("", "name")?;
            let aliases: Option<String> = row.try_get("", "aliases")?;
            let total: i64 = row.try_get("", "total")?;
            let alias_count = aliases
                .as_deref()
                .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
                .map(|list| list.len())
                .unwrap_or(0);
            totals.push(CategoryTotal {
                name,
                total: Money::new(total),
                alias_count,
            });
        }
        Ok(totals)
    }
}

/// Get-or-create by the `(user, name)` natural key.
pub(super) async fn resolve_category<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    name: &str,
) -> ResultEngine<categories::Model> {
    let trimmed = name.trim();
    if let Some(category) = categories::Entity::find()
        .filter(categories::Column::UserId.eq(user_id))
        .filter(categories::Column::Name.eq(trimmed))
        .one(conn)
        .await?
    {
        return Ok(category);
    }

    let active = categories::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        name: ActiveValue::Set(trimmed.to_string()),
        aliases: ActiveValue::Set(None),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}
