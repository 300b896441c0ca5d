use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::{ResultEngine, users};

use super::Engine;

impl Engine {
    /// Fetches the user for a sender address, creating it on first contact.
    pub async fn user_by_sender(&self, sender_id: &str) -> ResultEngine<users::Model> {
        if let Some(user) = users::Entity::find()
            .filter(users::Column::SenderId.eq(sender_id))
            .one(&self.database)
            .await?
        {
            return Ok(user);
        }

        let active = users::ActiveModel {
            sender_id: ActiveValue::Set(sender_id.to_string()),
            locale: ActiveValue::Set("en".to_string()),
            timezone: ActiveValue::Set("UTC".to_string()),
            default_currency: ActiveValue::Set(users::DEFAULT_CURRENCY.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        match active.insert(&self.database).await {
            Ok(user) => Ok(user),
            // Unique index on sender_id absorbs a racing first contact.
            Err(err) => users::Entity::find()
                .filter(users::Column::SenderId.eq(sender_id))
                .one(&self.database)
                .await?
                .ok_or_else(|| err.into()),
        }
    }

    /// Sets the default currency, persisting only on change.
    ///
    /// Returns the normalized code and whether anything was written.
    pub async fn set_default_currency(
        &self,
        user: &users::Model,
        code: &str,
    ) -> ResultEngine<(String, bool)> {
        let normalized = code.trim().to_lowercase();
        if normalized == user.default_currency {
            return Ok((normalized, false));
        }

        let mut active: users::ActiveModel = user.clone().into();
        active.default_currency = ActiveValue::Set(normalized.clone());
        active.update(&self.database).await?;
        Ok((normalized, true))
    }
}
