use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::{
    ResultEngine,
    messages::{self, MessageStatus},
    users,
};

use super::Engine;

impl Engine {
    /// Registers an inbound message under its idempotency key.
    ///
    /// Returns `None` when the key has already been seen. The unique index
    /// on the key closes the check-then-insert race: a concurrent insert
    /// surfaces as a constraint error, which is resolved by re-reading.
    pub async fn intake_message(
        &self,
        user: &users::Model,
        raw_text: &str,
        idempotency_key: &str,
    ) -> ResultEngine<Option<messages::Model>> {
        let existing = messages::Entity::find()
            .filter(messages::Column::IdempotencyKey.eq(idempotency_key))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let inserted = messages::ActiveModel {
            user_id: ActiveValue::Set(user.id),
            raw_text: ActiveValue::Set(raw_text.to_string()),
            parsed_intent: ActiveValue::Set(None),
            status: ActiveValue::Set(MessageStatus::Received.as_str().to_string()),
            idempotency_key: ActiveValue::Set(idempotency_key.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.database)
        .await;

        match inserted {
            Ok(message) => Ok(Some(message)),
            Err(err) => {
                let raced = messages::Entity::find()
                    .filter(messages::Column::IdempotencyKey.eq(idempotency_key))
                    .one(&self.database)
                    .await?;
                if raced.is_some() {
                    Ok(None)
                } else {
                    Err(err.into())
                }
            }
        }
    }

    /// Records the terminal status of a message and, when classification
    /// succeeded, the intent it resolved to.
    pub async fn mark_message(
        &self,
        message_id: i32,
        status: MessageStatus,
        parsed_intent: Option<&str>,
    ) -> ResultEngine<()> {
        let mut active = messages::ActiveModel {
            id: ActiveValue::Set(message_id),
            status: ActiveValue::Set(status.as_str().to_string()),
            ..Default::default()
        };
        if let Some(intent) = parsed_intent {
            active.parsed_intent = ActiveValue::Set(Some(intent.to_string()));
        }
        messages::Entity::update(active).exec(&self.database).await?;
        Ok(())
    }
}
