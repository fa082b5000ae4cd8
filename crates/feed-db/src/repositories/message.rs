//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use feed_core::entities::{CounterDelta, Message, MessagePatch, NewMessage};
use feed_core::traits::{MessageRepository, RepoResult};
use feed_core::value_objects::MessageId;

use crate::mappers::{DeltaBinds, MessageInsert};
use crate::models::{MessageModel, MESSAGE_COLUMNS};

use super::error::{map_db_error, message_not_found};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Message>> {
        let query = format!("SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at ASC, id ASC");
        let results = sqlx::query_as::<_, MessageModel>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self), fields(message_id = %id))]
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        let query = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");
        let result = sqlx::query_as::<_, MessageModel>(&query)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(author = %message.author))]
    async fn create(&self, message: &NewMessage) -> RepoResult<Message> {
        let insert = MessageInsert::new(message)?;
        let [mind_blown, fire, hundred, flex, dash, heart] = insert.reactions;

        let query = format!(
            r#"
            INSERT INTO messages (
                author, content, media_url, message_type, views,
                react_mind_blown, react_fire, react_hundred, react_flex, react_dash, react_heart,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, NOW()))
            RETURNING {MESSAGE_COLUMNS}
            "#
        );
        let model = sqlx::query_as::<_, MessageModel>(&query)
            .bind(insert.author)
            .bind(insert.content)
            .bind(insert.media_url)
            .bind(insert.message_type)
            .bind(insert.views)
            .bind(mind_blown)
            .bind(fire)
            .bind(hundred)
            .bind(flex)
            .bind(dash)
            .bind(heart)
            .bind(message.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Message::from(model))
    }

    #[instrument(skip(self, patch), fields(message_id = %id))]
    async fn update(&self, id: MessageId, patch: &MessagePatch) -> RepoResult<Message> {
        // Nullable columns carry a "present" flag so that an explicit null
        // clears the column while an absent field leaves it alone.
        let query = format!(
            r#"
            UPDATE messages
            SET author       = COALESCE($2, author),
                content      = CASE WHEN $3 THEN $4 ELSE content END,
                media_url    = CASE WHEN $5 THEN $6 ELSE media_url END,
                message_type = COALESCE($7, message_type),
                created_at   = COALESCE($8, created_at)
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, MessageModel>(&query)
            .bind(id.into_inner())
            .bind(patch.author.as_deref())
            .bind(patch.content.is_some())
            .bind(patch.content.clone().flatten())
            .bind(patch.media_url.is_some())
            .bind(patch.media_url.clone().flatten())
            .bind(patch.kind.map(|k| k.as_str()))
            .bind(patch.created_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Message::from).ok_or_else(|| message_not_found(id))
    }

    #[instrument(skip(self), fields(message_id = %id))]
    async fn apply_delta(&self, id: MessageId, delta: &CounterDelta) -> RepoResult<Message> {
        let binds = DeltaBinds::new(delta)?;
        let [mind_blown, fire, hundred, flex, dash, heart] = binds.reactions;

        // Single statement: concurrent deltas serialize on the row lock and all land.
        let query = format!(
            r#"
            UPDATE messages
            SET views            = views + $2,
                react_mind_blown = GREATEST(react_mind_blown + $3, 0),
                react_fire       = GREATEST(react_fire + $4, 0),
                react_hundred    = GREATEST(react_hundred + $5, 0),
                react_flex       = GREATEST(react_flex + $6, 0),
                react_dash       = GREATEST(react_dash + $7, 0),
                react_heart      = GREATEST(react_heart + $8, 0)
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, MessageModel>(&query)
            .bind(id.into_inner())
            .bind(binds.views)
            .bind(mind_blown)
            .bind(fire)
            .bind(hundred)
            .bind(flex)
            .bind(dash)
            .bind(heart)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Message::from).ok_or_else(|| message_not_found(id))
    }

    #[instrument(skip(self), fields(message_id = %id))]
    async fn delete(&self, id: MessageId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    async fn health_check(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
