//! PostgreSQL conversation store
//!
//! Each conversation is one row; the transcript lives in a JSONB column so
//! a conversation is read and written as a single document.
//!
//! The schema is applied on first use rather than only at startup, so a
//! server that came up while the database was down heals once it returns.

use std::sync::Arc;

use async_trait::async_trait;
use chatline_common::Result;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::ConversationStore;
use crate::domain::entities::{Conversation, Message};

#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
    schema: Arc<OnceCell<()>>,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: Arc::new(OnceCell::new()),
        }
    }

    /// Run pending migrations once. A failed attempt leaves the cell empty
    /// so the next call tries again.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::migrate!("../../migrations")
                    .run(&self.pool)
                    .await
                    .map_err(sqlx::Error::from)?;
                tracing::info!("Database migrations applied");
                Ok::<(), chatline_common::Error>(())
            })
            .await?;
        Ok(())
    }

    /// Whether migrations have been applied by this store
    pub fn schema_ready(&self) -> bool {
        self.schema.initialized()
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn insert(&self, conv: &Conversation) -> Result<Conversation> {
        self.ensure_schema().await?;

        let created = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, messages, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, messages, created_at, updated_at
            "#,
        )
        .bind(conv.id)
        .bind(&conv.messages)
        .bind(conv.created_at)
        .bind(conv.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>> {
        self.ensure_schema().await?;

        let conv = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, messages, created_at, updated_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conv)
    }

    async fn find_all_sorted(&self, limit: i64, offset: i64) -> Result<Vec<Conversation>> {
        self.ensure_schema().await?;

        let convs = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, messages, created_at, updated_at
            FROM conversations
            ORDER BY updated_at DESC, created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(convs)
    }

    async fn update_by_id(&self, id: Uuid, messages: Vec<Message>) -> Result<Option<Conversation>> {
        self.ensure_schema().await?;

        let mut tx = self.pool.begin().await?;

        // Lock the row so the read-modify-write is atomic for this document
        let current = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, messages, created_at, updated_at
            FROM conversations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut conv) = current else {
            return Ok(None);
        };

        conv.replace_messages(messages)?;

        let updated = sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations SET
                messages = $2,
                updated_at = $3
            WHERE id = $1
            RETURNING id, messages, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&conv.messages)
        .bind(conv.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        self.ensure_schema().await?;

        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reachable and the conversations table is queryable
    async fn ping(&self) -> bool {
        if let Err(e) = self.ensure_schema().await {
            tracing::debug!(error = %e, "Database schema not ready");
            return false;
        }
        sqlx::query("SELECT 1 FROM conversations LIMIT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}
