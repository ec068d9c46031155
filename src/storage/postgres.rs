use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::DocumentStore;
use crate::{config::Config, error::AppResult};

/// Document store backed by a single JSONB table.
#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open the pool and bring the schema up to date.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database_url())
            .await?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&db).await?;
        tracing::info!("Database migrations completed");

        Ok(Self::new(db))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn set_document(&self, collection: &str, id: &str, data: Value) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = $3, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(sqlx::types::Json(data))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<Value>> {
        let row: Option<(sqlx::types::Json<Value>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(row.map(|(data,)| data.0))
    }

    async fn list_documents(&self, collection: &str) -> AppResult<Vec<(String, Value)>> {
        let rows: Vec<(String, sqlx::types::Json<Value>)> = sqlx::query_as(
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(collection)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|(id, data)| (id, data.0)).collect())
    }
}
