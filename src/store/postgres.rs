use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Row};

use crate::config::DatabaseConfig;
use crate::model::CollectionName;
use crate::store::traits::{ensure_object, DocumentStore};

/// Document store backed by PostgreSQL.
///
/// Every collection is its own table holding one JSONB document per row.
/// Tables are created on first write.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open a connection pool using the configured connection settings
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = config
            .connect_options()
            .context("Invalid database connection settings")?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "Failed to create PostgreSQL connection pool for {}",
                    config.describe()
                )
            })?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn ensure_collection(&self, collection: &CollectionName) -> Result<()> {
        let statement = format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                id BIGSERIAL PRIMARY KEY,
                document JSONB NOT NULL,
                inserted_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#,
            collection
        );

        sqlx::query(&statement)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create collection '{}'", collection))?;

        Ok(())
    }

    async fn collection_exists(&self, collection: &CollectionName) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(format!(r#""{}""#, collection))
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to look up collection '{}'", collection))?;

        Ok(exists)
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn insert_one(&self, collection: &CollectionName, document: Value) -> Result<()> {
        ensure_object(collection, &document)?;
        self.ensure_collection(collection).await?;

        let statement = format!(r#"INSERT INTO "{}" (document) VALUES ($1)"#, collection);
        sqlx::query(&statement)
            .bind(&document)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert document into '{}'", collection))?;

        Ok(())
    }

    async fn insert_many(&self, collection: &CollectionName, documents: Vec<Value>) -> Result<u64> {
        if documents.is_empty() {
            return Ok(0);
        }
        for document in &documents {
            ensure_object(collection, document)?;
        }
        self.ensure_collection(collection).await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!(r#"INSERT INTO "{}" (document) "#, collection));
        builder.push_values(documents.iter(), |mut row, document| {
            row.push_bind(document);
        });

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .with_context(|| {
                format!(
                    "Failed to insert {} documents into '{}'",
                    documents.len(),
                    collection
                )
            })?;

        Ok(result.rows_affected())
    }

    async fn list_documents(&self, collection: &CollectionName) -> Result<Vec<Value>> {
        if !self.collection_exists(collection).await? {
            return Ok(Vec::new());
        }

        let statement = format!(r#"SELECT document FROM "{}" ORDER BY id"#, collection);
        let rows = sqlx::query(&statement)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to read documents from '{}'", collection))?;

        rows.iter()
            .map(|row| row.try_get::<Value, _>("document"))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to decode documents from '{}'", collection))
    }

    async fn count_documents(&self, collection: &CollectionName) -> Result<u64> {
        if !self.collection_exists(collection).await? {
            return Ok(0);
        }

        let statement = format!(r#"SELECT COUNT(*) FROM "{}""#, collection);
        let count: i64 = sqlx::query_scalar(&statement)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count documents in '{}'", collection))?;

        Ok(count as u64)
    }
}
