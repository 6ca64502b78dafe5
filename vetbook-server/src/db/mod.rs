//! Database Module
//!
//! Embedded SurrealDB (RocksDB backend). Tables are schemaless with a
//! handful of idempotent definitions applied at startup.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns("vetbook")
            .use_db("clinic")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        let service = Self { db };
        service.define_schema().await?;

        tracing::info!("Database ready at {}", db_path);
        Ok(service)
    }

    /// Idempotent table/index definitions
    async fn define_schema(&self) -> Result<(), AppError> {
        self.db
            .query(
                "DEFINE TABLE IF NOT EXISTS cage SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS cage_number_unique ON TABLE cage COLUMNS cage_number UNIQUE;
                 DEFINE TABLE IF NOT EXISTS service SCHEMALESS;
                 DEFINE TABLE IF NOT EXISTS pet SCHEMALESS;
                 DEFINE TABLE IF NOT EXISTS reservation SCHEMALESS;
                 DEFINE INDEX IF NOT EXISTS reservation_status ON TABLE reservation COLUMNS status;",
            )
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
        Ok(())
    }
}
