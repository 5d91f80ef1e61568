// Append-only prediction log backed by a local SQLite file. Nothing in the
// service reads it back; reporting is out of scope.
use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub struct PredictionStore {
    pool: SqlitePool,
}

impl PredictionStore {
    /// Opens the database file, creating it if absent.
    pub async fn connect(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Creates the predictions table if it does not exist. Safe to call on
    /// every startup.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                image_path TEXT NOT NULL,
                predicted_class TEXT NOT NULL,
                timestamp DATETIME NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts one prediction event and returns its assigned id.
    pub async fn append(
        &self,
        image_path: &str,
        predicted_class: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO predictions (image_path, predicted_class, timestamp) VALUES (?, ?, ?)",
        )
        .bind(image_path)
        .bind(predicted_class)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db(tag: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("recipelens-store-{tag}-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let store = PredictionStore::connect(&temp_db("idempotent")).await.unwrap();
        store.init().await.unwrap();
        store.init().await.unwrap();
        let id = store.append("static/uploads/a.jpg", "chai", Utc::now()).await.unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn append_assigns_monotonic_ids_and_keeps_fields() {
        let store = PredictionStore::connect(&temp_db("append")).await.unwrap();
        store.init().await.unwrap();

        let first = store
            .append("static/uploads/20240101_120000_dosa.jpg", "masala_dosa", Utc::now())
            .await
            .unwrap();
        let second = store.append("static/uploads/b.jpg", "biryani", Utc::now()).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let (path, class): (String, String) = sqlx::query_as(
            "SELECT image_path, predicted_class FROM predictions WHERE id = ?",
        )
        .bind(first)
        .fetch_one(&store.pool)
        .await
        .unwrap();
        assert_eq!(path, "static/uploads/20240101_120000_dosa.jpg");
        assert_eq!(class, "masala_dosa");
    }

    #[tokio::test]
    async fn append_without_init_is_a_storage_error() {
        let store = PredictionStore::connect(&temp_db("uninit")).await.unwrap();
        let result = store.append("x.jpg", "chai", Utc::now()).await;
        assert!(result.is_err());
    }
}
