use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Shared slot for the store connection pool. The `StoreKeeper` fills and
/// empties it; repositories only read it.
pub struct StoreHandle(Arc<Mutex<Option<SqlitePool>>>);

impl Clone for StoreHandle {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl StoreHandle {
    pub fn disconnected() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }

    #[cfg(test)]
    pub fn connected(pool: SqlitePool) -> Self {
        Self(Arc::new(Mutex::new(Some(pool))))
    }

    /// Clones the current pool out so callers never hold the lock across a query.
    pub async fn current(&self) -> Option<SqlitePool> {
        self.0.lock().await.clone()
    }

    pub async fn set(&self, pool: SqlitePool) {
        let previous = self.0.lock().await.replace(pool);
        if let Some(previous) = previous {
            previous.close().await;
        }
    }

    pub async fn disconnect(&self) {
        let previous = self.0.lock().await.take();
        if let Some(previous) = previous {
            previous.close().await;
        }
    }
}

pub async fn connect_sqlite(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    log::info!("Connecting to sqlite store: {}", database_url);

    SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Some(Duration::from_secs(30)))
        .max_lifetime(Some(Duration::from_secs(200)))
        .connect(database_url)
        .await
}

pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

/// In-memory store with an `items` table covering every kind of row the
/// repositories have to cope with.
#[cfg(test)]
pub(crate) async fn seeded_pool() -> SqlitePool {
    let pool = memory_pool().await;

    sqlx::query(
        r#"
        CREATE TABLE items (
            unique_name TEXT,
            city TEXT,
            buy_price_max REAL,
            sell_price_min REAL
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO items (unique_name, city, buy_price_max, sell_price_min) VALUES
            ('T4_BAG', 'Lymhurst', 100, 120),
            ('T4_CAPE', 'Martlock', 100, 110),
            ('T5_BAG', 'Caerleon', 0, 50),
            ('T6_BAG', 'Thetford', 200, NULL),
            (NULL, 'Bridgewatch', 100, 200),
            ('T8_BAG', 'Fort Sterling', 1000, 1500)
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnect_empties_the_slot() {
        let handle = StoreHandle::connected(memory_pool().await);
        assert!(handle.current().await.is_some());

        handle.disconnect().await;

        assert!(handle.current().await.is_none());
    }

    #[tokio::test]
    async fn set_replaces_the_pool() {
        let handle = StoreHandle::disconnected();
        handle.set(memory_pool().await).await;

        let pool = handle.current().await.unwrap();
        assert!(ping(&pool).await.is_ok());
    }
}
