use super::{price_records::quote_identifier, RepositoryError};
use crate::{models::TableDump, store::StoreHandle};
use futures::{future, TryStreamExt};
use sqlx::{sqlite::SqliteRow, Column, Row, SqlitePool, TypeInfo, ValueRef};

/// Read-only view over every user table of the store.
pub struct CatalogRepository(StoreHandle);

impl Clone for CatalogRepository {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl CatalogRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self(store)
    }

    pub async fn tables(&self) -> Result<Vec<TableDump>, RepositoryError> {
        let pool = self.0.current().await.ok_or(RepositoryError::Unavailable)?;

        let names = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch(&pool)
        .and_then(|row| future::ready(row.try_get::<String, _>("name")))
        .try_collect::<Vec<_>>()
        .await?;

        log::trace!("Dumping {} tables", names.len());

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            tables.push(dump_table(&pool, name).await?);
        }

        Ok(tables)
    }
}

async fn dump_table(pool: &SqlitePool, name: String) -> Result<TableDump, sqlx::Error> {
    let columns = sqlx::query(&format!("PRAGMA table_info({})", quote_identifier(&name)))
        .fetch(pool)
        .and_then(|row| future::ready(row.try_get::<String, _>("name")))
        .try_collect::<Vec<_>>()
        .await?;

    let rows = sqlx::query(&format!("SELECT * FROM {}", quote_identifier(&name)))
        .fetch(pool)
        .map_ok(|row| render_row(&row))
        .try_collect::<Vec<_>>()
        .await?;

    Ok(TableDump {
        name,
        columns,
        rows,
    })
}

fn render_row(row: &SqliteRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|column| render_cell(row, column.ordinal()))
        .collect()
}

fn render_cell(row: &SqliteRow, index: usize) -> String {
    let Ok(raw) = row.try_get_raw(index) else {
        return String::new();
    };
    if raw.is_null() {
        return "NULL".to_string();
    }

    let kind = raw.type_info().name().to_string();
    match kind.as_str() {
        "INTEGER" | "BOOLEAN" => row
            .try_get_unchecked::<i64, _>(index)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        "REAL" => row
            .try_get_unchecked::<f64, _>(index)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|v| format!("<{} bytes>", v.len()))
            .unwrap_or_default(),
        _ => row
            .try_get_unchecked::<String, _>(index)
            .unwrap_or_default(),
    }
}
