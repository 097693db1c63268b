use super::{PriceSource, RepositoryError};
use crate::{
    models::{CandidateRecords, PriceRecord},
    store::StoreHandle,
};
use futures::TryStreamExt;
use sqlx::{sqlite::SqliteRow, Decode, Row, Sqlite, Type, TypeInfo, ValueRef};

pub struct PriceRepository {
    store: StoreHandle,
    query: String,
}

impl Clone for PriceRepository {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            query: self.query.clone(),
        }
    }
}

impl PriceRepository {
    pub fn new(store: StoreHandle, table: &str) -> Self {
        Self {
            store,
            query: candidate_query(table),
        }
    }
}

impl PriceSource for PriceRepository {
    async fn fetch_candidate_records(&self) -> Result<CandidateRecords, RepositoryError> {
        let pool = self.store.current().await.ok_or(RepositoryError::Unavailable)?;

        log::trace!("Querying candidate price records");

        let candidates = sqlx::query(&self.query)
            .fetch(&pool)
            .try_fold(CandidateRecords::default(), |mut candidates, row| async move {
                match read_record(&row) {
                    Some(record) if record.has_market_data() => candidates.records.push(record),
                    Some(_) => {}
                    None => candidates.skipped += 1,
                }
                Ok::<_, sqlx::Error>(candidates)
            })
            .await?;

        log::trace!(
            "Queried {} candidate price records, skipped {}",
            candidates.records.len(),
            candidates.skipped
        );

        Ok(candidates)
    }
}

// Numeric prices that are not strictly positive are filtered in the store. NULL or
// non-numeric prices come through so `read_record` can count them as skipped.
fn candidate_query(table: &str) -> String {
    format!(
        "SELECT unique_name, city, buy_price_max, sell_price_min \
         FROM {} \
         WHERE NOT (typeof(buy_price_max) IN ('integer', 'real') AND buy_price_max <= 0) \
         AND NOT (typeof(sell_price_min) IN ('integer', 'real') AND sell_price_min <= 0)",
        quote_identifier(table)
    )
}

pub(super) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `None` when a required column is NULL or holds a value of the wrong type.
fn read_record(row: &SqliteRow) -> Option<PriceRecord> {
    Some(PriceRecord::new(
        required::<String>(row, "unique_name")?,
        required::<String>(row, "city")?,
        price(row, "buy_price_max")?,
        price(row, "sell_price_min")?,
    ))
}

/// Prices may be stored as INTEGER or REAL; anything else is unreadable.
fn price(row: &SqliteRow, column: &str) -> Option<f64> {
    let raw = row.try_get_raw(column).ok()?;
    if raw.is_null() {
        return None;
    }

    let kind = raw.type_info().name().to_string();
    match kind.as_str() {
        "INTEGER" => row.try_get_unchecked::<i64, _>(column).ok().map(|v| v as f64),
        "REAL" => row.try_get_unchecked::<f64, _>(column).ok(),
        _ => None,
    }
}

fn required<'r, T>(row: &'r SqliteRow, column: &str) -> Option<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get::<Option<T>, _>(column).ok().flatten()
}
