use crate::{
    models::{PriceRecord, ProfitableItem},
    repository::{PriceSource, RepositoryError},
};
use std::{cmp::Ordering, time::Duration};
use thiserror::Error;

pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_MIN_PROFIT_PERCENTAGE: f64 = 15.0;

#[derive(Debug, Error)]
pub enum ProfitError {
    #[error("could not compute profitable items: {0}")]
    ComputationFailed(#[source] RepositoryError),
}

/// Ranked items of one computation, plus the rows the repository had to skip.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitReport {
    pub items: Vec<ProfitableItem>,
    pub skipped_records: usize,
}

pub struct ProfitCalculator<R> {
    repository: R,
    min_profit_percentage: f64,
    fetch_timeout: Duration,
}

impl<R: PriceSource> ProfitCalculator<R> {
    pub fn new(repository: R, min_profit_percentage: f64, fetch_timeout: Duration) -> Self {
        Self {
            repository,
            min_profit_percentage,
            fetch_timeout,
        }
    }

    pub async fn compute_profitable_items(
        &self,
        limit: usize,
    ) -> Result<Vec<ProfitableItem>, ProfitError> {
        self.compute_profit_report(limit)
            .await
            .map(|report| report.items)
    }

    pub async fn compute_profit_report(&self, limit: usize) -> Result<ProfitReport, ProfitError> {
        let candidates =
            tokio::time::timeout(self.fetch_timeout, self.repository.fetch_candidate_records())
                .await
                .map_err(|_| RepositoryError::TimedOut(self.fetch_timeout))
                .and_then(|fetched| fetched)
                .map_err(ProfitError::ComputationFailed)?;

        Ok(ProfitReport {
            items: rank_profitable_items(candidates.records, self.min_profit_percentage, limit),
            skipped_records: candidates.skipped,
        })
    }
}

/// Keeps records whose margin is strictly above `min_profit_percentage`, highest
/// absolute profit first, at most `limit` of them.
pub fn rank_profitable_items(
    records: Vec<PriceRecord>,
    min_profit_percentage: f64,
    limit: usize,
) -> Vec<ProfitableItem> {
    let mut items = records
        .into_iter()
        .filter_map(ProfitableItem::from_record)
        .filter(|item| item.profit_percentage > min_profit_percentage)
        .collect::<Vec<_>>();

    items.sort_by(compare_rank);
    items.truncate(limit);

    items
}

// Equal profits fall back to percentage, then item id and location, so the order
// never depends on what order the store returned rows in.
fn compare_rank(a: &ProfitableItem, b: &ProfitableItem) -> Ordering {
    b.profit
        .total_cmp(&a.profit)
        .then_with(|| b.profit_percentage.total_cmp(&a.profit_percentage))
        .then_with(|| a.item_id.cmp(&b.item_id))
        .then_with(|| a.location.cmp(&b.location))
}
