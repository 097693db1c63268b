use crate::models::CandidateRecords;
use std::{future::Future, time::Duration};
use thiserror::Error;

mod catalog;
mod price_records;

pub use catalog::CatalogRepository;
pub use price_records::PriceRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("store connection is not established")]
    Unavailable,
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("store did not answer within {0:?}")]
    TimedOut(Duration),
}

/// Source of candidate price records: rows where both prices are strictly
/// positive, in no particular order.
pub trait PriceSource {
    fn fetch_candidate_records(
        &self,
    ) -> impl Future<Output = Result<CandidateRecords, RepositoryError>> + Send;
}
