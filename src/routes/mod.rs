use actix_web::{
    error::{ErrorInternalServerError, InternalError},
    get,
    http::header::ContentType,
    web, HttpResponse, Result,
};
use serde_json::{json, Map, Value};

use crate::{
    models::{ProfitableItem, ProfitableItemEntry},
    profitability::{ProfitCalculator, ProfitReport},
    repository::{CatalogRepository, PriceSource},
    views,
};

/// The HTML page never shows more than this many rows.
const PAGE_CAP: usize = 100;

/// Upper bound on the number of ranked items a request computes.
#[derive(Debug, Clone, Copy)]
pub struct ResultLimit(pub usize);

pub fn configure<R: PriceSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(database)
        .route("/profit", web::get().to(profit_page::<R>))
        .route("/api/profitable_items", web::get().to(profitable_items::<R>));
}

#[get("/")]
async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(views::INDEX_PAGE)
}

async fn profit_page<R: PriceSource>(
    calculator: web::Data<ProfitCalculator<R>>,
    limit: web::Data<ResultLimit>,
) -> Result<HttpResponse> {
    let report = ranked_report(&calculator, limit.0).await?;

    let shown = &report.items[..report.items.len().min(PAGE_CAP)];

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(views::render_profit_page(shown)))
}

async fn profitable_items<R: PriceSource>(
    calculator: web::Data<ProfitCalculator<R>>,
    limit: web::Data<ResultLimit>,
) -> Result<HttpResponse> {
    let items = calculator
        .compute_profitable_items(limit.0)
        .await
        .map_err(|e| {
            log::error!("Error fetching profitable items: {}", e);
            json_error(e)
        })?;

    let body = profitable_items_by_id(&items).map_err(|e| {
        log::error!("Could not serialize profitable items: {}", e);
        json_error(e)
    })?;

    Ok(HttpResponse::Ok().json(body))
}

#[get("/db")]
async fn database(catalog: web::Data<CatalogRepository>) -> Result<HttpResponse> {
    let tables = catalog.tables().await.map_err(|e| {
        log::error!("Error fetching database: {}", e);
        ErrorInternalServerError("Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(views::render_database_page(&tables)))
}

async fn ranked_report<R: PriceSource>(
    calculator: &ProfitCalculator<R>,
    limit: usize,
) -> Result<ProfitReport> {
    let report = calculator.compute_profit_report(limit).await.map_err(|e| {
        log::error!("Error fetching profitable items: {}", e);
        ErrorInternalServerError("Server Error")
    })?;

    if report.skipped_records > 0 {
        log::warn!(
            "Skipped {} price rows with missing or malformed fields",
            report.skipped_records
        );
    }
    log::debug!("Ranked {} profitable items", report.items.len());

    Ok(report)
}

/// The API's error body; the cause is only logged.
fn json_error<E>(cause: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    InternalError::from_response(
        cause,
        HttpResponse::InternalServerError()
            .json(json!({ "error": "Error fetching profitable items" })),
    )
    .into()
}

/// Keys are item ids. An id seen again (in another city) overwrites the value
/// but keeps the position of its first, higher ranked, occurrence.
fn profitable_items_by_id(items: &[ProfitableItem]) -> serde_json::Result<Map<String, Value>> {
    let mut by_id = Map::new();
    for item in items {
        by_id.insert(
            item.item_id.clone(),
            serde_json::to_value(ProfitableItemEntry::from(item))?,
        );
    }
    Ok(by_id)
}
