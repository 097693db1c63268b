use actix_web::{web, App, HttpServer};
use config::AppConfig;
use log::LevelFilter;
use profitability::ProfitCalculator;
use repository::{CatalogRepository, PriceRepository};
use routes::ResultLimit;
use store::StoreHandle;

mod actors;
mod config;
mod models;
mod profitability;
mod repository;
mod routes;
mod store;
mod views;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::builder()
        .filter(Some("albion_margins"), LevelFilter::Trace)
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = AppConfig::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    log::info!("Loaded config: {:?}", config);

    let store = StoreHandle::disconnected();
    let keeper = actors::start_store_keeper(&config, store.clone());

    let calculator = web::Data::new(ProfitCalculator::new(
        PriceRepository::new(store.clone(), &config.table),
        config.min_profit_percentage,
        config.fetch_timeout(),
    ));
    let catalog = web::Data::new(CatalogRepository::new(store));
    let limit = web::Data::new(ResultLimit(config.result_limit));

    log::info!("Server is running on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(calculator.clone())
            .app_data(catalog.clone())
            .app_data(limit.clone())
            .configure(routes::configure::<PriceRepository>)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    drop(keeper);

    Ok(())
}
