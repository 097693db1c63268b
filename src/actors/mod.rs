use crate::{config::AppConfig, store::StoreHandle};
use actix::{Actor, Addr};

pub use store_keeper::StoreKeeper;

mod store_keeper;

pub fn start_store_keeper(config: &AppConfig, store: StoreHandle) -> Addr<StoreKeeper> {
    StoreKeeper::new(
        config.database_url.clone(),
        store,
        config.reconnect_delay(),
        config.health_check_interval(),
    )
    .start()
}
