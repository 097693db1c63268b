use crate::store::{connect_sqlite, ping, StoreHandle};
use actix::{Actor, Context};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns the store connection: connects, health-checks and reconnects after a
/// fixed delay. Everything else only reads the `StoreHandle`.
pub struct StoreKeeper {
    database_url: String,
    store: StoreHandle,
    reconnect_delay: Duration,
    health_check_interval: Duration,

    handle: Option<JoinHandle<()>>,
}

impl StoreKeeper {
    pub fn new(
        database_url: String,
        store: StoreHandle,
        reconnect_delay: Duration,
        health_check_interval: Duration,
    ) -> Self {
        Self {
            database_url,
            store,
            reconnect_delay,
            health_check_interval,
            handle: None,
        }
    }
}

impl Actor for StoreKeeper {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        log::debug!("StoreKeeper started for: {}", self.database_url);

        let database_url = self.database_url.clone();
        let store = self.store.clone();
        let reconnect_delay = self.reconnect_delay;
        let health_check_interval = self.health_check_interval;

        self.handle = Some(tokio::spawn(async move {
            loop {
                let delay = keep_connected(
                    &database_url,
                    &store,
                    reconnect_delay,
                    health_check_interval,
                )
                .await;
                tokio::time::sleep(delay).await;
            }
        }));
    }

    fn stopping(&mut self, _ctx: &mut Self::Context) -> actix::Running {
        log::debug!("StoreKeeper stopping for: {}", self.database_url);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        actix::Running::Stop
    }
}

/// One connect or health-check step; returns how long to wait before the next.
async fn keep_connected(
    database_url: &str,
    store: &StoreHandle,
    reconnect_delay: Duration,
    health_check_interval: Duration,
) -> Duration {
    match store.current().await {
        None => match connect_sqlite(database_url).await {
            Ok(pool) => {
                log::info!("Store connected: {}", database_url);
                store.set(pool).await;
                health_check_interval
            }
            Err(e) => {
                log::error!(
                    "Store connection error: {}. Retrying in {:?}",
                    e,
                    reconnect_delay
                );
                reconnect_delay
            }
        },
        Some(pool) => match ping(&pool).await {
            Ok(_) => health_check_interval,
            Err(e) => {
                log::error!("Store disconnected: {}. Trying to reconnect...", e);
                drop(pool);
                store.disconnect().await;
                reconnect_delay
            }
        },
    }
}
