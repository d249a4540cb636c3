pub mod ai;
pub mod api;
pub mod config;
pub mod db;
pub mod workflow;

pub use db::DbPool;

use std::sync::Arc;
use tokio::sync::watch;

use ai::ModelGateway;
use config::Config;
use workflow::FeedSignal;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub gateway: Arc<dyn ModelGateway>,
    /// Generation counter for public listings of approved messages. The
    /// workflows bump it after every mutation; display layers subscribe
    /// and re-fetch when it moves.
    pub feed: FeedSignal,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, gateway: Arc<dyn ModelGateway>) -> Self {
        let (feed, _) = watch::channel(0);
        Self {
            config,
            db,
            gateway,
            feed,
        }
    }

    pub fn subscribe_feed(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }
}
