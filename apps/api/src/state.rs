use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::mail::Mailer;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Session token store.
    pub redis: RedisClient,
    pub storage: Storage,
    /// Outbound mail transport. Default: HttpMailer.
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
}
