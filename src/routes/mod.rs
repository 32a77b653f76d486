// Route exports
pub mod health;
pub mod orders;
pub mod restaurants;

use actix_web::web;
use std::sync::Arc;

use crate::config::SearchSettings;
use crate::core::Matcher;
use crate::services::{CacheManager, PostgresClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub matcher: Matcher,
    pub search: SearchSettings,
    pub max_assignment_attempts: u32,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(restaurants::configure)
            .configure(orders::configure),
    );
}
