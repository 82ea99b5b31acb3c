use actix_web::web;

use crate::handlers::{ask_config, health_check};

/// Configure all routes for the API
pub fn app_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
    ask_config(cfg);
}
