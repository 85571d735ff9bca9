// Route exports
pub mod render;
pub mod stock;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(stock::configure),
    );
}
