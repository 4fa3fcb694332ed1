// Route exports
pub mod stations;

use actix_web::web;

pub use stations::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(stations::configure),
    );
}
