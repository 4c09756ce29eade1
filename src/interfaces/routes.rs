use actix_web::web;

use crate::handlers::json_error::route_not_found;

mod images;
mod system;
mod upload;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(system::config_routes);

    cfg.service(
        web::scope("/api")
            .configure(upload::config_routes)
    );

    cfg.configure(images::config_routes);
    cfg.default_service(web::to(route_not_found));
}
