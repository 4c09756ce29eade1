use actix_web::web;

use crate::handlers::images;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(images::fetch_image);
}
