use actix_web::web;

use crate::handlers::upload;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload::upload_image);
}
