use actix_web::web;

use crate::handlers::category;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/expense/category")
            .route("/create", web::post().to(category::create))
            .route("/all", web::get().to(category::get_all))
            .route("/{category_id}", web::put().to(category::update))
            .route("/{category_id}", web::delete().to(category::delete)),
    );
}
