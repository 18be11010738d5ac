use actix_web::web;

use crate::handlers::expense;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/expense")
            .route("/create", web::post().to(expense::create))
            .route("/all", web::get().to(expense::get_all))
            .route("/search", web::get().to(expense::search))
            .route("/recent", web::get().to(expense::recent))
            .route("/by_category", web::get().to(expense::by_category))
            .route("/{expense_id}", web::put().to(expense::update))
            .route("/{expense_id}", web::delete().to(expense::delete)),
    );
}
