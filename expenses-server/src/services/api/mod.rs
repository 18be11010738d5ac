use actix_web::web;

mod auth;
mod category;
mod expense;
mod health;
mod user;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // The category scope must be registered before the expense scope so
    // "/expense/category/..." paths don't fall into "/expense"
    cfg.service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(user::configure)
            .configure(category::configure)
            .configure(expense::configure)
            .configure(health::configure),
    );
}
