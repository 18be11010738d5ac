use actix_web::web;

use crate::handlers::user;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/create", web::post().to(user::create))
            .route("/get", web::get().to(user::get))
            .route("/delete", web::delete().to(user::delete)),
    );
}
