use actix_web::web;

use crate::handlers::auth;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/sign_in", web::post().to(auth::sign_in))
            .route("/logout", web::post().to(auth::logout)),
    );
}
