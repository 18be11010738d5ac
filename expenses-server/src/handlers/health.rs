use actix_web::HttpResponse;

pub async fn heartbeat() -> HttpResponse {
    HttpResponse::Ok().finish()
}
