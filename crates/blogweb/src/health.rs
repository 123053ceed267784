//! `GET /healthcheck`
//!
//! 200 `SERVING` when the probe reports serving, 200 `UNKNOWN` for any other
//! status, 503 `UNKNOWN` when the probe itself fails.

use actix_web::{get, http::header, web, HttpResponse};
use blog_core::proto::health::health_check_response::ServingStatus;
use tracing::{debug, error};

use crate::probe::HealthProbe;

const SERVING: &str = "SERVING";
const UNKNOWN: &str = "UNKNOWN";

/// Register the relay's routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthcheck);
}

#[get("/healthcheck")]
pub async fn healthcheck(probe: web::Data<dyn HealthProbe>) -> HttpResponse {
    match probe.check().await {
        Ok(ServingStatus::Serving) => plain(HttpResponse::Ok(), SERVING),
        Ok(status) => {
            debug!(status = ?status, "backend not serving");
            plain(HttpResponse::Ok(), UNKNOWN)
        }
        Err(err) => {
            error!(error = %err, "Error while calling healthcheck");
            plain(HttpResponse::ServiceUnavailable(), UNKNOWN)
        }
    }
}

fn plain(mut response: actix_web::HttpResponseBuilder, body: &'static str) -> HttpResponse {
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .content_type("text/plain; charset=utf-8")
        .body(body)
}
