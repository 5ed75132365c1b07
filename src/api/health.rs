//! Health check endpoint with optional model connectivity probe

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::HealthQuery;
use crate::service::AttackAnalyzer;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub version: String,
    /// `ok` or `failed`, present only when the probe ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

/// Liveness endpoint
///
/// Always returns 200 while the process is up. With `testAI=true` the text model is asked
/// for a trivial reply and the outcome is reported alongside; a failed probe is still a 200.
#[utoipa::path(
    get,
    path = "/health",
    params(HealthQuery),
    responses(
        (status = 200, description = "Service is running", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health")]
pub async fn health(
    analyzer: web::Data<AttackAnalyzer>,
    query: web::Query<HealthQuery>,
) -> impl Responder {
    let mut status = HealthStatus {
        status: "ok".to_string(),
        message: "AI Attack Analyzer is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_connection: None,
        ai_response: None,
        ai_error: None,
    };

    if query.wants_ai_probe() {
        match analyzer.check_connectivity().await {
            Ok(reply) => {
                tracing::debug!("AI connectivity probe passed");
                status.ai_connection = Some("ok".to_string());
                status.ai_response = Some(reply);
            }
            Err(e) => {
                tracing::error!(error = %e, "AI connectivity probe failed");
                status.ai_connection = Some("failed".to_string());
                status.ai_error = Some(e.to_string());
            }
        }
    }

    HttpResponse::Ok().json(status)
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
