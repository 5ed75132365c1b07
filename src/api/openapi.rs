//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::{analysis, error::ErrorResponse, health};
use crate::model::{
    AdaptStrategyRequest, AnalysisType, AnalyzeBaseRequest, ArmyOptimization, AttackEdge,
    BaseAnalysis, BattleLearning, BotAnalyzeRequest, BotData, BotStep, DeploymentCoordinates,
    DeploymentPlan, EdgeDeployment, GenerateStrategyRequest, LearnFromBattleRequest,
    OptimizeArmyRequest, OptimizeDeploymentRequest, PixelPoint, PlanAttackVisualRequest,
    SpellPixels, StepAction, StrategyAdaptation, SuccessMetrics, TargetPixels, VisualAttackPlan,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AI Attack Analyzer",
        description = "Base analysis, attack planning and bot coordinates backed by Gemini models"
    ),
    paths(
        health::health,
        analysis::analyze_base,
        analysis::optimize_deployment,
        analysis::adapt_strategy,
        analysis::optimize_army,
        analysis::learn_from_battle,
        analysis::plan_attack_visual,
        analysis::bot_analyze,
        analysis::generate_strategy,
        analysis::test_strategy,
    ),
    components(schemas(
        health::HealthStatus,
        ErrorResponse,
        AnalyzeBaseRequest,
        OptimizeDeploymentRequest,
        AdaptStrategyRequest,
        OptimizeArmyRequest,
        LearnFromBattleRequest,
        PlanAttackVisualRequest,
        BotAnalyzeRequest,
        GenerateStrategyRequest,
        analysis::AnalyzeBaseResponse,
        analysis::DeploymentResponse,
        analysis::AdaptationResponse,
        analysis::ArmyResponse,
        analysis::LearningResponse,
        analysis::AttackPlanResponse,
        analysis::BotAnalysisResponse,
        analysis::StrategyResponse,
        analysis::MockStrategyResponse,
        AnalysisType,
        BaseAnalysis,
        DeploymentPlan,
        StrategyAdaptation,
        ArmyOptimization,
        BattleLearning,
        SuccessMetrics,
        VisualAttackPlan,
        BotData,
        BotStep,
        StepAction,
        PixelPoint,
        DeploymentCoordinates,
        TargetPixels,
        EdgeDeployment,
        SpellPixels,
        AttackEdge,
    )),
    tags(
        (name = "health", description = "Liveness and model connectivity"),
        (name = "analysis", description = "Base analysis and attack planning"),
        (name = "bot", description = "Automation bot support")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
