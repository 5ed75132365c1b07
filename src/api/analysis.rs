//! REST API endpoints for attack analysis

use actix_web::{HttpResponse, post, web};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{
    AdaptStrategyRequest, AnalysisType, AnalyzeBaseRequest, ArmyOptimization, BaseAnalysis,
    BattleLearning, BotAnalyzeRequest, BotData, DeploymentPlan, GenerateStrategyRequest,
    LearnFromBattleRequest, OptimizeArmyRequest, OptimizeDeploymentRequest,
    PlanAttackVisualRequest, StrategyAdaptation, VisualAttackPlan,
};
use crate::service::AttackAnalyzer;
use crate::service::analyzer::GeneratedStrategy;

/// Request bodies may carry base64 screenshots
const JSON_LIMIT: usize = 50 * 1024 * 1024;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBaseResponse {
    pub success: bool,
    pub analysis: BaseAnalysis,
    pub vision_model_used: String,
    pub analysis_type: AnalysisType,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentResponse {
    pub success: bool,
    pub deployment: DeploymentPlan,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdaptationResponse {
    pub success: bool,
    pub adaptation: StrategyAdaptation,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArmyResponse {
    pub success: bool,
    pub army_optimization: ArmyOptimization,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LearningResponse {
    pub success: bool,
    pub learning: BattleLearning,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttackPlanResponse {
    pub success: bool,
    pub attack_plan: VisualAttackPlan,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotAnalysisResponse {
    pub success: bool,
    pub bot_data: BotData,
    pub raw_analysis: String,
    pub model_used: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Drop-order strategy, or the raw reply when it could not be parsed
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResponse {
    pub success: bool,
    /// Rows of `[troop, sides, waves, delay, count]`
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub strategy: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl From<GeneratedStrategy> for StrategyResponse {
    fn from(generated: GeneratedStrategy) -> Self {
        match generated {
            GeneratedStrategy::Parsed(rows) => Self {
                success: true,
                strategy: Some(rows),
                error: None,
                raw_response: None,
            },
            GeneratedStrategy::Unparsed {
                error,
                raw_response,
            } => Self {
                success: false,
                strategy: None,
                error: Some(error.to_string()),
                raw_response: Some(raw_response),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MockStrategyResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub strategy: Vec<Value>,
    pub message: String,
    /// The request body, echoed back
    pub input: GenerateStrategyRequest,
}

/// Analyze a base from a screenshot or a layout description
#[utoipa::path(
    post,
    path = "/api/analyze-base",
    request_body = AnalyzeBaseRequest,
    responses(
        (status = 200, description = "Base analyzed", body = AnalyzeBaseResponse),
        (status = 400, description = "Neither image nor layout supplied", body = ErrorResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/analyze-base")]
pub async fn analyze_base(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<AnalyzeBaseRequest>,
) -> Result<HttpResponse, ApiError> {
    let result = analyzer.analyze_base(&body).await?;

    Ok(HttpResponse::Ok().json(AnalyzeBaseResponse {
        success: true,
        analysis: result.analysis,
        vision_model_used: result.vision_model_used,
        analysis_type: result.analysis_type,
    }))
}

#[utoipa::path(
    post,
    path = "/api/optimize-deployment",
    request_body = OptimizeDeploymentRequest,
    responses(
        (status = 200, description = "Deployment plan", body = DeploymentResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/optimize-deployment")]
pub async fn optimize_deployment(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<OptimizeDeploymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let deployment = analyzer.optimize_deployment(&body).await?;
    Ok(HttpResponse::Ok().json(DeploymentResponse {
        success: true,
        deployment,
    }))
}

/// Adjust a running attack to the battle state
#[utoipa::path(
    post,
    path = "/api/adapt-strategy",
    request_body = AdaptStrategyRequest,
    responses(
        (status = 200, description = "Strategy adaptation", body = AdaptationResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/adapt-strategy")]
pub async fn adapt_strategy(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<AdaptStrategyRequest>,
) -> Result<HttpResponse, ApiError> {
    let adaptation = analyzer.adapt_strategy(&body).await?;
    Ok(HttpResponse::Ok().json(AdaptationResponse {
        success: true,
        adaptation,
    }))
}

#[utoipa::path(
    post,
    path = "/api/optimize-army",
    request_body = OptimizeArmyRequest,
    responses(
        (status = 200, description = "Army composition", body = ArmyResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/optimize-army")]
pub async fn optimize_army(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<OptimizeArmyRequest>,
) -> Result<HttpResponse, ApiError> {
    let army_optimization = analyzer.optimize_army(&body).await?;
    Ok(HttpResponse::Ok().json(ArmyResponse {
        success: true,
        army_optimization,
    }))
}

#[utoipa::path(
    post,
    path = "/api/learn-from-battle",
    request_body = LearnFromBattleRequest,
    responses(
        (status = 200, description = "Battle review", body = LearningResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/learn-from-battle")]
pub async fn learn_from_battle(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<LearnFromBattleRequest>,
) -> Result<HttpResponse, ApiError> {
    let learning = analyzer.learn_from_battle(&body).await?;
    Ok(HttpResponse::Ok().json(LearningResponse {
        success: true,
        learning,
    }))
}

/// Build a step-by-step attack plan from a base screenshot
#[utoipa::path(
    post,
    path = "/api/plan-attack-visual",
    request_body = PlanAttackVisualRequest,
    responses(
        (status = 200, description = "Visual attack plan", body = AttackPlanResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/plan-attack-visual")]
pub async fn plan_attack_visual(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<PlanAttackVisualRequest>,
) -> Result<HttpResponse, ApiError> {
    let attack_plan = analyzer.plan_attack_visual(&body).await?;
    Ok(HttpResponse::Ok().json(AttackPlanResponse {
        success: true,
        attack_plan,
    }))
}

/// Pixel coordinates and execution steps for the automation bot
#[utoipa::path(
    post,
    path = "/api/bot-analyze",
    request_body = BotAnalyzeRequest,
    responses(
        (status = 200, description = "Bot data", body = BotAnalysisResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "bot"
)]
#[post("/api/bot-analyze")]
pub async fn bot_analyze(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<BotAnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let result = analyzer.bot_analyze(&body).await?;

    Ok(HttpResponse::Ok().json(BotAnalysisResponse {
        success: true,
        raw_analysis: result.bot_data.raw_analysis.clone(),
        bot_data: result.bot_data,
        model_used: result.model_used,
        timestamp: result.timestamp,
    }))
}

/// Generate a drop-order strategy
///
/// A reply that is not a JSON array still answers 200, with `success: false` and the raw text.
#[utoipa::path(
    post,
    path = "/api/generate-strategy",
    request_body = GenerateStrategyRequest,
    responses(
        (status = 200, description = "Strategy rows or unparsed reply", body = StrategyResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    ),
    tag = "bot"
)]
#[post("/api/generate-strategy")]
pub async fn generate_strategy(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<GenerateStrategyRequest>,
) -> Result<HttpResponse, ApiError> {
    let generated = analyzer.generate_strategy(&body).await?;
    Ok(HttpResponse::Ok().json(StrategyResponse::from(generated)))
}

/// Fixed strategy for client testing, no model call
#[utoipa::path(
    post,
    path = "/api/test-strategy",
    request_body = GenerateStrategyRequest,
    responses(
        (status = 200, description = "Mock strategy", body = MockStrategyResponse)
    ),
    tag = "bot"
)]
#[post("/api/test-strategy")]
pub async fn test_strategy(
    analyzer: web::Data<AttackAnalyzer>,
    body: web::Json<GenerateStrategyRequest>,
) -> HttpResponse {
    HttpResponse::Ok().json(MockStrategyResponse {
        success: true,
        strategy: analyzer.test_strategy(),
        message: "Mock strategy generated for testing".to_string(),
        input: body.into_inner(),
    })
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(analyze_base)
    .service(optimize_deployment)
    .service(adapt_strategy)
    .service(optimize_army)
    .service(learn_from_battle)
    .service(plan_attack_visual)
    .service(bot_analyze)
    .service(generate_strategy)
    .service(test_strategy);
}
