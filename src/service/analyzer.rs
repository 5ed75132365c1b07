//! Attack analyzer service
//!
//! One operation per endpoint. Each operation validates its input, builds a prompt, runs it
//! through the vision or text invoker and turns the reply into structured data.

use serde_json::Value;

use crate::model::{
    AdaptStrategyRequest, AnalysisType, AnalyzeBaseRequest, ArmyOptimization, BaseAnalysis,
    BattleLearning, BotAnalyzeRequest, BotData, DeploymentPlan, GenerateStrategyRequest,
    ImageInput, ImageInputError, LearnFromBattleRequest, OptimizeArmyRequest,
    OptimizeDeploymentRequest, PlanAttackVisualRequest, StrategyAdaptation, VisualAttackPlan,
};
use crate::service::extraction::analysis::{
    extract_adaptation, extract_army, extract_base_analysis, extract_deployment,
    extract_learning, extract_visual_plan,
};
use crate::service::extraction::bot::parse_bot_analysis;
use crate::service::extraction::strategy::{StrategyParseError, mock_strategy, parse_strategy};
use crate::service::invoker::{InvokeError, ModelInvoker, ModelResponse};
use crate::service::llm::GenerationRequest;
use crate::service::prompts;

pub const MISSING_BASE_INPUT: &str =
    "Base image or base layout description is required for analysis";
pub const MISSING_VISUAL_IMAGE: &str = "Base image is required for visual attack planning";
pub const MISSING_BOT_IMAGE: &str = "Base image is required for bot analysis";

/// Stands in for the vision description when scanning text-only replies
pub const TEXT_ANALYSIS_PLACEHOLDER: &str = "Text-based analysis - no image provided";
/// Reported as `baseAnalysis` when no image was analyzed
pub const NO_IMAGE_ANALYSIS: &str = "No image analysis performed";
pub const TEXT_ANALYSIS_MODEL: &str = "N/A (Text-based analysis)";

const CTX_ANALYZE_BASE: &str = "Failed to analyze base";
const CTX_DEPLOYMENT: &str = "Failed to optimize deployment";
const CTX_ADAPT: &str = "Failed to adapt strategy";
const CTX_ARMY: &str = "Failed to optimize army";
const CTX_LEARNING: &str = "Failed to analyze battle for learning";
const CTX_VISUAL_PLAN: &str = "Failed to create visual attack plan";
const CTX_BOT: &str = "Failed to analyze base for bot";
const CTX_STRATEGY: &str = "Failed to generate strategy";

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// Rejected before any model call
    #[error("{0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Model {
        context: &'static str,
        #[source]
        source: InvokeError,
    },
}

impl From<ImageInputError> for AnalyzerError {
    fn from(err: ImageInputError) -> Self {
        AnalyzerError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct BaseAnalysisResult {
    pub analysis: BaseAnalysis,
    pub vision_model_used: String,
    pub analysis_type: AnalysisType,
}

#[derive(Debug, Clone)]
pub struct BotAnalysisResult {
    pub bot_data: BotData,
    pub model_used: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Outcome of drop-order generation. An unparseable reply is a result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedStrategy {
    Parsed(Vec<Value>),
    Unparsed {
        error: StrategyParseError,
        raw_response: String,
    },
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn require_image(raw: Option<&str>, missing: &str) -> Result<ImageInput, AnalyzerError> {
    let raw = non_blank(raw).ok_or_else(|| AnalyzerError::Validation(missing.to_string()))?;
    Ok(ImageInput::parse(raw)?)
}

pub struct AttackAnalyzer {
    vision: ModelInvoker,
    text: ModelInvoker,
}

impl AttackAnalyzer {
    pub fn new(vision: ModelInvoker, text: ModelInvoker) -> Self {
        tracing::info!(
            vision_models = vision.candidates().len(),
            text_models = text.candidates().len(),
            "Attack analyzer initialized"
        );
        Self { vision, text }
    }

    async fn run(
        invoker: &ModelInvoker,
        request: GenerationRequest,
        context: &'static str,
    ) -> Result<ModelResponse, AnalyzerError> {
        invoker
            .invoke(&request)
            .await
            .map_err(|source| AnalyzerError::Model { context, source })
    }

    /// Analyze a base from an image (vision then strategy) or from a layout description
    pub async fn analyze_base(
        &self,
        request: &AnalyzeBaseRequest,
    ) -> Result<BaseAnalysisResult, AnalyzerError> {
        let image = non_blank(request.base_image.as_deref());
        let layout = non_blank(request.base_layout.as_deref());

        match (image, layout) {
            (Some(raw), _) => {
                let image = ImageInput::parse(raw)?;
                tracing::info!(
                    inline = image.is_inline(),
                    media_type = image.media_type(),
                    "Running image-based base analysis"
                );

                let vision = Self::run(
                    &self.vision,
                    GenerationRequest::with_image(prompts::BASE_VISION_PROMPT, image),
                    CTX_ANALYZE_BASE,
                )
                .await?;

                let strategy_prompt = prompts::build_strategy_prompt(
                    &vision.text,
                    request.troop_composition.as_deref(),
                    request.target_resources.as_deref(),
                );
                let strategy = Self::run(
                    &self.text,
                    GenerationRequest::text(strategy_prompt),
                    CTX_ANALYZE_BASE,
                )
                .await?;

                Ok(BaseAnalysisResult {
                    analysis: extract_base_analysis(&strategy.text, &vision.text),
                    vision_model_used: vision.model_used,
                    analysis_type: AnalysisType::ImageBased,
                })
            }
            (None, Some(_)) => {
                tracing::info!("Running text-based base analysis");

                let strategy = Self::run(
                    &self.text,
                    GenerationRequest::text(prompts::build_text_analysis_prompt(request)),
                    CTX_ANALYZE_BASE,
                )
                .await?;

                let mut analysis =
                    extract_base_analysis(&strategy.text, TEXT_ANALYSIS_PLACEHOLDER);
                analysis.base_analysis = NO_IMAGE_ANALYSIS.to_string();

                Ok(BaseAnalysisResult {
                    analysis,
                    vision_model_used: TEXT_ANALYSIS_MODEL.to_string(),
                    analysis_type: AnalysisType::TextBased,
                })
            }
            (None, None) => Err(AnalyzerError::Validation(MISSING_BASE_INPUT.to_string())),
        }
    }

    pub async fn optimize_deployment(
        &self,
        request: &OptimizeDeploymentRequest,
    ) -> Result<DeploymentPlan, AnalyzerError> {
        let prompt = prompts::build_deployment_prompt(request);
        let response = Self::run(&self.text, GenerationRequest::text(prompt), CTX_DEPLOYMENT).await?;
        Ok(extract_deployment(&response.text))
    }

    pub async fn adapt_strategy(
        &self,
        request: &AdaptStrategyRequest,
    ) -> Result<StrategyAdaptation, AnalyzerError> {
        let prompt = prompts::build_adaptation_prompt(request);
        let response = Self::run(&self.text, GenerationRequest::text(prompt), CTX_ADAPT).await?;
        Ok(extract_adaptation(&response.text))
    }

    pub async fn optimize_army(
        &self,
        request: &OptimizeArmyRequest,
    ) -> Result<ArmyOptimization, AnalyzerError> {
        let prompt = prompts::build_army_prompt(request);
        let response = Self::run(&self.text, GenerationRequest::text(prompt), CTX_ARMY).await?;
        Ok(extract_army(&response.text))
    }

    pub async fn learn_from_battle(
        &self,
        request: &LearnFromBattleRequest,
    ) -> Result<BattleLearning, AnalyzerError> {
        let prompt = prompts::build_learning_prompt(request);
        let response = Self::run(&self.text, GenerationRequest::text(prompt), CTX_LEARNING).await?;
        Ok(extract_learning(&response.text))
    }

    pub async fn plan_attack_visual(
        &self,
        request: &PlanAttackVisualRequest,
    ) -> Result<VisualAttackPlan, AnalyzerError> {
        let image = require_image(request.base_image.as_deref(), MISSING_VISUAL_IMAGE)?;
        let prompt = prompts::build_visual_plan_prompt(request);

        let response = Self::run(
            &self.vision,
            GenerationRequest::with_image(prompt, image),
            CTX_VISUAL_PLAN,
        )
        .await?;

        tracing::info!(model = %response.model_used, "Visual attack plan generated");
        Ok(extract_visual_plan(&response.text))
    }

    /// Pixel-level analysis for the automation bot
    pub async fn bot_analyze(
        &self,
        request: &BotAnalyzeRequest,
    ) -> Result<BotAnalysisResult, AnalyzerError> {
        let image = require_image(request.base_image.as_deref(), MISSING_BOT_IMAGE)?;
        let prompt = prompts::build_bot_prompt(request);

        let response =
            Self::run(&self.vision, GenerationRequest::with_image(prompt, image), CTX_BOT).await?;

        let bot_data = parse_bot_analysis(&response.text);
        tracing::info!(
            model = %response.model_used,
            steps = bot_data.execution_steps.len(),
            edge = %bot_data.attack_edge.best_edge,
            "Bot analysis complete"
        );

        Ok(BotAnalysisResult {
            bot_data,
            model_used: response.model_used,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Drop-order strategy as a JSON array
    pub async fn generate_strategy(
        &self,
        request: &GenerateStrategyRequest,
    ) -> Result<GeneratedStrategy, AnalyzerError> {
        let prompt = prompts::build_strategy_array_prompt(request);
        let response = Self::run(&self.text, GenerationRequest::text(prompt), CTX_STRATEGY).await?;

        match parse_strategy(&response.text) {
            Ok(rows) => Ok(GeneratedStrategy::Parsed(rows)),
            Err(error) => {
                tracing::warn!(error = %error, model = %response.model_used, "Strategy reply was not a JSON array");
                Ok(GeneratedStrategy::Unparsed {
                    error,
                    raw_response: response.text,
                })
            }
        }
    }

    /// Fixed strategy for exercising clients without a model
    pub fn test_strategy(&self) -> Vec<Value> {
        mock_strategy()
    }

    /// Ask the text model for a trivial reply
    pub async fn check_connectivity(&self) -> Result<String, InvokeError> {
        self.text
            .invoke(&GenerationRequest::text(prompts::CONNECTIVITY_PROMPT))
            .await
            .map(|response| response.text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::service::invoker::testing::{ScriptedModel, invoker_of};
    use crate::service::llm::ModelError;

    fn data_uri() -> String {
        format!("data:image/png;base64,{}", "A".repeat(120))
    }

    struct Fixture {
        vision_a: Arc<ScriptedModel>,
        vision_b: Arc<ScriptedModel>,
        text: Arc<ScriptedModel>,
        analyzer: AttackAnalyzer,
    }

    fn fixture(
        vision_a: Arc<ScriptedModel>,
        vision_b: Arc<ScriptedModel>,
        text: Arc<ScriptedModel>,
    ) -> Fixture {
        let analyzer = AttackAnalyzer::new(
            invoker_of(&[("Vision A", vision_a.clone()), ("Vision B", vision_b.clone())]),
            invoker_of(&[("Text", text.clone())]),
        );
        Fixture {
            vision_a,
            vision_b,
            text,
            analyzer,
        }
    }

    fn calls(f: &Fixture) -> (usize, usize, usize) {
        (f.vision_a.calls(), f.vision_b.calls(), f.text.calls())
    }

    #[tokio::test]
    async fn test_analyze_base_requires_image_or_layout() {
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "x"),
        );

        let err = f
            .analyzer
            .analyze_base(&AnalyzeBaseRequest {
                base_image: Some("  ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(&err, AnalyzerError::Validation(m) if m == MISSING_BASE_INPUT));
        assert_eq!(calls(&f), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_analyze_base_rejects_empty_payload_without_calls() {
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "x"),
        );

        let err = f
            .analyzer
            .analyze_base(&AnalyzeBaseRequest {
                base_image: Some("data:image/png;base64,".to_string()),
                base_layout: Some("ring".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::Validation(_)));
        assert_eq!(calls(&f), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_analyze_base_text_branch() {
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "Base type: Farming base\nRisk: low"),
        );

        let result = f
            .analyzer
            .analyze_base(&AnalyzeBaseRequest {
                base_layout: Some("spread out farm".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.analysis_type, AnalysisType::TextBased);
        assert_eq!(result.vision_model_used, TEXT_ANALYSIS_MODEL);
        assert_eq!(result.analysis.base_type, "Farming base");
        assert_eq!(result.analysis.risk_level, "low");
        assert_eq!(result.analysis.base_analysis, NO_IMAGE_ANALYSIS);
        assert_eq!(calls(&f), (0, 0, 1));
        assert!(f.text.requests()[0].prompt.contains("spread out farm"));
        assert!(f.text.requests()[0].image.is_none());
    }

    #[tokio::test]
    async fn test_analyze_base_image_branch_with_fallback() {
        let f = fixture(
            ScriptedModel::always_err("a", "HTTP 429 Too Many Requests: quota exhausted"),
            ScriptedModel::always_ok("b", "Town Hall level 13 behind a ring of walls"),
            ScriptedModel::always_ok("t", "Base type: War base\nExpected 3 stars"),
        );

        let result = f
            .analyzer
            .analyze_base(&AnalyzeBaseRequest {
                base_image: Some(data_uri()),
                troop_composition: Some("20 Giants".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.analysis_type, AnalysisType::ImageBased);
        assert_eq!(result.vision_model_used, "Vision B");
        assert_eq!(result.analysis.town_hall_level, 13);
        assert_eq!(result.analysis.base_type, "War base");
        assert_eq!(result.analysis.expected_stars, 3);
        assert_eq!(calls(&f), (1, 1, 1));

        let vision_request = &f.vision_b.requests()[0];
        assert!(matches!(vision_request.image, Some(ImageInput::Inline { .. })));

        let strategy_prompt = &f.text.requests()[0].prompt;
        assert!(strategy_prompt.contains("Town Hall level 13 behind a ring of walls"));
        assert!(strategy_prompt.contains("20 Giants"));
    }

    #[tokio::test]
    async fn test_analyze_base_auth_failure_is_model_error() {
        let f = fixture(
            ScriptedModel::always_err("a", "HTTP 403 Forbidden: API key not valid"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "x"),
        );

        let err = f
            .analyzer
            .analyze_base(&AnalyzeBaseRequest {
                base_image: Some(data_uri()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            AnalyzerError::Model { context, source } => {
                assert_eq!(context, CTX_ANALYZE_BASE);
                assert!(matches!(source, InvokeError::AuthenticationFailed { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls(&f), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_text_endpoints_extract_defaults() {
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "Nothing structured here"),
        );

        let deployment = f
            .analyzer
            .optimize_deployment(&OptimizeDeploymentRequest::default())
            .await
            .unwrap();
        assert_eq!(deployment.effectiveness, 7);
        assert_eq!(deployment.recommendations, "Nothing structured here");

        let adaptation = f
            .analyzer
            .adapt_strategy(&AdaptStrategyRequest::default())
            .await
            .unwrap();
        assert!(!adaptation.should_pivot);

        let army = f
            .analyzer
            .optimize_army(&OptimizeArmyRequest::default())
            .await
            .unwrap();
        assert_eq!(army.clan_castle_request, "Dragons or Electro Dragons");

        let learning = f
            .analyzer
            .learn_from_battle(&LearnFromBattleRequest::default())
            .await
            .unwrap();
        assert_eq!(learning.performance_score, 7);

        assert_eq!(calls(&f), (0, 0, 4));
    }

    #[tokio::test]
    async fn test_visual_plan_requires_image() {
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "x"),
        );

        let err = f
            .analyzer
            .plan_attack_visual(&PlanAttackVisualRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(&err, AnalyzerError::Validation(m) if m == MISSING_VISUAL_IMAGE));
        assert_eq!(calls(&f), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_visual_plan_uses_vision_model() {
        let f = fixture(
            ScriptedModel::always_ok("a", "**Step 1:** Open the south wall\nExpect 2 stars"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "x"),
        );

        let plan = f
            .analyzer
            .plan_attack_visual(&PlanAttackVisualRequest {
                base_image: Some(format!("https://cdn.example.com/bases/{}.png", "a".repeat(80))),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(plan.detailed_steps, vec!["Open the south wall".to_string()]);
        assert_eq!(calls(&f), (1, 0, 0));
        assert!(matches!(
            f.vision_a.requests()[0].image,
            Some(ImageInput::Remote { .. })
        ));
    }

    #[tokio::test]
    async fn test_bot_analyze() {
        let f = fixture(
            ScriptedModel::always_ok(
                "a",
                "TOWN_HALL_LEVEL: 11\nBEST_ATTACK_EDGE: TOP\nSTEP_1: WAIT 1500",
            ),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "x"),
        );

        let result = f
            .analyzer
            .bot_analyze(&BotAnalyzeRequest {
                base_image: Some(data_uri()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.model_used, "Vision A");
        assert_eq!(result.bot_data.town_hall_level, "11");
        assert_eq!(result.bot_data.attack_edge.best_edge, "TOP");
        assert_eq!(result.bot_data.execution_steps[0].wait_time, Some(1500));
        assert!(result.bot_data.raw_analysis.starts_with("TOWN_HALL_LEVEL: 11"));
        assert!(result.timestamp > 0);
    }

    #[tokio::test]
    async fn test_bot_analyze_requires_image() {
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "x"),
        );

        let err = f
            .analyzer
            .bot_analyze(&BotAnalyzeRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_BOT_IMAGE);
    }

    #[tokio::test]
    async fn test_generate_strategy_parsed_and_unparsed() {
        let text = ScriptedModel::scripted(
            "t",
            vec![
                Ok(r#"[["$eGiant", 2, 1, 1, 2]]"#.to_string()),
                Ok("Sorry, no strategy today".to_string()),
            ],
            Err(ModelError::new("unused")),
        );
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            text,
        );
        let request = GenerateStrategyRequest::default();

        let parsed = f.analyzer.generate_strategy(&request).await.unwrap();
        assert!(matches!(parsed, GeneratedStrategy::Parsed(rows) if rows.len() == 1));

        let unparsed = f.analyzer.generate_strategy(&request).await.unwrap();
        assert_eq!(
            unparsed,
            GeneratedStrategy::Unparsed {
                error: StrategyParseError::NoJson,
                raw_response: "Sorry, no strategy today".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_check_connectivity() {
        let f = fixture(
            ScriptedModel::always_ok("a", "x"),
            ScriptedModel::always_ok("b", "x"),
            ScriptedModel::always_ok("t", "OK"),
        );
        assert_eq!(f.analyzer.check_connectivity().await.unwrap(), "OK");
        assert_eq!(f.analyzer.test_strategy().len(), 6);
    }
}
