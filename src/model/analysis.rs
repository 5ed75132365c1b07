//! Structured results extracted from model text
//!
//! Every field is always populated: when a pattern does not match, the extractor fills in
//! the field's fixed default.

use serde::Serialize;
use utoipa::ToSchema;

/// Which branch produced a base analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    ImageBased,
    TextBased,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseAnalysis {
    pub base_type: String,
    pub town_hall_level: i64,
    pub weak_points: Vec<String>,
    pub recommended_strategy: String,
    pub optimal_sides: i64,
    pub priority_targets: Vec<String>,
    /// `low`, `medium` or `high`
    pub risk_level: String,
    pub entry_points: Vec<String>,
    pub deployment_order: Vec<String>,
    pub wall_breaker_targets: Vec<String>,
    pub hero_deployment: String,
    pub spell_timing: Vec<String>,
    pub path_planning: String,
    pub success_probability: i64,
    pub expected_stars: i64,
    pub step_by_step_plan: Vec<String>,
    /// Vision model output, or a placeholder for text-based analysis
    pub base_analysis: String,
    pub full_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    pub timing: String,
    pub formation: String,
    pub support_troops: Vec<String>,
    /// 1-10 scale as stated by the model
    pub effectiveness: i64,
    pub recommendations: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAdaptation {
    pub should_pivot: bool,
    pub next_troops: String,
    pub target_priority: Vec<String>,
    pub spell_recommendations: Vec<String>,
    pub hero_timing: String,
    pub success_probability: i64,
    pub immediate_actions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArmyOptimization {
    pub troop_composition: Vec<String>,
    pub spell_selection: Vec<String>,
    pub hero_selection: Vec<String>,
    pub clan_castle_request: String,
    pub expected_stars: i64,
    pub resource_gain: String,
    pub full_recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BattleLearning {
    pub success_factors: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub strategy_adjustments: Vec<String>,
    pub deployment_lessons: Vec<String>,
    pub performance_score: i64,
    pub future_recommendations: Vec<String>,
    pub full_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessMetrics {
    pub expected_stars: i64,
    pub success_probability: i64,
    pub resource_gain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisualAttackPlan {
    pub base_layout: String,
    pub weaknesses: Vec<String>,
    pub attack_vectors: Vec<String>,
    pub detailed_steps: Vec<String>,
    pub deployment_zones: Vec<String>,
    pub wall_targets: Vec<String>,
    pub hero_strategy: String,
    pub spell_plan: Vec<String>,
    pub success_metrics: SuccessMetrics,
    pub contingency_plan: String,
    pub full_plan: String,
}
