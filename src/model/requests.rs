//! Inbound request bodies
//!
//! All fields are optional on the wire. Presence checks live in the analyzer service so
//! that a missing field produces a JSON error envelope instead of a deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Render a loosely-typed JSON field for prompt interpolation
///
/// Strings are inserted without quotes, other JSON values in their compact form.
pub fn prompt_value(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Same as [`prompt_value`] for plain optional strings
pub fn prompt_text(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBaseRequest {
    /// Data URI (`data:image/png;base64,...`) or image URL
    pub base_image: Option<String>,
    pub troop_composition: Option<String>,
    pub target_resources: Option<String>,
    /// Free-text layout description, used when no image is supplied
    pub base_layout: Option<String>,
    pub defense_positions: Option<Vec<String>>,
    pub wall_configuration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeDeploymentRequest {
    pub troop_type: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub quantity: Option<Value>,
    pub current_situation: Option<String>,
    pub enemy_defenses: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdaptStrategyRequest {
    /// Battle completion percentage
    #[schema(value_type = Option<Object>)]
    pub battle_progress: Option<Value>,
    pub remaining_troops: Option<String>,
    pub enemy_status: Option<String>,
    pub objectives: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeArmyRequest {
    pub target_base_type: Option<String>,
    pub available_troops: Option<String>,
    pub attack_goal: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub town_hall_level: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearnFromBattleRequest {
    pub battle_result: Option<String>,
    pub strategy_used: Option<String>,
    pub troops_used: Option<String>,
    pub outcome: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub resources: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanAttackVisualRequest {
    pub base_image: Option<String>,
    pub available_army: Option<String>,
    /// Defaults to `resources`
    pub attack_goal: Option<String>,
    /// Defaults to 11
    #[schema(value_type = Option<Object>)]
    pub player_level: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotAnalyzeRequest {
    pub base_image: Option<String>,
    pub troop_composition: Option<String>,
    pub target_resources: Option<String>,
}

/// Parameters of the drop-order strategy generator
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStrategyRequest {
    /// 0 = all troops, 1 = barch only, 2 = giant + barch
    #[schema(value_type = Option<Object>)]
    pub match_mode: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub drop_order: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub nb_sides: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub available_troops: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub target_info: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct HealthQuery {
    /// Set to `true` to probe the text model
    #[serde(rename = "testAI")]
    pub test_ai: Option<String>,
}

impl HealthQuery {
    pub fn wants_ai_probe(&self) -> bool {
        self.test_ai.as_deref() == Some("true")
    }
}
