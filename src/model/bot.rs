//! Pixel-level data consumed by the automation bot
//!
//! Coordinates are screen pixels on an 860x732 game window. Values come straight from the
//! model and are not range-checked.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Deploy,
    Wait,
    Spell,
    Unknown,
}

/// One step of the bot execution sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotStep {
    pub step_number: usize,
    pub action: String,
    pub action_type: StepAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_y: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub troop_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub troop_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_type: Option<String>,
}

impl BotStep {
    pub fn new(step_number: usize, action: impl Into<String>) -> Self {
        Self {
            step_number,
            action: action.into(),
            action_type: StepAction::Unknown,
            pixel_x: None,
            pixel_y: None,
            troop_count: None,
            troop_type: None,
            wait_time: None,
            spell_type: None,
        }
    }

    pub fn deploy(mut self, count: i64, troop: impl Into<String>) -> Self {
        self.action_type = StepAction::Deploy;
        self.troop_count = Some(count);
        self.troop_type = Some(troop.into());
        self
    }

    pub fn wait(mut self, millis: i64) -> Self {
        self.action_type = StepAction::Wait;
        self.wait_time = Some(millis);
        self
    }

    pub fn spell(mut self, spell: impl Into<String>) -> Self {
        self.action_type = StepAction::Spell;
        self.spell_type = Some(spell.into());
        self
    }

    pub fn at(mut self, point: PixelPoint) -> Self {
        self.pixel_x = Some(point.x);
        self.pixel_y = Some(point.y);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCoordinates {
    pub primary_x: i64,
    pub primary_y: i64,
    pub secondary_x: i64,
    pub secondary_y: i64,
    pub wall_breaker_x: i64,
    pub wall_breaker_y: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetPixels {
    pub town_hall_x: i64,
    pub town_hall_y: i64,
    pub dark_elixir_x: i64,
    pub dark_elixir_y: i64,
    #[serde(rename = "goldStorage1X")]
    pub gold_storage_1_x: i64,
    #[serde(rename = "goldStorage1Y")]
    pub gold_storage_1_y: i64,
    pub eagle_artillery_x: i64,
    pub eagle_artillery_y: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDeployment {
    pub tank_x: i64,
    pub tank_y: i64,
    pub dps_x: i64,
    pub dps_y: i64,
    pub hero_x: i64,
    pub hero_y: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpellPixels {
    pub heal_x: i64,
    pub heal_y: i64,
    pub rage_x: i64,
    pub rage_y: i64,
    pub jump_x: i64,
    pub jump_y: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttackEdge {
    /// TOP, BOTTOM, LEFT or RIGHT
    pub best_edge: String,
    pub start_pixel_x: i64,
    pub start_pixel_y: i64,
    pub spread_pixels: Vec<PixelPoint>,
}

/// Everything the bot needs to run one attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BotData {
    pub town_hall_level: String,
    pub base_type: String,
    pub recommended_strategy: String,
    pub deployment_coordinates: DeploymentCoordinates,
    pub target_pixels: TargetPixels,
    pub edge_deployment: EdgeDeployment,
    pub spell_pixels: SpellPixels,
    pub attack_edge: AttackEdge,
    pub execution_steps: Vec<BotStep>,
    pub raw_analysis: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_serializes_only_present_fields() {
        let step = BotStep::new(2, "WAIT 2000").wait(2000);
        assert_eq!(
            serde_json::to_value(&step).unwrap(),
            json!({
                "stepNumber": 2,
                "action": "WAIT 2000",
                "actionType": "wait",
                "waitTime": 2000
            })
        );
    }

    #[test]
    fn test_gold_storage_field_names() {
        let pixels = TargetPixels {
            town_hall_x: 1,
            town_hall_y: 2,
            dark_elixir_x: 3,
            dark_elixir_y: 4,
            gold_storage_1_x: 5,
            gold_storage_1_y: 6,
            eagle_artillery_x: 7,
            eagle_artillery_y: 8,
        };
        let value = serde_json::to_value(&pixels).unwrap();
        assert_eq!(value["goldStorage1X"], 5);
        assert_eq!(value["eagleArtilleryY"], 8);
    }
}
