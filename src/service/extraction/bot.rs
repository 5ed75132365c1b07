//! Parsing of the pixel-format bot analysis
//!
//! The bot prompt asks for `KEY: value` lines and a `STEP_n:` execution sequence. Every
//! value has a fallback so the bot always receives a complete, executable structure.

use std::sync::LazyLock;

use regex::Regex;

use super::{KeyValueRule, clean_value, first_number};
use crate::model::{
    AttackEdge, BotData, BotStep, DeploymentCoordinates, EdgeDeployment, PixelPoint,
    SpellPixels, TargetPixels,
};

pub const DEFAULT_START_PIXEL: PixelPoint = PixelPoint::new(430, 670);
pub const DEFAULT_SPREAD_PIXELS: [PixelPoint; 3] = [
    PixelPoint::new(380, 670),
    PixelPoint::new(430, 670),
    PixelPoint::new(480, 670),
];
pub const DEFAULT_EDGE: &str = "BOTTOM";

/// Words that end a troop or spell name inside a step body
const NAME_STOP_WORDS: &[&str] = &["AT", "AT_PIXEL", "WHEN"];

/// A pixel coordinate key pair with its fallback
pub struct PixelRule {
    pub x: KeyValueRule,
    pub y: KeyValueRule,
    pub default: PixelPoint,
}

impl PixelRule {
    fn new(x: &'static str, y: &'static str, default: PixelPoint) -> Self {
        Self {
            x: KeyValueRule::new(x),
            y: KeyValueRule::new(y),
            default,
        }
    }

    pub fn apply(&self, text: &str) -> PixelPoint {
        PixelPoint::new(
            self.x.number(text, self.default.x),
            self.y.number(text, self.default.y),
        )
    }
}

pub struct BotRules {
    pub town_hall_level: KeyValueRule,
    pub base_type: KeyValueRule,
    pub recommended_strategy: KeyValueRule,
    pub primary_deploy: PixelRule,
    pub secondary_deploy: PixelRule,
    pub wall_breaker_deploy: PixelRule,
    pub town_hall: PixelRule,
    pub dark_elixir: PixelRule,
    pub gold_storage_1: PixelRule,
    pub eagle_artillery: PixelRule,
    pub tank_deploy: PixelRule,
    pub dps_deploy: PixelRule,
    pub hero_deploy: PixelRule,
    pub heal_spell: PixelRule,
    pub rage_spell: PixelRule,
    pub jump_spell: PixelRule,
    pub best_attack_edge: KeyValueRule,
    pub attack_start_pixel: KeyValueRule,
    pub attack_spread_pixels: KeyValueRule,
    spread_pair: Regex,
    step_marker: Regex,
    step_pixel: Regex,
    step_deploy: Regex,
    step_wait: Regex,
    step_spell: Regex,
}

pub static BOT_RULES: LazyLock<BotRules> = LazyLock::new(|| BotRules {
    town_hall_level: KeyValueRule::new("TOWN_HALL_LEVEL"),
    base_type: KeyValueRule::new("BASE_TYPE"),
    recommended_strategy: KeyValueRule::new("RECOMMENDED_STRATEGY"),
    primary_deploy: PixelRule::new("PRIMARY_DEPLOY_X", "PRIMARY_DEPLOY_Y", PixelPoint::new(430, 650)),
    secondary_deploy: PixelRule::new(
        "SECONDARY_DEPLOY_X",
        "SECONDARY_DEPLOY_Y",
        PixelPoint::new(400, 80),
    ),
    wall_breaker_deploy: PixelRule::new(
        "WALLBREAKER_X",
        "WALLBREAKER_Y",
        PixelPoint::new(450, 600),
    ),
    town_hall: PixelRule::new("TOWN_HALL_X", "TOWN_HALL_Y", PixelPoint::new(430, 366)),
    dark_elixir: PixelRule::new("DARK_ELIXIR_X", "DARK_ELIXIR_Y", PixelPoint::new(430, 366)),
    gold_storage_1: PixelRule::new(
        "GOLD_STORAGE_1_X",
        "GOLD_STORAGE_1_Y",
        PixelPoint::new(350, 300),
    ),
    eagle_artillery: PixelRule::new(
        "EAGLE_ARTILLERY_X",
        "EAGLE_ARTILLERY_Y",
        PixelPoint::new(430, 366),
    ),
    tank_deploy: PixelRule::new("TANK_DEPLOY_X", "TANK_DEPLOY_Y", PixelPoint::new(430, 670)),
    dps_deploy: PixelRule::new("DPS_DEPLOY_X", "DPS_DEPLOY_Y", PixelPoint::new(430, 650)),
    hero_deploy: PixelRule::new("HERO_DEPLOY_X", "HERO_DEPLOY_Y", PixelPoint::new(450, 630)),
    heal_spell: PixelRule::new("HEAL_SPELL_X", "HEAL_SPELL_Y", PixelPoint::new(430, 366)),
    rage_spell: PixelRule::new("RAGE_SPELL_X", "RAGE_SPELL_Y", PixelPoint::new(430, 366)),
    jump_spell: PixelRule::new("JUMP_SPELL_X", "JUMP_SPELL_Y", PixelPoint::new(430, 366)),
    best_attack_edge: KeyValueRule::new("BEST_ATTACK_EDGE"),
    attack_start_pixel: KeyValueRule::new("ATTACK_START_PIXEL"),
    attack_spread_pixels: KeyValueRule::new("ATTACK_SPREAD_PIXELS"),
    spread_pair: Regex::new(r"\[\s*(\d+)\s*,\s*(\d+)\s*\]").unwrap(),
    // Step keywords are matched case-sensitively, the prompt mandates upper case
    step_marker: Regex::new(r"STEP_\d+:").unwrap(),
    step_pixel: Regex::new(r"AT_PIXEL\s*\[?\s*(\d+)\s*,\s*(\d+)").unwrap(),
    step_deploy: Regex::new(r"DEPLOY\s*(\d+)\s*([A-Za-z_]+(?:\s+[A-Za-z_]+)*)").unwrap(),
    step_wait: Regex::new(r"WAIT\s*(\d+)").unwrap(),
    step_spell: Regex::new(r"DROP_SPELL\s*([A-Za-z_]+(?:\s+[A-Za-z_]+)*)").unwrap(),
});

/// Cut a captured name at the first stop word, e.g. `GIANTS AT_PIXEL` -> `GIANTS`
fn troop_name(raw: &str) -> String {
    raw.split_whitespace()
        .take_while(|word| {
            !NAME_STOP_WORDS
                .iter()
                .any(|stop| word.eq_ignore_ascii_case(stop))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn number(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

/// Pixel pairs from the `ATTACK_SPREAD_PIXELS` line
pub fn extract_spread_pixels(text: &str) -> Vec<PixelPoint> {
    let rules = &*BOT_RULES;
    let pixels: Vec<PixelPoint> = rules
        .attack_spread_pixels
        .find(text)
        .map(|line| {
            rules
                .spread_pair
                .captures_iter(&line)
                .filter_map(|c| Some(PixelPoint::new(number(&c[1])?, number(&c[2])?)))
                .collect()
        })
        .unwrap_or_default();

    if pixels.is_empty() {
        DEFAULT_SPREAD_PIXELS.to_vec()
    } else {
        pixels
    }
}

/// Start pixel from `ATTACK_START_PIXEL: [x, y]`, per component
fn extract_start_pixel(text: &str) -> PixelPoint {
    let Some(value) = BOT_RULES.attack_start_pixel.find(text) else {
        return DEFAULT_START_PIXEL;
    };

    let mut parts = value.split(',');
    let x = parts.next().and_then(first_number);
    let y = parts.next().and_then(first_number);
    PixelPoint::new(
        x.unwrap_or(DEFAULT_START_PIXEL.x),
        y.unwrap_or(DEFAULT_START_PIXEL.y),
    )
}

fn parse_step(step_number: usize, body: &str) -> BotStep {
    let rules = &*BOT_RULES;
    let mut step = BotStep::new(step_number, body);

    if let Some(c) = rules.step_deploy.captures(body)
        && let Some(count) = number(&c[1])
    {
        step = step.deploy(count, troop_name(&c[2]));
    } else if let Some(c) = rules.step_wait.captures(body)
        && let Some(millis) = number(&c[1])
    {
        step = step.wait(millis);
    } else if let Some(c) = rules.step_spell.captures(body) {
        step = step.spell(troop_name(&c[1]));
    }

    if let Some(c) = rules.step_pixel.captures(body)
        && let (Some(x), Some(y)) = (number(&c[1]), number(&c[2]))
    {
        step = step.at(PixelPoint::new(x, y));
    }

    step
}

fn default_steps() -> Vec<BotStep> {
    vec![
        BotStep::new(1, "DEPLOY 4 GIANTS AT_PIXEL [430,670]")
            .deploy(4, "GIANTS")
            .at(PixelPoint::new(430, 670)),
        BotStep::new(2, "WAIT 2000").wait(2000),
        BotStep::new(3, "DEPLOY 3 WALL_BREAKERS AT_PIXEL [450,650]")
            .deploy(3, "WALL_BREAKERS")
            .at(PixelPoint::new(450, 650)),
    ]
}

/// Execution sequence from `STEP_n:` markers
///
/// A step body runs from its marker to the next marker or the end of the line, whichever
/// comes first. Steps are numbered by position, starting at 1.
pub fn extract_bot_steps(text: &str) -> Vec<BotStep> {
    let markers: Vec<_> = BOT_RULES.step_marker.find_iter(text).collect();
    if markers.is_empty() {
        return default_steps();
    }

    markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
            let body = &text[marker.end()..end];
            let line = body.split('\n').next().unwrap_or_default();
            parse_step(i + 1, &clean_value(line))
        })
        .collect()
}

/// Build the bot payload from the raw pixel-format analysis
pub fn parse_bot_analysis(text: &str) -> BotData {
    let rules = &*BOT_RULES;

    let primary = rules.primary_deploy.apply(text);
    let secondary = rules.secondary_deploy.apply(text);
    let wall_breaker = rules.wall_breaker_deploy.apply(text);
    let town_hall = rules.town_hall.apply(text);
    let dark_elixir = rules.dark_elixir.apply(text);
    let gold_storage = rules.gold_storage_1.apply(text);
    let eagle = rules.eagle_artillery.apply(text);
    let tank = rules.tank_deploy.apply(text);
    let dps = rules.dps_deploy.apply(text);
    let hero = rules.hero_deploy.apply(text);
    let heal = rules.heal_spell.apply(text);
    let rage = rules.rage_spell.apply(text);
    let jump = rules.jump_spell.apply(text);
    let start = extract_start_pixel(text);

    BotData {
        town_hall_level: rules.town_hall_level.text(text),
        base_type: rules.base_type.text(text),
        recommended_strategy: rules.recommended_strategy.text(text),
        deployment_coordinates: DeploymentCoordinates {
            primary_x: primary.x,
            primary_y: primary.y,
            secondary_x: secondary.x,
            secondary_y: secondary.y,
            wall_breaker_x: wall_breaker.x,
            wall_breaker_y: wall_breaker.y,
        },
        target_pixels: TargetPixels {
            town_hall_x: town_hall.x,
            town_hall_y: town_hall.y,
            dark_elixir_x: dark_elixir.x,
            dark_elixir_y: dark_elixir.y,
            gold_storage_1_x: gold_storage.x,
            gold_storage_1_y: gold_storage.y,
            eagle_artillery_x: eagle.x,
            eagle_artillery_y: eagle.y,
        },
        edge_deployment: EdgeDeployment {
            tank_x: tank.x,
            tank_y: tank.y,
            dps_x: dps.x,
            dps_y: dps.y,
            hero_x: hero.x,
            hero_y: hero.y,
        },
        spell_pixels: SpellPixels {
            heal_x: heal.x,
            heal_y: heal.y,
            rage_x: rage.x,
            rage_y: rage.y,
            jump_x: jump.x,
            jump_y: jump.y,
        },
        attack_edge: AttackEdge {
            best_edge: rules
                .best_attack_edge
                .find(text)
                .unwrap_or_else(|| DEFAULT_EDGE.to_string()),
            start_pixel_x: start.x,
            start_pixel_y: start.y,
            spread_pixels: extract_spread_pixels(text),
        },
        execution_steps: extract_bot_steps(text),
        raw_analysis: text.to_string(),
    }
}
