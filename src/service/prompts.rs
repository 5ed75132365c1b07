//! Prompts for base analysis and attack planning
//!
//! Section labels in these prompts ("Base type", "Risk", "STEP_1:" ...) are what the
//! extraction rules look for, so keep them in sync with `service::extraction`.

use crate::model::{
    AdaptStrategyRequest, AnalyzeBaseRequest, BotAnalyzeRequest, GenerateStrategyRequest,
    LearnFromBattleRequest, OptimizeArmyRequest, OptimizeDeploymentRequest,
    PlanAttackVisualRequest, prompt_text, prompt_value,
};

const DEFAULT_ARMY: &str = "Standard army composition";
const DEFAULT_TARGETS: &str = "Gold, Elixir, Dark Elixir";

pub const CONNECTIVITY_PROMPT: &str = "Test connection. Please respond with 'OK'.";

/// Vision prompt for the first step of image-based base analysis
pub const BASE_VISION_PROMPT: &str = r#"You are an expert Clash of Clans base analyzer preparing input for BOT AUTOMATION. Analyze this base image and describe it so an automated bot can act on it.

Use clear directional references that convert to coordinates, consistent terminology, and precise deployment zones and target locations.

1. **Town Hall Level:** [exact TH level, 1-16]
2. **Base Type:** [War Base, Farming Base, Trophy Base or Hybrid Base]
3. **Base Layout:** [Centralized, Spread Out, Ring Base, Anti-3 Star, ...]
4. **Defense Locations:**
   - **Eagle Artillery:** [direction from center + distance]
   - **Inferno Towers:** [each position with cardinal direction]
   - **X-Bows:** [position and target mode if visible]
   - **Air Defenses:** [all positions with cardinal directions]
   - **Wizard Towers, Mortars, Archer Towers, Cannons:** [key positions]
5. **Resource Targets (priority order):**
   - **Town Hall:** [Center-North, Center-South, ...]
   - **Dark Elixir Storage:** [position relative to TH]
   - **Gold Storages / Elixir Storages:** [positions in priority order]
6. **Wall Analysis:**
   - **Outer Wall Weak Points:** [3-5 wall breaking locations with directions]
   - **Compartment Entry Points:** [wall sections to target]
   - **Path to Core:** [route from the outer wall to the TH]
7. **Attack Zones:**
   - **Primary Deploy Zone:** [e.g. "South side, 30% from Southwest corner"]
   - **Secondary Deploy Zone:** [alternative approach]
   - **Avoid Zones:** [heavy defense concentration]
8. **Bot-Executable Targets:**
   - **First Wall Target**, **Tank Deployment**, **DPS Deployment**, **Hero Entry Point**, **Spell Drop Zones**

Format all positions as [Direction][Distance], e.g. "North-Center", "Southwest-Edge", "East-25%"."#;

/// Strategy prompt for the second step, built from the vision description
pub fn build_strategy_prompt(
    base_analysis: &str,
    troop_composition: Option<&str>,
    target_resources: Option<&str>,
) -> String {
    let troops = prompt_text(troop_composition, DEFAULT_ARMY);
    let targets = prompt_text(target_resources, DEFAULT_TARGETS);

    format!(
        r#"You are an expert Clash of Clans attack strategist creating a BOT-EXECUTABLE attack plan. Using the base analysis below, create an attack strategy a bot can follow step by step.

**BASE ANALYSIS:**
{base_analysis}

**AVAILABLE TROOPS:**
{troops}

**TARGET OBJECTIVES:**
{targets}

Answer with these sections:

1. **Base type:** [War, Farming, Trophy or Hybrid]
2. **Attack Strategy:** [GoWiPe, LavaLoon, Hog Riders, Barch, Mass Dragons, ...]
3. **Weak points:** [comma-separated list]
4. **Execution sequence:** numbered steps, one per line
   1. Deploy [tank troops] at [location with direction]
   2. Wait [seconds] then deploy [wall breakers] at [wall section]
   3. Deploy [main force] at [zone] behind [tanks]
   4. Deploy [heroes] at [location] when [condition]
   5. Drop [spell] at [location] when [condition]
   6. Deploy [cleanup troops] at [remaining targets]
5. **Entry points:** [directions, comma-separated]
6. **Deployment order:** [troops in order, comma-separated]
7. **Wall breaker targets:** [wall sections, comma-separated]
8. **Hero deployment:** [where and when]
9. **Spell timing:** [spell and trigger, comma-separated]
10. **Path to targets:** [route from entry to core]
11. **Priority targets:** [buildings in order, comma-separated]
12. **Risk:** [low, medium or high]
13. **Success probability:** [percentage]
14. **Expected stars:** [1-3]

Attack from N sides where N is the number of sides you recommend. Use exact directional references (North, South, East, West, Northeast, ...) and concrete timings (wait 3 seconds, wait for 50% damage, ...)."#
    )
}

/// Single-call prompt used when only a layout description is supplied
pub fn build_text_analysis_prompt(request: &AnalyzeBaseRequest) -> String {
    let troops = prompt_text(request.troop_composition.as_deref(), DEFAULT_ARMY);
    let targets = prompt_text(request.target_resources.as_deref(), DEFAULT_TARGETS);
    let layout = prompt_text(request.base_layout.as_deref(), "Unknown layout");
    let defenses = match &request.defense_positions {
        Some(positions) if !positions.is_empty() => positions.join(", "),
        _ => "Standard defense placement".to_string(),
    };
    let walls = prompt_text(request.wall_configuration.as_deref(), "Standard wall setup");

    format!(
        r#"You are an expert Clash of Clans attack strategist. Analyze this base layout description and provide strategic recommendations.

Available troops: {troops}
Target resources: {targets}

Base Layout Description:
- Layout: {layout}
- Defense Positions: {defenses}
- Wall Configuration: {walls}

Provide a detailed attack plan:

1. **Base Analysis:** base type classification (farming, war, trophy), Town Hall level, defense placement, resource storage locations
2. **Vulnerability Assessment:** weak points, gaps in wall coverage, poorly protected high-value targets, defense blind spots
3. **Attack Strategy:** recommended approach for the available troops, entry points, deployment order, number of sides to attack from (1-4)
4. **Tactical Plan:** tank placement, wall breaker placement, support troop positioning, hero deployment timing, spell usage and timing
5. **Target Priority:** primary targets, secondary targets, path planning for troops
6. **Risk Assessment:** risk (low/medium/high), success probability, expected star count (1-3), resource gain potential

Give specific, actionable recommendations and a step-by-step plan that maximizes success with the given army."#
    )
}

pub fn build_deployment_prompt(request: &OptimizeDeploymentRequest) -> String {
    let quantity = prompt_value(request.quantity.as_ref(), "some");
    let troop = prompt_text(request.troop_type.as_deref(), "mixed");
    let situation = prompt_text(request.current_situation.as_deref(), "Unknown");
    let defenses = prompt_text(request.enemy_defenses.as_deref(), "Unknown");

    format!(
        r#"As a Clash of Clans tactical expert, optimize the deployment of {quantity} {troop} troops.

Current battle situation: {situation}
Enemy defenses status: {defenses}

Provide recommendations for:
1. Optimal deployment coordinates (if specific areas are mentioned)
2. Timing: immediate, delayed or wave-based
3. Formation: concentrated, spread or targeted
4. Support troops needed
5. Effectiveness: expected effectiveness on a 1-10 scale

Focus on maximizing damage while minimizing losses."#
    )
}

pub fn build_adaptation_prompt(request: &AdaptStrategyRequest) -> String {
    let progress = prompt_value(request.battle_progress.as_ref(), "0");
    let remaining = prompt_text(request.remaining_troops.as_deref(), "Unknown");
    let enemy = prompt_text(request.enemy_status.as_deref(), "Unknown");
    let objectives = prompt_text(request.objectives.as_deref(), "Maximize stars");

    format!(
        r#"Analyze this ongoing Clash of Clans battle and suggest tactical adaptations.

Battle progress: {progress}%
Remaining troops: {remaining}
Enemy status: {enemy}
Current objectives: {objectives}

Provide immediate tactical advice:
1. Continue the current strategy or pivot?
2. Next troops to deploy
3. Target priority adjustments
4. Spell usage recommendations
5. Hero ability timing
6. Success probability assessment

Give concise, actionable commands for immediate execution."#
    )
}

pub fn build_army_prompt(request: &OptimizeArmyRequest) -> String {
    let base_type = prompt_text(request.target_base_type.as_deref(), "Unknown");
    let available = prompt_text(request.available_troops.as_deref(), "All unlocked troops");
    let goal = prompt_text(request.attack_goal.as_deref(), "resources");
    let town_hall = prompt_value(request.town_hall_level.as_ref(), "Unknown");

    format!(
        r#"Design an optimal army composition for a Clash of Clans attack.

Target base type: {base_type}
Available troops: {available}
Attack goal: {goal}
Town Hall level: {town_hall}

Recommend:
1. Optimal troop composition with exact numbers
2. Spell selection and quantities
3. Hero selection priority
4. Clan Castle troop request
5. Attack strategy overview
6. Expected star rating (1-3 stars)
7. Resource gain potential

Prioritize efficiency and success rate."#
    )
}

pub fn build_learning_prompt(request: &LearnFromBattleRequest) -> String {
    let result = prompt_text(request.battle_result.as_deref(), "Unknown");
    let strategy = prompt_text(request.strategy_used.as_deref(), "Unknown");
    let troops = prompt_text(request.troops_used.as_deref(), "Unknown");
    let outcome = prompt_text(request.outcome.as_deref(), "Unknown");
    let resources = prompt_value(request.resources.as_ref(), "Unknown");

    format!(
        r#"Analyze this Clash of Clans battle result and extract learning insights.

Battle outcome: {result}
Strategy used: {strategy}
Troops deployed: {troops}
Result: {outcome}
Resources gained: {resources}

Provide analysis:
1. What worked well?
2. What could be improved?
3. Strategy adjustments for similar bases
4. Troop deployment lessons
5. Timing optimization insights
6. Overall performance score (1-10)
7. Recommendations for future attacks

Focus on actionable improvements."#
    )
}

pub fn build_visual_plan_prompt(request: &PlanAttackVisualRequest) -> String {
    let army = prompt_text(request.available_army.as_deref(), "Please specify army composition");
    let goal = prompt_text(request.attack_goal.as_deref(), "resources");
    let level = prompt_value(request.player_level.as_ref(), "11");

    format!(
        r#"As an expert Clash of Clans attack strategist, analyze this base image and create a comprehensive attack plan.

**Available Army:** {army}
**Attack Goal:** {goal}
**Player Level:** {level}

Examine the base image and provide:

1. **Base Layout Recognition:** defensive buildings and levels, resource storages, Town Hall protection, wall compartments
2. **Weaknesses:** gaps in wall coverage, poorly defended areas, isolated high-value targets
3. **Attack Vectors:** best approach angles, path of least resistance, funnel opportunities
4. **Deployment Zones:** safest zones to deploy
5. **Wall Break Targets:** wall sections to open
6. **Detailed Attack Plan:**
   **Step 1:** Initial deployment (exact locations)
   **Step 2:** Wall breaking (specific wall sections)
   **Step 3:** Main force deployment (timing and positioning)
   **Step 4:** Support deployment (cleanup and protection)
   **Step 5:** Hero and spell usage (when and where)
   **Step 6:** Adaptation points (what to do if the plan goes wrong)
7. **Hero Strategy:** and **Spells:** on one line each
8. **Success Metrics:** expected stars (1-3), success probability, resource gain estimation
9. **Contingency:** alternative plan if the primary fails

Base your recommendations ONLY on what you can see in the image. Use directional references (north, south, east, west, corners, center) that match the layout shown."#
    )
}

pub fn build_bot_prompt(request: &BotAnalyzeRequest) -> String {
    let troops = prompt_text(request.troop_composition.as_deref(), DEFAULT_ARMY);
    let targets = prompt_text(request.target_resources.as_deref(), DEFAULT_TARGETS);

    format!(
        r#"Analyze this Clash of Clans base image for PIXEL-BASED BOT AUTOMATION. The bot deploys troops at pixel coordinates along the screen edges.

Available troops: {troops}
Target resources: {targets}

**BOT REQUIREMENTS:**
- The game screen is 860x732 pixels
- Coordinates are relative to the game screen, not the base image
- Top edge: Y=40-80, Bottom edge: Y=650-690, Left edge: X=40-80, Right edge: X=780-820
- Center area: X=400-460, Y=350-380

Answer with exactly these KEY: value lines.

TOWN_HALL_LEVEL: [number 1-16]
BASE_TYPE: [War/Farming/Trophy/Hybrid]
RECOMMENDED_STRATEGY: [GoWiPe/LavaLoon/Barch/...]

PRIMARY_DEPLOY_X: [40-820]
PRIMARY_DEPLOY_Y: [40-690]
SECONDARY_DEPLOY_X: [40-820]
SECONDARY_DEPLOY_Y: [40-690]
WALLBREAKER_X: [X for wall breaking]
WALLBREAKER_Y: [Y for wall breaking]

TOWN_HALL_X: [200-660]
TOWN_HALL_Y: [150-580]
DARK_ELIXIR_X: [X]
DARK_ELIXIR_Y: [Y]
GOLD_STORAGE_1_X: [X]
GOLD_STORAGE_1_Y: [Y]
EAGLE_ARTILLERY_X: [X]
EAGLE_ARTILLERY_Y: [Y]

TANK_DEPLOY_X: [X on edge]
TANK_DEPLOY_Y: [Y on edge]
DPS_DEPLOY_X: [X behind tanks]
DPS_DEPLOY_Y: [Y behind tanks]
HERO_DEPLOY_X: [X for hero entry]
HERO_DEPLOY_Y: [Y for hero entry]

HEAL_SPELL_X: [X]
HEAL_SPELL_Y: [Y]
RAGE_SPELL_X: [X]
RAGE_SPELL_Y: [Y]
JUMP_SPELL_X: [X]
JUMP_SPELL_Y: [Y]

STEP_1: DEPLOY [number] [TROOP] AT_PIXEL [X,Y]
STEP_2: WAIT [milliseconds]
STEP_3: DEPLOY [number] [TROOP] AT_PIXEL [X,Y]
STEP_4: DROP_SPELL [SPELL] AT_PIXEL [X,Y] WHEN [condition]
STEP_5: DEPLOY_HERO [HERO] AT_PIXEL [X,Y] WHEN [condition]

BEST_ATTACK_EDGE: [TOP/BOTTOM/LEFT/RIGHT]
ATTACK_START_PIXEL: [X,Y on the chosen edge]
ATTACK_SPREAD_PIXELS: [X,Y] [X,Y] [X,Y] (3-5 points for troop spread)"#
    )
}

/// Troop constants understood by the drop-order bot
pub const TROOP_CONSTANTS: &[&str] = &[
    "$eBarb", "$eSBarb", "$eArch", "$eSArch", "$eGiant", "$eSGiant", "$eGobl", "$eSGobl",
    "$eWall", "$eSWall", "$eBall", "$eRBall", "$eWiza", "$eSWiza", "$eHeal", "$eDrag", "$eSDrag",
    "$ePekk", "$eBabyD", "$eInfernoD", "$eMine", "$eSMine", "$eEDrag", "$eYeti", "$eRDrag",
    "$eETitan", "$eRootR", "$eThrower", "$eMini", "$eSMini", "$eHogs", "$eSHogs", "$eValk",
    "$eSValk", "$eGole", "$eWitc", "$eSWitc", "$eLava", "$eIceH", "$eBowl", "$eSBowl", "$eIceG",
    "$eHunt", "$eAppWard", "$eDruid", "$eFurn", "CC", "HEROES",
];

pub fn build_strategy_array_prompt(request: &GenerateStrategyRequest) -> String {
    let match_mode = prompt_value(request.match_mode.as_ref(), "0");
    let drop_order = prompt_value(request.drop_order.as_ref(), "default");
    let sides = prompt_value(request.nb_sides.as_ref(), "1");
    let troops = prompt_value(request.available_troops.as_ref(), "[]");
    let target = prompt_value(request.target_info.as_ref(), "{}");
    let constants = TROOP_CONSTANTS.join(", ");

    format!(
        r#"Generate a Clash of Clans attack strategy for these parameters:
- Match Mode: {match_mode} (0=All troops, 1=Barcher only, 2=Giant+Barcher)
- Drop Order: {drop_order}
- Number of sides to attack: {sides}
- Available troops: {troops}
- Target info: {target}

Return ONLY a valid JSON array where each element has this exact format:
[troopType, nbSides, waveNumber, maxWaveNumber, slotsPerEdge]

- troopType: one of {constants}
- nbSides: number of sides to deploy on (use {sides})
- waveNumber: wave for this deployment (1, 2, 3, ...)
- maxWaveNumber: maximum waves for this troop type
- slotsPerEdge: 0 for spread deployment, 1+ for specific slots

Example:
[
    ["$eGiant", {sides}, 1, 1, 2],
    ["CC", 1, 1, 1, 1],
    ["$eBarb", {sides}, 1, 2, 0],
    ["$eWall", {sides}, 1, 1, 1],
    ["$eArch", {sides}, 1, 2, 0],
    ["HEROES", 1, 2, 1, 1]
]

Deploy tanks first, follow with wall breakers if needed, then damage dealers. Save heroes for mid-battle and use CC troops strategically.

Return ONLY the JSON array, no additional text."#
    )
}
