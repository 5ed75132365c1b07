//! Field rules for the free-text analysis endpoints

use std::sync::LazyLock;

use regex::Regex;

use super::{FlagRule, ListRule, MatchAllRule, NumberRule, TextRule, clean_value};
use crate::model::{
    ArmyOptimization, BaseAnalysis, BattleLearning, DeploymentPlan, StrategyAdaptation,
    SuccessMetrics, VisualAttackPlan,
};

const SUCCESS_PROBABILITY: &str = r"(?i)success[^:]*:?\s*(\d+)";
const EXPECTED_STARS: &str = r"(?i)(\d+)\s*star";

pub const DEFAULT_STEP_PLAN: &[&str] = &[
    "Deploy tank troops to absorb damage",
    "Use Wall Breakers to create entry points",
    "Deploy damage dealers behind tanks",
    "Target priority defenses first",
    "Use spells to support main push",
    "Deploy heroes for core penetration",
];

pub struct BaseAnalysisRules {
    pub base_type: TextRule,
    /// Applied to the vision description and the strategy text together
    pub town_hall_level: NumberRule,
    pub weak_points: ListRule,
    pub recommended_strategy: TextRule,
    pub optimal_sides: NumberRule,
    pub priority_targets: ListRule,
    pub risk_level: TextRule,
    pub entry_points: ListRule,
    pub deployment_order: ListRule,
    pub wall_breaker_targets: ListRule,
    pub hero_deployment: TextRule,
    pub spell_timing: ListRule,
    pub path_planning: TextRule,
    pub success_probability: NumberRule,
    pub expected_stars: NumberRule,
    pub tactical_plan: ListRule,
    numbered_step: Regex,
    step_prefix: Regex,
}

pub static BASE_ANALYSIS_RULES: LazyLock<BaseAnalysisRules> = LazyLock::new(|| {
    BaseAnalysisRules {
        base_type: TextRule::new("baseType", &[r"(?i)base type[:\s]*([^.\n]+)"], "Unknown"),
        // `\b` keeps words such as "with" from reading as a TH prefix
        town_hall_level: NumberRule::new(
            "townHallLevel",
            &[r"(?i)town hall[^:]*level[:\s]*(\d+)", r"(?i)\bth[:\s]*(\d+)"],
            0,
        ),
        weak_points: ListRule::new("weakPoints", &[r"(?i)weak[^:]*:([^0-9]+)"], 3, &[]),
        recommended_strategy: TextRule::new(
            "recommendedStrategy",
            &[r"(?i)strategy[:\s]*([^.\n]+)"],
            "Standard attack",
        ),
        optimal_sides: NumberRule::new("optimalSides", &[r"(?i)(\d+)\s*side"], 2),
        priority_targets: ListRule::new(
            "priorityTargets",
            &[r"(?i)targets?[:\s]*([^.\n]+)"],
            3,
            &["Storages", "Defenses"],
        ),
        risk_level: TextRule::new("riskLevel", &[r"(?i)risk[:\s]*(low|medium|high)"], "medium")
            .lowercased(),
        entry_points: ListRule::new(
            "entryPoints",
            &[r"(?i)entry[^:]*:([^.]+)", r"(?i)deploy[^:]*at[^:]*:([^.]+)"],
            3,
            &["Bottom side", "Left side"],
        ),
        deployment_order: ListRule::new(
            "deploymentOrder",
            &[r"(?i)deployment order[^:]*:([^.]+)", r"(?i)first[^:]*:([^.]+)"],
            5,
            &["Giants first", "Wall Breakers", "Support troops"],
        ),
        wall_breaker_targets: ListRule::new(
            "wallBreakerTargets",
            &[r"(?i)wall breakers?[^:]*:([^.]+)", r"(?i)walls?[^:]*:([^.]+)"],
            3,
            &["Eastern walls", "Compartment walls"],
        ),
        hero_deployment: TextRule::new(
            "heroDeployment",
            &[
                r"(?i)hero[^:]*deployment[^:]*:([^.]+)",
                r"(?i)heros?[^:]*timing[^:]*:([^.]+)",
            ],
            "Deploy heroes after initial breach",
        ),
        spell_timing: ListRule::new(
            "spellTiming",
            &[
                r"(?i)spells?[^:]*timing[^:]*:([^.]+)",
                r"(?i)spells?[^:]*usage[^:]*:([^.]+)",
            ],
            3,
            &["Heal spell during push", "Rage for damage"],
        ),
        path_planning: TextRule::new(
            "pathPlanning",
            &[r"(?i)path[^:]*:([^.]+)", r"(?i)route[^:]*:([^.]+)"],
            "Direct path to storages",
        ),
        success_probability: NumberRule::new("successProbability", &[SUCCESS_PROBABILITY], 70),
        expected_stars: NumberRule::new("expectedStars", &[EXPECTED_STARS], 2),
        tactical_plan: ListRule::new(
            "stepByStepPlan",
            &[r"(?i)tactical plan[^:]*:([^0-9]+)"],
            8,
            &[],
        ),
        numbered_step: Regex::new(r"\d+\.?\s*[^.\n]+").unwrap(),
        step_prefix: Regex::new(r"^\d+\.?\s*").unwrap(),
    }
});

impl BaseAnalysisRules {
    /// Numbered lines first, then the "tactical plan" section, then the fixed plan
    pub fn step_by_step_plan(&self, text: &str) -> Vec<String> {
        let numbered: Vec<String> = self
            .numbered_step
            .find_iter(text)
            .take(10)
            .map(|m| clean_value(&self.step_prefix.replace(m.as_str(), "")))
            .filter(|step| step.len() > 10)
            .collect();
        if !numbered.is_empty() {
            return numbered;
        }

        let tactical: Vec<String> = self
            .tactical_plan
            .apply(text)
            .into_iter()
            .filter(|step| step.len() > 5)
            .collect();
        if !tactical.is_empty() {
            return tactical;
        }

        DEFAULT_STEP_PLAN.iter().map(|s| s.to_string()).collect()
    }
}

/// Build a [`BaseAnalysis`] from the strategy text and the vision description
pub fn extract_base_analysis(strategy: &str, base_analysis: &str) -> BaseAnalysis {
    let rules = &*BASE_ANALYSIS_RULES;
    let combined = format!("{} {}", base_analysis, strategy);

    BaseAnalysis {
        base_type: rules.base_type.apply(strategy),
        town_hall_level: rules.town_hall_level.apply(&combined),
        weak_points: rules.weak_points.apply(strategy),
        recommended_strategy: rules.recommended_strategy.apply(strategy),
        optimal_sides: rules.optimal_sides.apply(strategy),
        priority_targets: rules.priority_targets.apply(strategy),
        risk_level: rules.risk_level.apply(strategy),
        entry_points: rules.entry_points.apply(strategy),
        deployment_order: rules.deployment_order.apply(strategy),
        wall_breaker_targets: rules.wall_breaker_targets.apply(strategy),
        hero_deployment: rules.hero_deployment.apply(strategy),
        spell_timing: rules.spell_timing.apply(strategy),
        path_planning: rules.path_planning.apply(strategy),
        success_probability: rules.success_probability.apply(strategy),
        expected_stars: rules.expected_stars.apply(strategy),
        step_by_step_plan: rules.step_by_step_plan(strategy),
        base_analysis: base_analysis.to_string(),
        full_analysis: strategy.to_string(),
    }
}

pub struct DeploymentRules {
    pub timing: TextRule,
    pub formation: TextRule,
    pub support_troops: ListRule,
    pub effectiveness: NumberRule,
}

pub static DEPLOYMENT_RULES: LazyLock<DeploymentRules> = LazyLock::new(|| DeploymentRules {
    timing: TextRule::new("timing", &[r"(?i)timing[:\s]*([^.\n]+)"], "immediate"),
    formation: TextRule::new("formation", &[r"(?i)formation[:\s]*([^.\n]+)"], "spread"),
    support_troops: ListRule::new("supportTroops", &[r"(?i)support[^:]*:([^.\n]+)"], 3, &[]),
    effectiveness: NumberRule::new("effectiveness", &[r"(?i)effectiveness[:\s]*(\d+)"], 7),
});

pub fn extract_deployment(text: &str) -> DeploymentPlan {
    let rules = &*DEPLOYMENT_RULES;
    DeploymentPlan {
        timing: rules.timing.apply(text),
        formation: rules.formation.apply(text),
        support_troops: rules.support_troops.apply(text),
        effectiveness: rules.effectiveness.apply(text),
        recommendations: text.to_string(),
    }
}

pub struct AdaptationRules {
    pub should_pivot: FlagRule,
    pub next_troops: TextRule,
    pub target_priority: ListRule,
    pub spell_recommendations: ListRule,
    pub hero_timing: TextRule,
    pub success_probability: NumberRule,
}

pub static ADAPTATION_RULES: LazyLock<AdaptationRules> = LazyLock::new(|| AdaptationRules {
    should_pivot: FlagRule::new("shouldPivot", &["pivot", "change"]),
    next_troops: TextRule::new(
        "nextTroops",
        &[r"(?i)next[^:]*:([^.\n]+)"],
        "Continue current deployment",
    ),
    target_priority: ListRule::new("targetPriority", &[r"(?i)priority[^:]*:([^.\n]+)"], 3, &[]),
    spell_recommendations: ListRule::new(
        "spellRecommendations",
        &[r"(?i)spells?[^:]*:([^.\n]+)"],
        3,
        &[],
    ),
    hero_timing: TextRule::new("heroTiming", &[r"(?i)hero[^:]*:([^.\n]+)"], "Hold for later"),
    success_probability: NumberRule::new("successProbability", &[SUCCESS_PROBABILITY], 70),
});

pub fn extract_adaptation(text: &str) -> StrategyAdaptation {
    let rules = &*ADAPTATION_RULES;
    StrategyAdaptation {
        should_pivot: rules.should_pivot.apply(text),
        next_troops: rules.next_troops.apply(text),
        target_priority: rules.target_priority.apply(text),
        spell_recommendations: rules.spell_recommendations.apply(text),
        hero_timing: rules.hero_timing.apply(text),
        success_probability: rules.success_probability.apply(text),
        immediate_actions: text.to_string(),
    }
}

pub struct ArmyRules {
    pub troop_composition: MatchAllRule,
    pub spell_selection: ListRule,
    pub hero_selection: ListRule,
    pub clan_castle_request: TextRule,
    pub expected_stars: NumberRule,
    pub resource_gain: TextRule,
}

pub static ARMY_RULES: LazyLock<ArmyRules> = LazyLock::new(|| ArmyRules {
    troop_composition: MatchAllRule::new("troopComposition", r"(\d+)\s*([a-zA-Z\s]+)", 0, 10, &[]),
    spell_selection: ListRule::new("spellSelection", &[r"(?i)spells?[^:]*:([^.\n]+)"], 5, &[]),
    hero_selection: ListRule::new("heroSelection", &[r"(?i)heroe?s?[^:]*:([^.\n]+)"], 3, &[]),
    clan_castle_request: TextRule::new(
        "clanCastleRequest",
        &[r"(?i)clan castle[^:]*:([^.\n]+)"],
        "Dragons or Electro Dragons",
    ),
    expected_stars: NumberRule::new("expectedStars", &[EXPECTED_STARS], 2),
    resource_gain: TextRule::new(
        "resourceGain",
        &[r"(?i)resources?[^:]*:([^.\n]+)"],
        "High potential",
    ),
});

pub fn extract_army(text: &str) -> ArmyOptimization {
    let rules = &*ARMY_RULES;
    ArmyOptimization {
        troop_composition: rules.troop_composition.apply(text),
        spell_selection: rules.spell_selection.apply(text),
        hero_selection: rules.hero_selection.apply(text),
        clan_castle_request: rules.clan_castle_request.apply(text),
        expected_stars: rules.expected_stars.apply(text),
        resource_gain: rules.resource_gain.apply(text),
        full_recommendation: text.to_string(),
    }
}

pub struct LearningRules {
    pub success_factors: ListRule,
    pub improvement_areas: ListRule,
    pub strategy_adjustments: ListRule,
    pub deployment_lessons: ListRule,
    pub performance_score: NumberRule,
    pub future_recommendations: ListRule,
}

pub static LEARNING_RULES: LazyLock<LearningRules> = LazyLock::new(|| LearningRules {
    success_factors: ListRule::new("successFactors", &[r"(?i)worked[^:]*:([^0-9]+)"], 3, &[]),
    improvement_areas: ListRule::new(
        "improvementAreas",
        &[r"(?i)improved?[^:]*:([^0-9]+)"],
        3,
        &[],
    ),
    strategy_adjustments: ListRule::new(
        "strategyAdjustments",
        &[r"(?i)adjustments?[^:]*:([^0-9]+)"],
        3,
        &[],
    ),
    deployment_lessons: ListRule::new(
        "deploymentLessons",
        &[r"(?i)deployment[^:]*:([^0-9]+)"],
        3,
        &[],
    ),
    performance_score: NumberRule::new("performanceScore", &[r"(?i)score[^:]*:?\s*(\d+)"], 7),
    future_recommendations: ListRule::new(
        "futureRecommendations",
        &[r"(?i)future[^:]*:([^.\n]+)"],
        3,
        &[],
    ),
});

pub fn extract_learning(text: &str) -> BattleLearning {
    let rules = &*LEARNING_RULES;
    BattleLearning {
        success_factors: rules.success_factors.apply(text),
        improvement_areas: rules.improvement_areas.apply(text),
        strategy_adjustments: rules.strategy_adjustments.apply(text),
        deployment_lessons: rules.deployment_lessons.apply(text),
        performance_score: rules.performance_score.apply(text),
        future_recommendations: rules.future_recommendations.apply(text),
        full_analysis: text.to_string(),
    }
}

pub struct VisualPlanRules {
    pub base_layout: TextRule,
    pub weaknesses: ListRule,
    pub attack_vectors: ListRule,
    pub detailed_steps: MatchAllRule,
    pub deployment_zones: ListRule,
    pub wall_targets: ListRule,
    pub hero_strategy: TextRule,
    pub spell_plan: ListRule,
    pub expected_stars: NumberRule,
    pub success_probability: NumberRule,
    pub resource_gain: TextRule,
    pub contingency_plan: TextRule,
}

pub static VISUAL_PLAN_RULES: LazyLock<VisualPlanRules> = LazyLock::new(|| VisualPlanRules {
    base_layout: TextRule::new(
        "baseLayout",
        &[r"(?i)base layout[^:]*:([^.]+)", r"(?i)layout[:\s]*([^.\n]+)"],
        "Layout not identified",
    ),
    weaknesses: ListRule::new(
        "weaknesses",
        &[r"(?i)weakness(?:es)?[^:]*:([^0-9]+)", r"(?i)weak[^:]*:([^0-9]+)"],
        5,
        &["Gaps in outer walls", "Exposed storages"],
    ),
    attack_vectors: ListRule::new(
        "attackVectors",
        &[r"(?i)attack vectors?[^:]*:([^0-9]+)", r"(?i)approach[^:]*:([^.\n]+)"],
        4,
        &["Bottom side approach"],
    ),
    // "**Step 3:** Deploy ..." or "Step 3: Deploy ..."
    detailed_steps: MatchAllRule::new(
        "detailedSteps",
        r"(?i)\bstep\s*\d+\**\s*:\**\s*([^\n]+)",
        1,
        10,
        &[
            "Scout the base and pick the weakest side",
            "Deploy tanks to absorb defensive fire",
            "Open compartments with Wall Breakers",
            "Send damage dealers behind the tanks",
            "Support the push with spells",
            "Deploy heroes to reach the core",
        ],
    ),
    deployment_zones: ListRule::new(
        "deploymentZones",
        &[
            r"(?i)deployment zones?[^:]*:([^.]+)",
            r"(?i)deploy(?:ment)?[^:]*zone[^:]*:([^.]+)",
        ],
        3,
        &["Bottom edge", "Left edge"],
    ),
    wall_targets: ListRule::new(
        "wallTargets",
        &[r"(?i)wall[^:]*(?:target|break)[^:]*:([^.]+)"],
        3,
        &["Outer wall near weakest compartment"],
    ),
    hero_strategy: TextRule::new(
        "heroStrategy",
        &[r"(?i)hero[^:]*:([^.\n]+)"],
        "Deploy heroes after the tank line engages",
    ),
    spell_plan: ListRule::new(
        "spellPlan",
        &[r"(?i)spells?[^:]*:([^.\n]+)"],
        3,
        &["Heal spell during push", "Rage for damage"],
    ),
    expected_stars: NumberRule::new("expectedStars", &[EXPECTED_STARS], 2),
    success_probability: NumberRule::new("successProbability", &[SUCCESS_PROBABILITY], 70),
    resource_gain: TextRule::new(
        "resourceGain",
        &[r"(?i)resources?[^:]*:([^.\n]+)"],
        "High potential",
    ),
    contingency_plan: TextRule::new(
        "contingencyPlan",
        &[r"(?i)(?:contingency|adaptation points?|alternative plans?)[^:]*:([^.]+)"],
        "Redirect remaining troops to the closest exposed storages",
    ),
});

pub fn extract_visual_plan(text: &str) -> VisualAttackPlan {
    let rules = &*VISUAL_PLAN_RULES;
    VisualAttackPlan {
        base_layout: rules.base_layout.apply(text),
        weaknesses: rules.weaknesses.apply(text),
        attack_vectors: rules.attack_vectors.apply(text),
        detailed_steps: rules.detailed_steps.apply(text),
        deployment_zones: rules.deployment_zones.apply(text),
        wall_targets: rules.wall_targets.apply(text),
        hero_strategy: rules.hero_strategy.apply(text),
        spell_plan: rules.spell_plan.apply(text),
        success_metrics: SuccessMetrics {
            expected_stars: rules.expected_stars.apply(text),
            success_probability: rules.success_probability.apply(text),
            resource_gain: rules.resource_gain.apply(text),
        },
        contingency_plan: rules.contingency_plan.apply(text),
        full_plan: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_base_analysis_defaults_on_empty_text() {
        let analysis = extract_base_analysis("", "");
        assert_eq!(analysis.base_type, "Unknown");
        assert_eq!(analysis.town_hall_level, 0);
        assert!(analysis.weak_points.is_empty());
        assert_eq!(analysis.recommended_strategy, "Standard attack");
        assert_eq!(analysis.optimal_sides, 2);
        assert_eq!(analysis.priority_targets, strings(&["Storages", "Defenses"]));
        assert_eq!(analysis.risk_level, "medium");
        assert_eq!(analysis.entry_points, strings(&["Bottom side", "Left side"]));
        assert_eq!(
            analysis.deployment_order,
            strings(&["Giants first", "Wall Breakers", "Support troops"])
        );
        assert_eq!(
            analysis.wall_breaker_targets,
            strings(&["Eastern walls", "Compartment walls"])
        );
        assert_eq!(analysis.hero_deployment, "Deploy heroes after initial breach");
        assert_eq!(
            analysis.spell_timing,
            strings(&["Heal spell during push", "Rage for damage"])
        );
        assert_eq!(analysis.path_planning, "Direct path to storages");
        assert_eq!(analysis.success_probability, 70);
        assert_eq!(analysis.expected_stars, 2);
        assert_eq!(analysis.step_by_step_plan, strings(DEFAULT_STEP_PLAN));
    }

    #[test]
    fn test_base_analysis_parses_fields() {
        let strategy = "Base type: War base\n\
                        Risk: HIGH\n\
                        Attack from 3 sides for best results\n\
                        Success probability: 85%\n\
                        Expect 3 stars";
        let analysis = extract_base_analysis(strategy, "Town Hall level 12 detected");

        assert_eq!(analysis.base_type, "War base");
        assert_eq!(analysis.town_hall_level, 12);
        assert_eq!(analysis.risk_level, "high");
        assert_eq!(analysis.optimal_sides, 3);
        assert_eq!(analysis.success_probability, 85);
        assert_eq!(analysis.expected_stars, 3);
        assert_eq!(analysis.base_analysis, "Town Hall level 12 detected");
        assert_eq!(analysis.full_analysis, strategy);
    }

    #[test]
    fn test_town_hall_short_form() {
        assert_eq!(extract_base_analysis("Looks like a TH11 farm", "").town_hall_level, 11);
        assert_eq!(extract_base_analysis("go with th: 9", "").town_hall_level, 9);
        // "with 4" must not read as a TH prefix
        assert_eq!(extract_base_analysis("attack with 4 giants", "").town_hall_level, 0);
    }

    #[test]
    fn test_weak_points_list_is_capped() {
        let analysis =
            extract_base_analysis("Weak points: north gap, air defense, mortar, inferno", "");
        assert_eq!(analysis.weak_points, strings(&["north gap", "air defense", "mortar"]));
    }

    #[test]
    fn test_step_plan_from_numbered_lines() {
        let text = "1. Deploy four Giants at the bottom\n2. Send Wall Breakers to the east wall\n3. Go";
        let plan = BASE_ANALYSIS_RULES.step_by_step_plan(text);
        assert_eq!(
            plan,
            strings(&[
                "Deploy four Giants at the bottom",
                "Send Wall Breakers to the east wall"
            ])
        );
    }

    #[test]
    fn test_step_plan_from_tactical_section() {
        let text = "Tactical plan: open the left side, drop healers behind, finish with heroes";
        let plan = BASE_ANALYSIS_RULES.step_by_step_plan(text);
        assert_eq!(
            plan,
            strings(&["open the left side", "drop healers behind", "finish with heroes"])
        );
    }

    #[test]
    fn test_deployment_fields() {
        let plan = extract_deployment(
            "Timing: after the tanks engage\nFormation: line\nSupport troops: Healers, Wizards\nEffectiveness: 9",
        );
        assert_eq!(plan.timing, "after the tanks engage");
        assert_eq!(plan.formation, "line");
        assert_eq!(plan.support_troops, strings(&["Healers", "Wizards"]));
        assert_eq!(plan.effectiveness, 9);

        let empty = extract_deployment("nothing useful");
        assert_eq!(empty.timing, "immediate");
        assert_eq!(empty.formation, "spread");
        assert!(empty.support_troops.is_empty());
        assert_eq!(empty.effectiveness, 7);
        assert_eq!(empty.recommendations, "nothing useful");
    }

    #[test]
    fn test_adaptation_fields() {
        let adaptation = extract_adaptation(
            "You should pivot now.\nNext troops: Balloons\nSpells: Rage, Freeze\nHero: deploy the Queen",
        );
        assert!(adaptation.should_pivot);
        assert_eq!(adaptation.next_troops, "Balloons");
        assert_eq!(adaptation.spell_recommendations, strings(&["Rage", "Freeze"]));
        assert_eq!(adaptation.hero_timing, "deploy the Queen");
        assert_eq!(adaptation.success_probability, 70);

        let steady = extract_adaptation("Keep going");
        assert!(!steady.should_pivot);
        assert_eq!(steady.next_troops, "Continue current deployment");
        assert_eq!(steady.hero_timing, "Hold for later");
    }

    #[test]
    fn test_army_fields() {
        let army = extract_army(
            "Troops: 10 Giants, 20 Wizards. Clan castle: Lava Hound. Resources: plenty of loot.",
        );
        assert_eq!(army.troop_composition, strings(&["10 Giants", "20 Wizards"]));
        assert_eq!(army.clan_castle_request, "Lava Hound");
        assert_eq!(army.resource_gain, "plenty of loot");

        let empty = extract_army("");
        assert!(empty.troop_composition.is_empty());
        assert_eq!(empty.clan_castle_request, "Dragons or Electro Dragons");
        assert_eq!(empty.expected_stars, 2);
        assert_eq!(empty.resource_gain, "High potential");
    }

    #[test]
    fn test_learning_fields() {
        let learning =
            extract_learning("Score: 8\nFuture: scout first\nWhat worked: funnel, heal timing");
        assert_eq!(learning.success_factors, strings(&["funnel", "heal timing"]));
        assert_eq!(learning.performance_score, 8);
        assert_eq!(learning.future_recommendations, strings(&["scout first"]));

        let empty = extract_learning("");
        assert!(empty.success_factors.is_empty());
        assert_eq!(empty.performance_score, 7);
    }

    #[test]
    fn test_visual_plan_steps_and_defaults() {
        let plan = extract_visual_plan(
            "**Step 1:** Drop Giants at the bottom edge\n**Step 2:** Break the east wall\nExpect 3 stars",
        );
        assert_eq!(
            plan.detailed_steps,
            strings(&["Drop Giants at the bottom edge", "Break the east wall"])
        );
        assert_eq!(plan.success_metrics.expected_stars, 3);
        assert_eq!(plan.success_metrics.success_probability, 70);
        assert_eq!(plan.base_layout, "Layout not identified");
        assert_eq!(plan.deployment_zones, strings(&["Bottom edge", "Left edge"]));
    }

    #[test]
    fn test_base_analysis_list_and_text_rules() {
        let rules = &*BASE_ANALYSIS_RULES;

        assert_eq!(
            rules.priority_targets.apply("Priority targets: Town Hall, Eagle Artillery"),
            strings(&["Town Hall", "Eagle Artillery"])
        );
        assert_eq!(
            rules.recommended_strategy.apply("Strategy: Queen walk into LavaLoon"),
            "Queen walk into LavaLoon"
        );
        assert_eq!(
            rules.entry_points.apply("Entry points: south gap, west corner."),
            strings(&["south gap", "west corner"])
        );
        assert_eq!(
            rules.deployment_order.apply("Deployment order: Golems, Wizards, Bowlers."),
            strings(&["Golems", "Wizards", "Bowlers"])
        );
        assert_eq!(
            rules.wall_breaker_targets.apply("Wall breakers: inner core wall, east wall."),
            strings(&["inner core wall", "east wall"])
        );
        assert_eq!(
            rules.hero_deployment.apply("Hero deployment: after the Golems tank."),
            "after the Golems tank"
        );
        assert_eq!(
            rules.spell_timing.apply("Spell timing: Rage at the core, Freeze the Inferno."),
            strings(&["Rage at the core", "Freeze the Inferno"])
        );
        assert_eq!(
            rules.path_planning.apply("Path: through the east compartment."),
            "through the east compartment"
        );
    }

    #[test]
    fn test_base_analysis_second_patterns() {
        let rules = &*BASE_ANALYSIS_RULES;

        assert_eq!(
            rules.entry_points.apply("Deploy troops at: north edge, east edge."),
            strings(&["north edge", "east edge"])
        );
        assert_eq!(
            rules.deployment_order.apply("Send these first: Golems, Witches."),
            strings(&["Golems", "Witches"])
        );
        assert_eq!(
            rules.wall_breaker_targets.apply("Walls: outer ring."),
            strings(&["outer ring"])
        );
        assert_eq!(rules.hero_deployment.apply("Heroes timing: late."), "late");
        assert_eq!(
            rules.spell_timing.apply("Spell usage: Heal on the queen."),
            strings(&["Heal on the queen"])
        );
        assert_eq!(rules.path_planning.apply("Route: along the walls."), "along the walls");
    }

    #[test]
    fn test_adaptation_target_priority() {
        let adaptation = extract_adaptation("Target priority: Inferno Towers, Eagle");
        assert_eq!(adaptation.target_priority, strings(&["Inferno Towers", "Eagle"]));
    }

    #[test]
    fn test_army_spell_and_hero_selection() {
        let rules = &*ARMY_RULES;
        assert_eq!(
            rules.spell_selection.apply("Spells: 2 Rage, 1 Freeze"),
            strings(&["2 Rage", "1 Freeze"])
        );
        assert_eq!(
            rules.hero_selection.apply("Heroes: King, Queen"),
            strings(&["King", "Queen"])
        );
    }

    #[test]
    fn test_learning_list_rules() {
        let rules = &*LEARNING_RULES;
        assert_eq!(
            rules.improvement_areas.apply("To be improved: timing, funnel"),
            strings(&["timing", "funnel"])
        );
        assert_eq!(
            rules.strategy_adjustments.apply("Adjustments: scout more, use freeze"),
            strings(&["scout more", "use freeze"])
        );
        assert_eq!(
            rules.deployment_lessons.apply("Deployment: spread the wizards, bunch the giants"),
            strings(&["spread the wizards", "bunch the giants"])
        );
    }

    #[test]
    fn test_visual_plan_rules() {
        let rules = &*VISUAL_PLAN_RULES;

        assert_eq!(
            rules.weaknesses.apply("Weaknesses: exposed gold, thin north wall"),
            strings(&["exposed gold", "thin north wall"])
        );
        assert_eq!(
            rules.attack_vectors.apply("Attack vectors: south corner, left funnel"),
            strings(&["south corner", "left funnel"])
        );
        assert_eq!(
            rules.wall_targets.apply("Wall targets: inner ring, core wall."),
            strings(&["inner ring", "core wall"])
        );
        assert_eq!(
            rules.hero_strategy.apply("Hero plan: Queen walk on the right"),
            "Queen walk on the right"
        );
        assert_eq!(
            rules.spell_plan.apply("Spells: Rage, Freeze"),
            strings(&["Rage", "Freeze"])
        );
        assert_eq!(
            rules.contingency_plan.apply("Contingency: switch to the storages."),
            "switch to the storages"
        );
    }

    #[test]
    fn test_visual_plan_second_patterns() {
        let rules = &*VISUAL_PLAN_RULES;

        assert_eq!(rules.base_layout.apply("Layout: ring base"), "ring base");
        assert_eq!(
            rules.weaknesses.apply("Weak spots: east corner"),
            strings(&["east corner"])
        );
        assert_eq!(
            rules.attack_vectors.apply("Best approach: from the left"),
            strings(&["from the left"])
        );
    }
}
