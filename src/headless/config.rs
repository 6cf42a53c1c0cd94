//! JSON configuration parsing for headless mode
//!
//! A scenario places one player-controlled target and any number of AI units
//! on the ground plane, and scripts timed events (status applications,
//! dispels, raw damage, reactivation) against them by name.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::ai::{Archetype, UnitAi, DEFAULT_DETECTION_RANGE};
use crate::combat::error::ConfigError;
use crate::combat::stats::{StatBlock, StatKind};
use crate::combat::status::StatusKind;
use crate::spawn::archetype_stats;

/// Largest step the virtual clock accepts without clamping.
pub const MAX_TIMESTEP: f32 = 0.25;

/// Headless scenario configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub units: Vec<UnitConfig>,
    /// Timed events, in any order
    #[serde(default)]
    pub script: Vec<ScriptedEvent>,
    /// Maximum scenario duration in seconds (default: 60)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Fixed simulation step in seconds (default: 1/60, at most 0.25)
    #[serde(default = "default_timestep")]
    pub timestep_secs: f32,
    /// Random seed for deterministic reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for the scenario report (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

/// The target every unit hunts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_name")]
    pub name: String,
    #[serde(default)]
    pub position: [f32; 2],
    /// Overrides on top of the default player stats
    #[serde(default)]
    pub stats: HashMap<StatKind, f32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: default_player_name(),
            position: [0.0, 0.0],
            stats: HashMap::new(),
        }
    }
}

/// One AI unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitConfig {
    pub name: String,
    #[serde(default)]
    pub archetype: Archetype,
    pub position: [f32; 2],
    #[serde(default = "default_detection_range")]
    pub detection_range: f32,
    #[serde(default = "default_attack_damage")]
    pub attack_damage: i32,
    #[serde(default)]
    pub stun_time: f32,
    #[serde(default)]
    pub knockback_force: f32,
    /// Overrides on top of the archetype's stats
    #[serde(default)]
    pub stats: HashMap<StatKind, f32>,
}

/// Something that happens to a named entity at a given time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedEvent {
    /// Seconds since scenario start
    pub at: f32,
    /// Player or unit name
    pub target: String,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    ApplyStatus {
        status: StatusKind,
    },
    Dispel {
        status: StatusKind,
    },
    Damage {
        amount: i32,
        #[serde(default)]
        stun_time: f32,
    },
    Reactivate,
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_max_duration() -> f32 {
    60.0
}

fn default_timestep() -> f32 {
    1.0 / 60.0
}

fn default_detection_range() -> f32 {
    DEFAULT_DETECTION_RANGE
}

fn default_attack_damage() -> i32 {
    2
}

/// Base stats of the scenario's player.
pub fn default_player_stats() -> StatBlock {
    StatBlock::from_bases([
        (StatKind::MaxHealth, 50.0),
        (StatKind::HealthRegen, 1.0),
        (StatKind::MaxShield, 10.0),
        (StatKind::MovementSpeed, 0.0),
        (StatKind::InjuryChargeRate, 1.0),
    ])
}

fn apply_overrides(mut stats: StatBlock, overrides: &HashMap<StatKind, f32>) -> StatBlock {
    for (stat, value) in overrides {
        stats.set_base(*stat, *value);
    }
    stats
}

fn non_finite_override(overrides: &HashMap<StatKind, f32>) -> Option<StatKind> {
    overrides
        .iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(stat, _)| *stat)
}

impl PlayerConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], 0.0)
    }

    pub fn stat_block(&self) -> StatBlock {
        apply_overrides(default_player_stats(), &self.stats)
    }
}

impl UnitConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], 0.0)
    }

    pub fn stat_block(&self) -> StatBlock {
        apply_overrides(archetype_stats(self.archetype), &self.stats)
    }

    pub fn unit_ai(&self) -> UnitAi {
        let mut ai = UnitAi::new(self.archetype);
        ai.detection_range = self.detection_range;
        ai.attack_damage = self.attack_damage;
        ai.stun_time = self.stun_time;
        ai.knockback_force = self.knockback_force;
        ai
    }
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ScenarioConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::InvalidScenario(message));

        if !(self.max_duration_secs > 0.0) {
            return invalid(format!("max_duration_secs must be positive, got {}", self.max_duration_secs));
        }
        if !(self.timestep_secs > 0.0 && self.timestep_secs <= MAX_TIMESTEP) {
            return invalid(format!(
                "timestep_secs must be in (0, {}], got {}",
                MAX_TIMESTEP, self.timestep_secs
            ));
        }

        if !self.player.position.iter().all(|c| c.is_finite()) {
            return invalid(format!("player '{}' has a non-finite position", self.player.name));
        }
        if let Some(stat) = non_finite_override(&self.player.stats) {
            return invalid(format!("player '{}' has a non-finite {:?} override", self.player.name, stat));
        }

        let mut names = HashSet::new();
        names.insert(self.player.name.as_str());
        for unit in &self.units {
            if !names.insert(unit.name.as_str()) {
                return invalid(format!("duplicate entity name '{}'", unit.name));
            }
            if !unit.position.iter().all(|c| c.is_finite()) {
                return invalid(format!("unit '{}' has a non-finite position", unit.name));
            }
            if let Some(stat) = non_finite_override(&unit.stats) {
                return invalid(format!("unit '{}' has a non-finite {:?} override", unit.name, stat));
            }
            if !(unit.detection_range >= 0.0) {
                return invalid(format!("unit '{}' has a negative detection_range", unit.name));
            }
        }

        for event in &self.script {
            if !(event.at >= 0.0) {
                return invalid(format!("scripted event for '{}' has invalid time {}", event.target, event.at));
            }
            if !names.contains(event.target.as_str()) {
                return invalid(format!("scripted event targets unknown entity '{}'", event.target));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "units": [
            { "name": "Grunt", "archetype": "Brawler", "position": [8.0, 0.0] }
        ]
    }"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ScenarioConfig::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.player.name, "Player");
        assert_eq!(config.max_duration_secs, 60.0);
        assert_eq!(config.units[0].detection_range, DEFAULT_DETECTION_RANGE);
        assert!(config.script.is_empty());
    }

    #[test]
    fn test_script_actions_parse() {
        let json = r#"{
            "units": [{ "name": "Grunt", "position": [3.0, 0.0] }],
            "script": [
                { "at": 1.0, "target": "Player", "action": "apply_status", "status": "Invulnerability" },
                { "at": 2.0, "target": "Grunt", "action": "damage", "amount": 5, "stun_time": 0.5 },
                { "at": 3.0, "target": "Grunt", "action": "dispel", "status": "Snare" },
                { "at": 4.0, "target": "Grunt", "action": "reactivate" }
            ]
        }"#;
        let config = ScenarioConfig::from_json_str(json).unwrap();
        assert!(matches!(
            config.script[0].action,
            ScriptAction::ApplyStatus { status: StatusKind::Invulnerability }
        ));
        assert!(matches!(config.script[1].action, ScriptAction::Damage { amount: 5, .. }));
        assert!(matches!(config.script[3].action, ScriptAction::Reactivate));
    }

    #[test]
    fn test_stat_overrides() {
        let json = r#"{
            "player": { "stats": { "MaxHealth": 80.0 } },
            "units": [{ "name": "Grunt", "position": [3.0, 0.0], "stats": { "AttackRange": 4.0 } }]
        }"#;
        let config = ScenarioConfig::from_json_str(json).unwrap();
        assert_eq!(config.player.stat_block().derived().max_health, 80);
        assert_eq!(config.units[0].stat_block().value(StatKind::AttackRange), 4.0);
    }

    #[test]
    fn test_rejects_unknown_script_target() {
        let json = r#"{
            "script": [{ "at": 1.0, "target": "Nobody", "action": "reactivate" }]
        }"#;
        let err = ScenarioConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScenario(_)));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let json = r#"{
            "units": [
                { "name": "Grunt", "position": [3.0, 0.0] },
                { "name": "Grunt", "position": [4.0, 0.0] }
            ]
        }"#;
        assert!(ScenarioConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_rejects_bad_timestep() {
        let json = r#"{ "timestep_secs": 0.0 }"#;
        assert!(ScenarioConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_rejects_non_finite_player_and_overrides() {
        let mut config = ScenarioConfig::from_json_str(MINIMAL).unwrap();
        config.player.position = [f32::NAN, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidScenario(_))));

        let mut config = ScenarioConfig::from_json_str(MINIMAL).unwrap();
        config.player.stats.insert(StatKind::MaxHealth, f32::INFINITY);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidScenario(_))));

        let mut config = ScenarioConfig::from_json_str(MINIMAL).unwrap();
        config.units[0].stats.insert(StatKind::AttackRange, f32::NAN);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidScenario(_))));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = ScenarioConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
