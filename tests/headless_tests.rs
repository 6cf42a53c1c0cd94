//! End-to-end tests for headless scenarios
//!
//! Each test builds a scenario from JSON, runs it to completion and checks
//! the outcome, the final report and the combat log text.

use regex::Regex;

use skirmish::ai::AiState;
use skirmish::combat::log::{CombatLogEntry, CombatLogEventType};
use skirmish::combat::status::config::DEFAULT_STATUS_CONFIG;
use skirmish::combat::status::load_status_definitions;
use skirmish::headless::{run_scenario, ScenarioConfig, ScenarioOutcome, ScenarioResult};

fn run(json: &str) -> ScenarioResult {
    let config = ScenarioConfig::from_json_str(json).expect("scenario should parse");
    let statuses = load_status_definitions(DEFAULT_STATUS_CONFIG).expect("shipped statuses.ron should load");
    run_scenario(&config, statuses, false).expect("scenario should run")
}

fn messages(log: &[CombatLogEntry], event_type: CombatLogEventType) -> Vec<&str> {
    log.iter()
        .filter(|e| e.event_type == event_type)
        .map(|e| e.message.as_str())
        .collect()
}

const DUEL: &str = r#"{
    "player": { "stats": { "MaxHealth": 5.0, "MaxShield": 0.0, "HealthRegen": 0.0 } },
    "units": [
        { "name": "Grunt", "archetype": "Brawler", "position": [1.0, 0.0], "attack_damage": 3 }
    ],
    "max_duration_secs": 10.0,
    "timestep_secs": 0.1,
    "random_seed": 42
}"#;

// =============================================================================
// Outcomes
// =============================================================================

#[test]
fn test_player_defeated_by_brawler() {
    let result = run(DUEL);

    assert_eq!(result.outcome, ScenarioOutcome::PlayerDefeated);
    assert!(!result.player.survived);
    assert_eq!(result.player.final_health, 0);
    assert!(result.units[0].survived);
    assert!(result.duration < 10.0);
}

#[test]
fn test_same_seed_same_run() {
    let first = run(DUEL);
    let second = run(DUEL);

    assert_eq!(first.duration, second.duration);
    assert_eq!(first.units[0].final_position, second.units[0].final_position);
    let first_log: Vec<&str> = first.log.iter().map(|e| e.message.as_str()).collect();
    let second_log: Vec<&str> = second.log.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(first_log, second_log);
}

#[test]
fn test_units_defeated_by_script() {
    let result = run(r#"{
        "units": [{ "name": "Grunt", "position": [20.0, 0.0] }],
        "script": [{ "at": 0.0, "target": "Grunt", "action": "damage", "amount": 100 }],
        "max_duration_secs": 5.0,
        "timestep_secs": 0.1
    }"#);

    assert_eq!(result.outcome, ScenarioOutcome::UnitsDefeated);
    assert!(!result.units[0].survived);
    assert!(result.player.survived);
}

#[test]
fn test_times_out_when_nobody_engages() {
    let result = run(r#"{
        "units": [{ "name": "Grunt", "position": [50.0, 0.0] }],
        "max_duration_secs": 2.0,
        "timestep_secs": 0.1,
        "random_seed": 3
    }"#);

    assert_eq!(result.outcome, ScenarioOutcome::TimedOut);
    assert!(result.duration >= 2.0);
    assert_eq!(result.units[0].final_state, Some(AiState::Idle));
    assert_eq!(result.player.final_state, None);
}

#[test]
fn test_scripted_invulnerability_protects_player() {
    let result = run(r#"{
        "player": { "stats": { "MaxHealth": 20.0, "MaxShield": 0.0 } },
        "units": [{ "name": "Grunt", "position": [1.0, 0.0] }],
        "script": [{ "at": 0.0, "target": "Player", "action": "apply_status", "status": "Invulnerability" }],
        "max_duration_secs": 1.2,
        "timestep_secs": 0.1,
        "random_seed": 5
    }"#);

    assert_eq!(result.outcome, ScenarioOutcome::TimedOut);
    assert_eq!(result.player.final_health, 20);
    assert!(messages(&result.log, CombatLogEventType::StatusApplied).contains(&"Player gains Invulnerability"));
}

#[test]
fn test_report_written_to_output_path() {
    let path = std::env::temp_dir().join("skirmish_headless_report_test.json");
    let _ = std::fs::remove_file(&path);
    let json = format!(
        r#"{{
            "units": [{{ "name": "Grunt", "position": [50.0, 0.0] }}],
            "max_duration_secs": 0.5,
            "timestep_secs": 0.1,
            "output_path": {}
        }}"#,
        serde_json::to_string(&path.to_string_lossy()).unwrap()
    );
    run(&json);

    let contents = std::fs::read_to_string(&path).unwrap();
    let report: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(report["outcome"], "TimedOut");
    assert!(!report["log"].as_array().unwrap().is_empty());
    let _ = std::fs::remove_file(&path);
}

// =============================================================================
// Combat log text
// =============================================================================

#[test]
fn test_damage_and_death_messages() {
    let result = run(DUEL);

    let hit = Regex::new(r"^Grunt hits Player for \d+ damage$").unwrap();
    let damage = messages(&result.log, CombatLogEventType::Damage);
    assert!(!damage.is_empty());
    assert!(damage.iter().all(|m| hit.is_match(m)), "unexpected damage lines: {:?}", damage);

    assert_eq!(
        messages(&result.log, CombatLogEventType::Death),
        vec!["Player has been slain by Grunt"]
    );
}

#[test]
fn test_transition_messages() {
    let result = run(DUEL);

    let transition = Regex::new(r"^Grunt (Idle|Chase|Attack|Retreat|Flee) -> (Idle|Chase|Attack|Retreat|Flee)$").unwrap();
    let transitions = messages(&result.log, CombatLogEventType::AiTransition);
    assert!(transitions.contains(&"Grunt Idle -> Chase"));
    assert!(transitions.iter().all(|m| transition.is_match(m)));
}

#[test]
fn test_scripted_damage_comes_from_environment() {
    let result = run(r#"{
        "units": [{ "name": "Grunt", "position": [20.0, 0.0] }],
        "script": [{ "at": 0.0, "target": "Grunt", "action": "damage", "amount": 100 }],
        "timestep_secs": 0.1
    }"#);

    let hit = Regex::new(r"^Environment hits Grunt for \d+ damage$").unwrap();
    assert!(messages(&result.log, CombatLogEventType::Damage).iter().any(|m| hit.is_match(m)));
    assert!(messages(&result.log, CombatLogEventType::Death).contains(&"Grunt has been slain by Environment"));
}

#[test]
fn test_match_events_bracket_the_log() {
    let result = run(DUEL);

    let first = result.log.first().unwrap();
    let last = result.log.last().unwrap();
    assert_eq!(first.event_type, CombatLogEventType::MatchEvent);
    assert!(first.message.starts_with("Scenario started"));
    assert_eq!(last.message, "Scenario ended: PlayerDefeated");
}
