//! Headless scenario execution
//!
//! Runs a scenario without any graphical output, stepping the app with a
//! fixed timestep so runs are reproducible.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use super::config::{ScenarioConfig, ScriptAction, ScriptedEvent};
use super::world::{acquire_targets, Player};
use crate::ai::systems::GameRng;
use crate::ai::{AiPlugin, AiState, UnitAi};
use crate::combat::error::ConfigError;
use crate::combat::events::{ApplyStatus, DamageRequest, DispelStatus};
use crate::combat::log::{CombatLog, CombatLogEntry, CombatLogEventType};
use crate::combat::status::StatusDefinitions;
use crate::combat::systems::CombatSystemPhase;
use crate::combat::vitals::{Dead, Vitals};
use crate::combat::CombatPlugin;
use crate::spawn::{reactivate, spawn_unit, CombatantBundle, UnitBundle};

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioOutcome {
    /// The player died
    PlayerDefeated,
    /// Every unit died (only possible through scripted damage)
    UnitsDefeated,
    /// Neither side fell before `max_duration_secs`
    TimedOut,
}

/// Result of a completed headless scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub outcome: ScenarioOutcome,
    /// Simulated seconds until the scenario ended
    pub duration: f32,
    pub player: CombatantReport,
    pub units: Vec<CombatantReport>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Full combat log of the run
    pub log: Vec<CombatLogEntry>,
}

/// State of a single combatant when the scenario ended
#[derive(Debug, Clone, Serialize)]
pub struct CombatantReport {
    pub name: String,
    pub max_health: i32,
    pub final_health: i32,
    pub final_shield: i32,
    pub survived: bool,
    /// AI state at the end (None for the player)
    pub final_state: Option<AiState>,
    pub final_position: (f32, f32),
}

/// Plugin wiring the combat core, the AI and the world-layer services.
pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((CombatPlugin, AiPlugin)).add_systems(
            Update,
            acquire_targets
                .in_set(CombatSystemPhase::Behavior)
                .before(crate::ai::systems::decide_unit_actions),
        );
    }
}

/// Build a ready-to-step app for `config`.
///
/// Returns the app and the entity of every named participant (player first).
pub fn build_scenario_app(
    config: &ScenarioConfig,
    statuses: StatusDefinitions,
    logging: bool,
) -> Result<(App, Vec<(String, Entity)>), ConfigError> {
    config.validate()?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if logging {
        app.add_plugins(LogPlugin::default());
    }
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        config.timestep_secs,
    )))
    .insert_resource(statuses)
    .insert_resource(match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => GameRng::from_entropy(),
    })
    .add_plugins(ScenarioPlugin);
    app.finish();
    app.cleanup();

    let world = app.world_mut();
    let mut entities = Vec::with_capacity(config.units.len() + 1);

    let player = world
        .spawn((
            CombatantBundle::new(&config.player.name, config.player.position(), config.player.stat_block()),
            Player,
        ))
        .id();
    entities.push((config.player.name.clone(), player));

    {
        let mut commands = world.commands();
        for unit in &config.units {
            let entity = spawn_unit(
                &mut commands,
                UnitBundle::new(&unit.name, unit.position(), unit.stat_block(), unit.unit_ai()),
            );
            entities.push((unit.name.clone(), entity));
        }
    }
    world.flush();

    world.resource_mut::<CombatLog>().log(
        CombatLogEventType::MatchEvent,
        format!("Scenario started: {} vs {} units", config.player.name, config.units.len()),
    );

    Ok((app, entities))
}

/// Run a scenario to completion.
pub fn run_scenario(
    config: &ScenarioConfig,
    statuses: StatusDefinitions,
    logging: bool,
) -> Result<ScenarioResult, ConfigError> {
    let (mut app, entities) = build_scenario_app(config, statuses, logging)?;

    let mut script: Vec<&ScriptedEvent> = config.script.iter().collect();
    script.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut script = script.into_iter().peekable();

    let player = entities[0].1;
    let units: Vec<Entity> = entities[1..].iter().map(|(_, e)| *e).collect();
    let max_steps = (config.max_duration_secs / config.timestep_secs).ceil() as usize + 1;

    let mut outcome = ScenarioOutcome::TimedOut;
    for _ in 0..=max_steps {
        let elapsed = app.world().resource::<Time>().elapsed_secs();
        while let Some(event) = script.next_if(|e| e.at <= elapsed) {
            let Some(target) = entities.iter().find(|(name, _)| *name == event.target).map(|(_, e)| *e) else {
                continue;
            };
            run_scripted_action(app.world_mut(), target, &event.action);
        }

        app.update();

        let world = app.world();
        if world.get::<Dead>(player).is_some() {
            outcome = ScenarioOutcome::PlayerDefeated;
            break;
        }
        if !units.is_empty() && units.iter().all(|e| world.get::<Dead>(*e).is_some()) {
            outcome = ScenarioOutcome::UnitsDefeated;
            break;
        }
        if world.resource::<Time>().elapsed_secs() >= config.max_duration_secs {
            break;
        }
    }

    let duration = app.world().resource::<Time>().elapsed_secs();
    info!("Scenario ended after {:.1}s: {:?}", duration, outcome);
    app.world_mut().resource_mut::<CombatLog>().log(
        CombatLogEventType::MatchEvent,
        format!("Scenario ended: {:?}", outcome),
    );

    let world = app.world();
    let result = ScenarioResult {
        outcome,
        duration,
        player: report(world, &entities[0].0, player),
        units: entities[1..].iter().map(|(name, e)| report(world, name, *e)).collect(),
        random_seed: config.random_seed,
        log: world.resource::<CombatLog>().entries.clone(),
    };

    if let Some(path) = &config.output_path {
        save_scenario_report(Path::new(path), &result)?;
        println!("Scenario complete. Report saved to: {}", path);
    }

    Ok(result)
}

fn run_scripted_action(world: &mut World, target: Entity, action: &ScriptAction) {
    match action {
        ScriptAction::ApplyStatus { status } => {
            world.send_event(ApplyStatus { target, kind: *status });
        }
        ScriptAction::Dispel { status } => {
            world.send_event(DispelStatus { target, kind: *status });
        }
        ScriptAction::Damage { amount, stun_time } => {
            world.send_event(DamageRequest::new(target, *amount).with_stun(*stun_time));
        }
        ScriptAction::Reactivate => reactivate(world, target),
    }
}

fn report(world: &World, name: &str, entity: Entity) -> CombatantReport {
    let vitals = world.get::<Vitals>(entity);
    let position = world.get::<Transform>(entity).map_or(Vec3::ZERO, |t| t.translation);
    CombatantReport {
        name: name.to_string(),
        max_health: vitals.map_or(0, |v| v.max_health),
        final_health: vitals.map_or(0, |v| v.health),
        final_shield: vitals.map_or(0, |v| v.shield),
        survived: world.get::<Dead>(entity).is_none(),
        final_state: world.get::<UnitAi>(entity).map(|ai| ai.state),
        final_position: (position.x, position.y),
    }
}

/// Save the result, combat log included, as JSON.
pub fn save_scenario_report(path: &Path, result: &ScenarioResult) -> Result<(), ConfigError> {
    let contents = serde_json::to_string_pretty(result)?;
    std::fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
