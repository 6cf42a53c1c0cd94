//! Shared helpers for integration tests driving a headless `App`.

#![allow(dead_code)]

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use skirmish::ai::systems::GameRng;
use skirmish::ai::AiPlugin;
use skirmish::combat::events::{EntityDied, StatusApplied, StatusRemoved};
use skirmish::combat::stats::{StatBlock, StatKind};
use skirmish::combat::status::config::DEFAULT_STATUS_CONFIG;
use skirmish::combat::status::load_status_definitions;
use skirmish::combat::vitals::Vitals;
use skirmish::combat::CombatPlugin;
use skirmish::spawn::CombatantBundle;

/// Events seen so far, collected after every update.
#[derive(Resource, Default)]
pub struct Recorded {
    pub deaths: Vec<EntityDied>,
    pub applied: Vec<StatusApplied>,
    pub removed: Vec<StatusRemoved>,
}

fn record_events(
    mut deaths: EventReader<EntityDied>,
    mut applied: EventReader<StatusApplied>,
    mut removed: EventReader<StatusRemoved>,
    mut recorded: ResMut<Recorded>,
) {
    recorded.deaths.extend(deaths.read().cloned());
    recorded.applied.extend(applied.read().cloned());
    recorded.removed.extend(removed.read().cloned());
}

fn base_app(step: f32) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(step)))
        .insert_resource(load_status_definitions(DEFAULT_STATUS_CONFIG).expect("shipped statuses.ron should load"))
        .init_resource::<Recorded>()
        .add_plugins(CombatPlugin)
        .add_systems(PostUpdate, record_events);
    app
}

/// App with the combat core, stepped by `step` seconds per update.
///
/// The first update (which always has a zero delta) has already run.
pub fn combat_app(step: f32) -> App {
    let mut app = base_app(step);
    app.update();
    app
}

/// Combat app plus the AI, with a seeded RNG.
pub fn ai_app(step: f32) -> App {
    let mut app = base_app(step);
    app.insert_resource(GameRng::from_seed(7)).add_plugins(AiPlugin);
    app.update();
    app
}

pub fn stats(max_health: f32, max_shield: f32) -> StatBlock {
    StatBlock::from_bases([
        (StatKind::MaxHealth, max_health),
        (StatKind::HealthRegen, 0.0),
        (StatKind::MaxShield, max_shield),
        (StatKind::AttackSpeed, 1.0),
        (StatKind::AttackRange, 1.5),
    ])
}

pub fn spawn_combatant(app: &mut App, name: &str, position: Vec3, stats: StatBlock) -> Entity {
    app.world_mut().spawn(CombatantBundle::new(name, position, stats)).id()
}

pub fn vitals(app: &App, entity: Entity) -> Vitals {
    app.world().get::<Vitals>(entity).cloned().expect("entity has vitals")
}

pub fn step(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

pub fn recorded(app: &App) -> &Recorded {
    app.world().resource::<Recorded>()
}
