//! Unit spawning and reactivation
//!
//! A unit is a bundle of the combat core components plus, for enemies, the
//! AI. Everything starts at full health and shield with no statuses.
//! `reactivate` puts a dead (or worn) unit back into that state so the same
//! entity can be reused.

use bevy::prelude::*;

use crate::ai::{Archetype, UnitAi, Velocity};
use crate::combat::knockback::Knockback;
use crate::combat::stats::{StatBlock, StatKind};
use crate::combat::status::ActiveStatuses;
use crate::combat::vitals::{DamageWindows, Dead, RegenTimers, Stagger, UltCharge, Vitals};

/// Components shared by every combat participant.
#[derive(Bundle)]
pub struct CombatantBundle {
    pub name: Name,
    pub transform: Transform,
    pub stats: StatBlock,
    pub vitals: Vitals,
    pub timers: RegenTimers,
    pub statuses: ActiveStatuses,
    pub damage_windows: DamageWindows,
    pub ult_charge: UltCharge,
    pub knockback: Knockback,
}

impl CombatantBundle {
    /// Vitals start full with caps derived from `stats`.
    pub fn new(name: impl Into<String>, position: Vec3, stats: StatBlock) -> Self {
        let vitals = Vitals::from_derived(stats.derived());
        Self {
            name: Name::new(name.into()),
            transform: Transform::from_xyz(position.x, position.y, 0.0),
            stats,
            vitals,
            timers: RegenTimers::default(),
            statuses: ActiveStatuses::default(),
            damage_windows: DamageWindows::default(),
            ult_charge: UltCharge::default(),
            knockback: Knockback::default(),
        }
    }
}

/// A combatant driven by the AI.
#[derive(Bundle)]
pub struct UnitBundle {
    pub combatant: CombatantBundle,
    pub ai: UnitAi,
    pub velocity: Velocity,
}

impl UnitBundle {
    pub fn new(name: impl Into<String>, position: Vec3, stats: StatBlock, ai: UnitAi) -> Self {
        Self {
            combatant: CombatantBundle::new(name, position, stats),
            ai: ai.with_home(position),
            velocity: Velocity::default(),
        }
    }
}

/// Base stats for an archetype before scenario overrides.
pub fn archetype_stats(archetype: Archetype) -> StatBlock {
    let (max_health, regen, move_speed, attack_speed, attack_range) = match archetype {
        Archetype::Brawler => (30.0, 1.0, 3.0, 1.0, 1.5),
        Archetype::Skirmisher => (20.0, 0.0, 4.5, 1.5, 2.0),
        Archetype::Coward => (15.0, 2.0, 5.0, 0.8, 1.5),
    };
    StatBlock::from_bases([
        (StatKind::MaxHealth, max_health),
        (StatKind::HealthRegen, regen),
        (StatKind::MaxShield, 0.0),
        (StatKind::MovementSpeed, move_speed),
        (StatKind::AttackSpeed, attack_speed),
        (StatKind::AttackRange, attack_range),
        (StatKind::InjuryChargeRate, 0.0),
    ])
}

/// Spawn an AI unit and return its entity.
pub fn spawn_unit(commands: &mut Commands, bundle: UnitBundle) -> Entity {
    let entity = commands.spawn(bundle).id();
    debug!("Spawned unit {}", entity);
    entity
}

/// Reset a unit to its freshly spawned state.
///
/// Statuses are reverted (restoring base stats), vitals refilled, every
/// countdown restarted and the dead marker removed. The AI, if any, goes
/// back to `Idle` without a target.
pub fn reactivate(world: &mut World, entity: Entity) {
    if !world.entities().contains(entity) {
        warn!("Cannot reactivate missing entity {}", entity);
        return;
    }

    let mut combat_state = world.query::<(&mut ActiveStatuses, &mut StatBlock, &mut Vitals)>();
    if let Ok((mut statuses, mut stats, mut vitals)) = combat_state.get_mut(world, entity) {
        statuses.clear(&mut stats, &mut vitals);
    }

    let mut entity_mut = world.entity_mut(entity);
    entity_mut.remove::<(Dead, Stagger)>();

    if let Some(mut vitals) = entity_mut.get_mut::<Vitals>() {
        vitals.reset_to_full();
    }
    if let Some(mut timers) = entity_mut.get_mut::<RegenTimers>() {
        *timers = RegenTimers::default();
    }
    if let Some(mut windows) = entity_mut.get_mut::<DamageWindows>() {
        windows.clear();
    }
    if let Some(mut ult) = entity_mut.get_mut::<UltCharge>() {
        ult.current = 0.0;
    }
    if let Some(mut knockback) = entity_mut.get_mut::<Knockback>() {
        knockback.velocity = Vec3::ZERO;
    }
    if let Some(mut velocity) = entity_mut.get_mut::<Velocity>() {
        velocity.0 = Vec3::ZERO;
    }
    if let Some(mut ai) = entity_mut.get_mut::<UnitAi>() {
        ai.reset();
    }

    debug!("Reactivated {}", entity);
}
