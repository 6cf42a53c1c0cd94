//! Combat system scheduling
//!
//! Systems run in `Update`, grouped into three ordered phases:
//! 1. `ResourcesAndStatuses`: log clock, status requests and countdowns,
//!    deaths from shrunken health caps, regeneration, immunity windows, stagger
//! 2. `Behavior`: AI decisions, movement, knockback
//! 3. `Resolution`: damage requests and deaths
//!
//! Other plugins (AI, headless harness) add their systems into these sets.

use bevy::prelude::*;

use super::damage::{process_damage_requests, tick_damage_windows, tick_stagger, tick_vitals};
use super::events::{ApplyStatus, DispelStatus, EntityDied, StatusApplied, StatusRemoved};
use super::knockback::apply_knockback;
use super::log::{advance_combat_log_clock, display_name, CombatLog, CombatLogEventType};
use super::stats::StatBlock;
use super::status::{ActiveStatuses, ApplyOutcome, RemovalReason, StatusDefinitions};
use super::vitals::{Dead, Vitals};

/// System sets for ordering combat systems within `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSystemPhase {
    /// Phase 1: status effects, regeneration, countdowns
    ResourcesAndStatuses,
    /// Phase 2: AI, movement, knockback
    Behavior,
    /// Phase 3: damage resolution and deaths
    Resolution,
}

/// Configures the ordering between combat system phases.
pub fn configure_combat_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            CombatSystemPhase::ResourcesAndStatuses,
            CombatSystemPhase::Behavior,
            CombatSystemPhase::Resolution,
        )
            .chain(),
    );
}

/// Adds the core combat systems to the app.
pub fn add_core_combat_systems(app: &mut App) {
    // Phase 1: Resources and statuses
    app.add_systems(
        Update,
        (
            advance_combat_log_clock,
            apply_status_requests,
            dispel_status_requests,
            tick_statuses,
            settle_drained_deaths,
            tick_vitals,
            tick_damage_windows,
            tick_stagger,
        )
            .chain()
            .in_set(CombatSystemPhase::ResourcesAndStatuses),
    );

    // Flush deferred commands (stagger removal) between phases
    app.add_systems(
        Update,
        apply_deferred
            .after(CombatSystemPhase::ResourcesAndStatuses)
            .before(CombatSystemPhase::Behavior),
    );

    // Phase 2: Behavior
    app.add_systems(Update, apply_knockback.in_set(CombatSystemPhase::Behavior));

    // Phase 3: Resolution
    app.add_systems(Update, process_damage_requests.in_set(CombatSystemPhase::Resolution));
}

/// Apply requested statuses using the loaded templates.
pub fn apply_status_requests(
    mut requests: EventReader<ApplyStatus>,
    definitions: Res<StatusDefinitions>,
    mut targets: Query<(&mut ActiveStatuses, &mut StatBlock, &mut Vitals, Option<&Name>), Without<Dead>>,
    mut applied: EventWriter<StatusApplied>,
    mut combat_log: ResMut<CombatLog>,
) {
    for request in requests.read() {
        let Some(template) = definitions.get(request.kind) else {
            warn!("No template loaded for status {:?}", request.kind);
            continue;
        };
        let Ok((mut statuses, mut stats, mut vitals, name)) = targets.get_mut(request.target) else {
            continue;
        };

        let outcome = statuses.apply(template, &mut stats, &mut vitals);
        let target_name = display_name(name, request.target);
        let message = match outcome {
            ApplyOutcome::Ignored => {
                debug!("{} already has {}, ignored", target_name, template.name);
                continue;
            }
            ApplyOutcome::Applied => format!("{} gains {}", target_name, template.name),
            ApplyOutcome::Refreshed => format!("{} refreshes {}", target_name, template.name),
            ApplyOutcome::Stacked { stacks } => {
                format!("{} gains {} ({} stacks)", target_name, template.name, stacks)
            }
        };
        combat_log.log(CombatLogEventType::StatusApplied, message);

        applied.send(StatusApplied {
            target: request.target,
            kind: request.kind,
            duration: template.initial_timer(),
        });
    }
}

/// Remove statuses early on request.
pub fn dispel_status_requests(
    mut requests: EventReader<DispelStatus>,
    mut targets: Query<(&mut ActiveStatuses, &mut StatBlock, &mut Vitals, Option<&Name>), Without<Dead>>,
    mut removed: EventWriter<StatusRemoved>,
    mut combat_log: ResMut<CombatLog>,
) {
    for request in requests.read() {
        let Ok((mut statuses, mut stats, mut vitals, name)) = targets.get_mut(request.target) else {
            continue;
        };
        if !statuses.remove(request.kind, &mut stats, &mut vitals) {
            continue;
        }

        combat_log.log(
            CombatLogEventType::StatusRemoved,
            format!("{:?} dispelled from {}", request.kind, display_name(name, request.target)),
        );
        removed.send(StatusRemoved {
            target: request.target,
            kind: request.kind,
            reason: RemovalReason::Dispelled,
        });
    }
}

/// Count status timers down and expire finished effects.
pub fn tick_statuses(
    time: Res<Time>,
    mut query: Query<(Entity, &mut ActiveStatuses, &mut StatBlock, &mut Vitals, Option<&Name>), Without<Dead>>,
    mut removed: EventWriter<StatusRemoved>,
    mut combat_log: ResMut<CombatLog>,
) {
    let dt = time.delta_secs();
    for (entity, mut statuses, mut stats, mut vitals, name) in query.iter_mut() {
        if statuses.is_empty() {
            continue;
        }
        for kind in statuses.tick(dt, &mut stats, &mut vitals) {
            combat_log.log(
                CombatLogEventType::StatusRemoved,
                format!("{:?} fades from {}", kind, display_name(name, entity)),
            );
            removed.send(StatusRemoved {
                target: entity,
                kind,
                reason: RemovalReason::Expired,
            });
        }
    }
}

/// Run the death transition for entities whose health a status drained by
/// lowering `MaxHealth` to zero.
pub fn settle_drained_deaths(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Vitals, Option<&Name>), Without<Dead>>,
    mut deaths: EventWriter<EntityDied>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (entity, mut vitals, name) in query.iter_mut() {
        if vitals.health > 0 || !vitals.settle_death() {
            continue;
        }
        let target_name = display_name(name, entity);
        info!("{} died", target_name);
        combat_log.log(CombatLogEventType::Death, format!("{} has withered away", target_name));
        commands.entity(entity).insert(Dead);
        deaths.send(EntityDied { entity, killer: None });
    }
}
