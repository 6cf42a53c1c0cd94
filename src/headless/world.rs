//! World-layer services for headless scenarios
//!
//! The combat core never looks for targets itself. In a scenario the world
//! layer assigns each unit the nearest living player, and drops targets that
//! died or despawned.

use bevy::prelude::*;

use crate::ai::{BehaviorContext, UnitAi};
use crate::combat::vitals::Dead;

/// Marker for the entity the AI units hunt.
#[derive(Component, Debug, Default)]
pub struct Player;

/// Nearest candidate to `from` on the ground plane.
pub fn nearest(from: Vec3, candidates: impl IntoIterator<Item = (Entity, Vec3)>) -> Option<Entity> {
    candidates
        .into_iter()
        .map(|(entity, position)| (entity, BehaviorContext::planar_distance(from, position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

/// Point every living unit at the nearest living player.
pub fn acquire_targets(
    mut units: Query<(&mut UnitAi, &Transform), Without<Dead>>,
    players: Query<(Entity, &Transform), (With<Player>, Without<Dead>)>,
) {
    for (mut ai, transform) in units.iter_mut() {
        let target = nearest(
            transform.translation,
            players.iter().map(|(entity, t)| (entity, t.translation)),
        );
        if ai.target != target {
            ai.target = target;
        }
    }
}
