//! AI systems
//!
//! Builds a [`BehaviorContext`] per unit from ECS state, runs the state
//! machine and turns its output into movement and damage requests.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{behavior_for, step_state_machine, AiAction, BehaviorContext, UnitAi, Velocity};
use crate::combat::constants::DEFAULT_HIT_IMMUNITY;
use crate::combat::events::DamageRequest;
use crate::combat::log::{display_name, CombatLog, CombatLogEventType};
use crate::combat::stats::{StatBlock, StatKind};
use crate::combat::status::ActiveStatuses;
use crate::combat::vitals::{Dead, Stagger, Vitals};

/// Seeded RNG resource for deterministic simulation.
///
/// Headless scenarios seed it so a run can be replayed exactly.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Random f32 in [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random planar unit vector.
    pub fn random_direction(&mut self) -> Vec3 {
        let angle = self.random_f32() * std::f32::consts::TAU;
        Vec3::new(angle.cos(), angle.sin(), 0.0)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Seconds between strikes for an attack speed in strikes per second.
pub fn attack_interval(attack_speed: f32) -> Option<f32> {
    (attack_speed > 0.0).then(|| 1.0 / attack_speed)
}

/// Run every living unit's state machine for this tick.
#[allow(clippy::type_complexity)]
pub fn decide_unit_actions(
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut units: Query<
        (
            Entity,
            &mut UnitAi,
            &mut Velocity,
            &Transform,
            &Vitals,
            Option<&StatBlock>,
            Option<&ActiveStatuses>,
            Has<Stagger>,
            Option<&Name>,
        ),
        Without<Dead>,
    >,
    targets: Query<&Transform, Without<Dead>>,
    mut damage_requests: EventWriter<DamageRequest>,
    mut combat_log: ResMut<CombatLog>,
) {
    let dt = time.delta_secs();

    for (entity, mut ai, mut velocity, transform, vitals, stats, statuses, staggered, name) in units.iter_mut() {
        ai.attack_cooldown = (ai.attack_cooldown - dt).max(0.0);

        let stat = |kind: StatKind, fallback: f32| match stats {
            Some(stats) if stats.has_stat(kind) => stats.value(kind),
            _ => fallback,
        };

        let interval = attack_interval(stat(StatKind::AttackSpeed, 1.0));

        let ctx = ai
            .target
            .and_then(|target| targets.get(target).ok().map(|t| (target, t.translation)))
            .map(|(target, target_position)| BehaviorContext {
                target,
                position: transform.translation,
                target_position,
                home: ai.home,
                distance: BehaviorContext::planar_distance(transform.translation, target_position),
                detection_range: ai.detection_range,
                attack_range: stat(StatKind::AttackRange, ai.attack_range),
                move_speed: stat(StatKind::MovementSpeed, 0.0),
                health_pct: vitals.health_pct(),
                attack_ready: ai.attack_cooldown <= 0.0 && interval.is_some(),
                attack_damage: ai.attack_damage,
                flags: statuses.map(|s| s.flags()).unwrap_or_default(),
                staggered,
                wander: rng.random_direction(),
            });

        let behavior = behavior_for(ai.archetype);
        let output = step_state_machine(ai.state, behavior.as_ref(), ctx.as_ref());
        velocity.0 = output.velocity;

        if output.next_state != ai.state {
            let unit_name = display_name(name, entity);
            debug!("{} ({}) {:?} -> {:?}", unit_name, behavior.name(), ai.state, output.next_state);
            combat_log.log(
                CombatLogEventType::AiTransition,
                format!("{} {:?} -> {:?}", unit_name, ai.state, output.next_state),
            );
            ai.state = output.next_state;
        }

        if let (Some(AiAction::Strike { target, damage }), Some(interval)) = (output.action, interval) {
            ai.attack_cooldown = interval;

            let direction = ctx.map_or(Vec3::ZERO, |c| c.direction_to_target());
            damage_requests.send(
                DamageRequest::new(target, damage)
                    .from_source(entity)
                    .with_stun(ai.stun_time)
                    .with_immunity_window(DEFAULT_HIT_IMMUNITY)
                    .with_knockback(direction * ai.knockback_force),
            );
        }
    }
}

/// Move units by their AI velocity on the ground plane.
pub fn apply_unit_movement(time: Res<Time>, mut query: Query<(&mut Transform, &Velocity), Without<Dead>>) {
    let dt = time.delta_secs();
    for (mut transform, velocity) in query.iter_mut() {
        if velocity.0 == Vec3::ZERO {
            continue;
        }
        transform.translation += velocity.0 * dt;
        transform.translation.z = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_interval() {
        assert_eq!(attack_interval(2.0), Some(0.5));
        assert_eq!(attack_interval(0.0), None);
        assert_eq!(attack_interval(-1.0), None);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = GameRng::from_seed(7);
        let mut b = GameRng::from_seed(7);
        for _ in 0..10 {
            assert_eq!(a.random_direction(), b.random_direction());
        }
    }

    #[test]
    fn test_random_direction_is_planar_unit() {
        let mut rng = GameRng::from_seed(1);
        for _ in 0..20 {
            let dir = rng.random_direction();
            assert_eq!(dir.z, 0.0);
            assert!((dir.length() - 1.0).abs() < 1e-5);
        }
    }
}
