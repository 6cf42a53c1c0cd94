//! Damage application
//!
//! The shield-then-health absorption rule and the systems that feed damage
//! requests through it:
//! - Invincible or dead targets ignore the hit entirely
//! - Every other hit (even for 0) re-arms the shield restore countdown
//! - Damage beyond the current shield overflows into health in the same hit
//! - Reaching 0 health runs the death transition exactly once

use bevy::prelude::*;

use super::events::{DamageRequest, DamageTaken, EntityDied};
use super::knockback::Knockback;
use super::log::{display_name, CombatLog, CombatLogEventType};
use super::stats::{StatBlock, StatKind};
use super::status::{ActiveStatuses, CapabilityFlags};
use super::vitals::{DamageWindows, Dead, RegenTimers, Stagger, UltCharge, Vitals};

/// Why a hit had no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoredReason {
    Invincible,
    AlreadyDead,
}

/// Result of [`apply_damage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    Ignored(IgnoredReason),
    Applied {
        absorbed_by_shield: i32,
        health_lost: i32,
        died: bool,
    },
}

impl DamageOutcome {
    pub fn died(&self) -> bool {
        matches!(self, DamageOutcome::Applied { died: true, .. })
    }

    /// Damage that actually reached health.
    pub fn health_lost(&self) -> i32 {
        match self {
            DamageOutcome::Applied { health_lost, .. } => *health_lost,
            DamageOutcome::Ignored(_) => 0,
        }
    }
}

/// Apply `amount` damage to `vitals`.
///
/// Negative amounts are clamped to zero. The caller owns side effects that
/// need the world (death marker, stagger, events).
pub fn apply_damage(
    amount: i32,
    vitals: &mut Vitals,
    timers: &mut RegenTimers,
    flags: CapabilityFlags,
) -> DamageOutcome {
    if vitals.dead {
        return DamageOutcome::Ignored(IgnoredReason::AlreadyDead);
    }
    if flags.invincible {
        return DamageOutcome::Ignored(IgnoredReason::Invincible);
    }

    let amount = amount.max(0);
    timers.rearm_shield();

    let health_before = vitals.health;
    let mut absorbed_by_shield = 0;

    if vitals.shield > 0 {
        let shield_before = vitals.shield;
        vitals.shield -= amount;
        if vitals.shield < 0 {
            // Overflow through the depleted shield
            vitals.health += vitals.shield;
            vitals.shield = 0;
        }
        absorbed_by_shield = shield_before - vitals.shield;
    } else {
        vitals.health -= amount;
    }

    vitals.health = vitals.health.clamp(0, vitals.max_health);
    let died = vitals.health <= 0;
    if died {
        vitals.dead = true;
    }
    vitals.debug_validate();

    DamageOutcome::Applied {
        absorbed_by_shield,
        health_lost: (health_before - vitals.health).max(0),
        died,
    }
}

/// Resolve damage requests against their targets.
#[allow(clippy::type_complexity)]
pub fn process_damage_requests(
    mut commands: Commands,
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(
        &mut Vitals,
        &mut RegenTimers,
        Option<&ActiveStatuses>,
        Option<&mut DamageWindows>,
        Option<&StatBlock>,
        Option<&mut UltCharge>,
        Option<&mut Stagger>,
        Option<&mut Knockback>,
    )>,
    names: Query<&Name>,
    mut damage_taken: EventWriter<DamageTaken>,
    mut deaths: EventWriter<EntityDied>,
    mut combat_log: ResMut<CombatLog>,
) {
    for request in requests.read() {
        let Ok((mut vitals, mut timers, statuses, windows, stats, ult, stagger, knockback)) =
            targets.get_mut(request.target)
        else {
            continue;
        };

        let mut windows = windows;
        if let (Some(source), Some(windows)) = (request.source, windows.as_deref()) {
            if !windows.can_take_damage_from(source) {
                continue;
            }
        }

        let flags = statuses.map(|s| s.flags()).unwrap_or_default();
        let outcome = apply_damage(request.amount, &mut vitals, &mut timers, flags);
        let DamageOutcome::Applied { absorbed_by_shield, health_lost, died } = outcome else {
            continue;
        };

        if let (Some(source), Some(window), Some(windows)) =
            (request.source, request.immunity_window, windows.as_deref_mut())
        {
            windows.set_damage_timer(source, window);
        }

        if let Some(mut ult) = ult {
            let rate = stats.map_or(0.0, |s| s.value(StatKind::InjuryChargeRate));
            ult.charge_from_injury(request.amount.max(0), rate, flags.ult_charge_banned);
        }

        if request.stun_time > 0.0 && !died {
            match stagger {
                Some(mut stagger) => stagger.extend(request.stun_time),
                None => {
                    commands.entity(request.target).insert(Stagger { remaining: request.stun_time });
                }
            }
        }

        if let Some(mut knockback) = knockback.filter(|_| !died && request.knockback != Vec3::ZERO) {
            knockback.push(request.knockback);
        }

        let target_name = display_name(names.get(request.target).ok(), request.target);
        let source_name = request
            .source
            .map(|s| display_name(names.get(s).ok(), s))
            .unwrap_or_else(|| "Environment".to_string());
        let message = if absorbed_by_shield > 0 {
            format!(
                "{} hits {} for {} damage ({} absorbed by shield)",
                source_name, target_name, health_lost, absorbed_by_shield
            )
        } else {
            format!("{} hits {} for {} damage", source_name, target_name, health_lost)
        };
        combat_log.log(CombatLogEventType::Damage, message);

        damage_taken.send(DamageTaken {
            source: request.source,
            target: request.target,
            absorbed_by_shield,
            health_lost,
        });

        if died {
            info!("{} died", target_name);
            combat_log.log(CombatLogEventType::Death, format!("{} has been slain by {}", target_name, source_name));
            commands.entity(request.target).insert(Dead);
            deaths.send(EntityDied {
                entity: request.target,
                killer: request.source,
            });
        }
    }
}

/// Advance health regeneration and shield restore countdowns.
pub fn tick_vitals(time: Res<Time>, mut query: Query<(&mut Vitals, &mut RegenTimers), Without<Dead>>) {
    let dt = time.delta_secs();
    for (mut vitals, mut timers) in query.iter_mut() {
        timers.tick(dt, &mut vitals);
        vitals.debug_validate();
    }
}

/// Count down damage immunity windows and prune expired sources.
pub fn tick_damage_windows(time: Res<Time>, mut query: Query<&mut DamageWindows>) {
    let dt = time.delta_secs();
    for mut windows in query.iter_mut() {
        if !windows.is_empty() {
            windows.tick(dt);
        }
    }
}

/// Count down stagger and remove it once over.
pub fn tick_stagger(time: Res<Time>, mut commands: Commands, mut query: Query<(Entity, &mut Stagger)>) {
    let dt = time.delta_secs();
    for (entity, mut stagger) in query.iter_mut() {
        stagger.remaining -= dt;
        if stagger.remaining <= 0.0 {
            commands.entity(entity).remove::<Stagger>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(health: i32, shield: i32) -> (Vitals, RegenTimers) {
        (Vitals::new(health, 0, shield), RegenTimers::default())
    }

    const NO_FLAGS: CapabilityFlags = CapabilityFlags {
        rooted: false,
        silenced: false,
        invincible: false,
        ult_charge_banned: false,
    };

    #[test]
    fn test_shield_overflow_into_health() {
        let (mut vitals, mut timers) = unit(20, 5);

        let outcome = apply_damage(8, &mut vitals, &mut timers, NO_FLAGS);

        assert_eq!(vitals.shield, 0);
        assert_eq!(vitals.health, 17, "3 points overflow into health");
        assert_eq!(
            outcome,
            DamageOutcome::Applied { absorbed_by_shield: 5, health_lost: 3, died: false }
        );
    }

    #[test]
    fn test_damage_fully_absorbed_by_shield() {
        let (mut vitals, mut timers) = unit(20, 10);
        apply_damage(4, &mut vitals, &mut timers, NO_FLAGS);
        assert_eq!(vitals.shield, 6);
        assert_eq!(vitals.health, 20);
    }

    #[test]
    fn test_damage_without_shield_hits_health() {
        let (mut vitals, mut timers) = unit(20, 0);
        let outcome = apply_damage(7, &mut vitals, &mut timers, NO_FLAGS);
        assert_eq!(vitals.health, 13);
        assert_eq!(outcome.health_lost(), 7);
    }

    #[test]
    fn test_invincible_is_noop() {
        let (mut vitals, mut timers) = unit(20, 5);
        let flags = CapabilityFlags { invincible: true, ..NO_FLAGS };

        for amount in [0, 3, 8, 1000] {
            let outcome = apply_damage(amount, &mut vitals, &mut timers, flags);
            assert_eq!(outcome, DamageOutcome::Ignored(IgnoredReason::Invincible));
        }
        assert_eq!(vitals.health, 20);
        assert_eq!(vitals.shield, 5);
    }

    #[test]
    fn test_lethal_damage_kills_once() {
        let (mut vitals, mut timers) = unit(20, 0);

        let first = apply_damage(25, &mut vitals, &mut timers, NO_FLAGS);
        let second = apply_damage(25, &mut vitals, &mut timers, NO_FLAGS);

        assert!(first.died());
        assert_eq!(first.health_lost(), 20);
        assert_eq!(second, DamageOutcome::Ignored(IgnoredReason::AlreadyDead));
        assert_eq!(vitals.health, 0);
        assert!(vitals.is_dead());
    }

    #[test]
    fn test_negative_damage_clamped_to_zero() {
        let (mut vitals, mut timers) = unit(20, 5);
        vitals.health = 10;
        let outcome = apply_damage(-50, &mut vitals, &mut timers, NO_FLAGS);
        assert_eq!(vitals.health, 10, "negative damage must not heal");
        assert_eq!(vitals.shield, 5);
        assert_eq!(outcome.health_lost(), 0);
    }

    #[test]
    fn test_zero_damage_still_rearms_shield() {
        let (mut vitals, mut timers) = unit(20, 5);
        vitals.shield = 0;
        timers.tick(2.9, &mut vitals);

        apply_damage(0, &mut vitals, &mut timers, NO_FLAGS);
        timers.tick(0.2, &mut vitals);
        assert_eq!(vitals.shield, 0, "restore postponed by the zero-damage hit");
    }

    #[test]
    fn test_damage_interrupts_imminent_shield_restore() {
        let (mut vitals, mut timers) = unit(20, 5);
        apply_damage(5, &mut vitals, &mut timers, NO_FLAGS);
        assert_eq!(vitals.shield, 0);

        // 0.1s before the restore would fire, take another hit at t = 2.9
        timers.tick(2.9, &mut vitals);
        apply_damage(1, &mut vitals, &mut timers, NO_FLAGS);

        timers.tick(2.9, &mut vitals);
        assert_eq!(vitals.shield, 0, "must not restore before t + 3");
        timers.tick(0.1, &mut vitals);
        assert_eq!(vitals.shield, 5);
    }

    #[test]
    fn test_ranges_preserved_for_many_hits() {
        for shield in 0..=6 {
            for health in 1..=20 {
                for amount in 0..=30 {
                    let mut vitals = Vitals::new(20, 0, 6);
                    vitals.shield = shield;
                    vitals.health = health;
                    let mut timers = RegenTimers::default();

                    apply_damage(amount, &mut vitals, &mut timers, NO_FLAGS);

                    assert!((0..=vitals.max_health).contains(&vitals.health));
                    assert!((0..=vitals.max_shield).contains(&vitals.shield));
                    assert_eq!(vitals.is_dead(), vitals.health == 0);
                }
            }
        }
    }
}
