//! Resource Controller state
//!
//! Health and shield pools, their recurring timers, and the per-entity
//! countdowns that gate incoming damage:
//! - `Vitals`: current/max health and shield, dead flag
//! - `RegenTimers`: 1s health regeneration and 3s shield restore countdowns
//! - `DamageWindows`: per-source damage immunity windows
//! - `Stagger`: one-shot countdown started by `stun_time` on a hit
//! - `UltCharge`: meter filled by taking damage
//!
//! The damage-application rule itself lives in [`super::damage`].

use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use super::constants::{HEALTH_REGEN_INTERVAL, SHIELD_RESTORE_DELAY, ULT_CHARGE_MAX};
use super::stats::DerivedStats;

/// Marker for entities whose death transition has run. Terminal until
/// [`reactivate`](crate::spawn::reactivate).
#[derive(Component, Debug, Default)]
pub struct Dead;

/// Health and shield of a single entity.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Vitals {
    pub health: i32,
    pub max_health: i32,
    /// Health gained per regeneration tick
    pub health_regen: i32,
    pub shield: i32,
    pub max_shield: i32,
    /// Kept for parity with the authoring data; the shield restores to full
    /// on a timer instead of regenerating incrementally.
    pub shield_regen: i32,
    pub(crate) dead: bool,
}

impl Vitals {
    /// Create vitals initialized to full.
    pub fn new(max_health: i32, health_regen: i32, max_shield: i32) -> Self {
        let max_health = max_health.max(0);
        let max_shield = max_shield.max(0);
        Self {
            health: max_health,
            max_health,
            health_regen: health_regen.max(0),
            shield: max_shield,
            max_shield,
            shield_regen: 0,
            dead: false,
        }
    }

    /// Vitals whose caps come from a stat block.
    pub fn from_derived(derived: DerivedStats) -> Self {
        Self::new(derived.max_health, derived.health_regen, derived.max_shield)
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Health as a fraction of max (0.0 when max is 0).
    pub fn health_pct(&self) -> f32 {
        if self.max_health > 0 {
            self.health as f32 / self.max_health as f32
        } else {
            0.0
        }
    }

    /// Refill health and shield and clear the dead flag.
    pub fn reset_to_full(&mut self) {
        self.health = self.max_health;
        self.shield = self.max_shield;
        self.dead = false;
    }

    /// Adopt caps recomputed by the stat block. Current values are clamped
    /// down when a cap shrinks; they are not raised when it grows.
    pub fn sync_caps(&mut self, derived: DerivedStats) {
        self.max_health = derived.max_health;
        self.health_regen = derived.health_regen;
        self.max_shield = derived.max_shield;
        self.health = self.health.clamp(0, self.max_health);
        self.shield = self.shield.clamp(0, self.max_shield);
    }

    /// Flag a live entity left without health as dead. Returns true only on
    /// the transition.
    pub fn settle_death(&mut self) -> bool {
        if self.dead || self.health > 0 {
            return false;
        }
        self.dead = true;
        true
    }

    /// One health regeneration tick. Returns the amount restored.
    pub fn regen_tick(&mut self) -> i32 {
        if self.dead || self.health >= self.max_health {
            return 0;
        }
        let before = self.health;
        self.health = (self.health + self.health_regen).min(self.max_health);
        self.health - before
    }

    /// Shield restore fires: refill unconditionally.
    pub fn restore_shield(&mut self) {
        if !self.dead {
            self.shield = self.max_shield;
        }
    }

    /// Validate invariants in debug builds.
    #[inline]
    pub fn debug_validate(&self) {
        debug_assert!(
            (0..=self.max_health).contains(&self.health),
            "health {} outside [0, {}]",
            self.health,
            self.max_health
        );
        debug_assert!(
            (0..=self.max_shield).contains(&self.shield),
            "shield {} outside [0, {}]",
            self.shield,
            self.max_shield
        );
        debug_assert!(!self.dead || self.health == 0, "dead entity with health {}", self.health);
    }
}

/// Recurring countdowns owned by the Resource Controller.
#[derive(Component, Clone, Debug)]
pub struct RegenTimers {
    pub health_regen: Timer,
    pub shield_restore: Timer,
}

impl Default for RegenTimers {
    fn default() -> Self {
        Self {
            health_regen: Timer::from_seconds(HEALTH_REGEN_INTERVAL, TimerMode::Repeating),
            shield_restore: Timer::from_seconds(SHIELD_RESTORE_DELAY, TimerMode::Repeating),
        }
    }
}

impl RegenTimers {
    /// Interrupt the shield restore and re-arm it from zero.
    pub fn rearm_shield(&mut self) {
        self.shield_restore.reset();
    }

    /// Advance both countdowns by `dt` seconds and apply whatever fired.
    pub fn tick(&mut self, dt: f32, vitals: &mut Vitals) -> RegenTick {
        let delta = Duration::from_secs_f32(dt.max(0.0));
        let mut result = RegenTick::default();

        self.health_regen.tick(delta);
        for _ in 0..self.health_regen.times_finished_this_tick() {
            result.health_restored += vitals.regen_tick();
        }

        self.shield_restore.tick(delta);
        if self.shield_restore.times_finished_this_tick() > 0 {
            let before = vitals.shield;
            vitals.restore_shield();
            result.shield_restored = vitals.shield != before;
        }

        result
    }
}

/// What a call to [`RegenTimers::tick`] changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegenTick {
    pub health_restored: i32,
    pub shield_restored: bool,
}

/// Per-source damage immunity windows.
///
/// A source that recently hit this entity cannot hit it again until its
/// window counts down to zero. Expired entries are pruned on tick.
#[derive(Component, Clone, Debug, Default)]
pub struct DamageWindows {
    timers: HashMap<Entity, f32>,
}

impl DamageWindows {
    pub fn can_take_damage_from(&self, source: Entity) -> bool {
        !self.timers.contains_key(&source)
    }

    /// Start (or overwrite) the window for `source`. Non-positive durations
    /// clear it.
    pub fn set_damage_timer(&mut self, source: Entity, duration_secs: f32) {
        if duration_secs > 0.0 {
            self.timers.insert(source, duration_secs);
        } else {
            self.timers.remove(&source);
        }
    }

    pub fn tick(&mut self, dt: f32) {
        for remaining in self.timers.values_mut() {
            *remaining -= dt;
        }
        self.timers.retain(|_, remaining| *remaining > 0.0);
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

/// Stagger from a hit's `stun_time`. Staggered units run no AI behavior.
#[derive(Component, Clone, Copy, Debug)]
pub struct Stagger {
    pub remaining: f32,
}

impl Stagger {
    /// Extend to `duration` if it is longer than what remains.
    pub fn extend(&mut self, duration: f32) {
        self.remaining = self.remaining.max(duration);
    }
}

/// Ult meter charged by taking damage.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct UltCharge {
    pub current: f32,
    pub max: f32,
}

impl Default for UltCharge {
    fn default() -> Self {
        Self {
            current: 0.0,
            max: ULT_CHARGE_MAX,
        }
    }
}

impl UltCharge {
    /// Charge from damage taken. Returns the amount gained.
    pub fn charge_from_injury(&mut self, damage: i32, rate: f32, banned: bool) -> f32 {
        if banned || damage <= 0 || rate <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + damage as f32 * rate).min(self.max);
        self.current - before
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}
