//! Status Effect Engine
//!
//! Manages timed effects on an entity. Each application instantiates a runtime
//! copy of an immutable [`StatusTemplate`], runs its apply hook (stat
//! modifiers and capability flags), counts its timer down every tick and runs
//! the matching expire hook exactly once when the timer reaches zero.
//!
//! ## Types
//! - `StatusKind`: identity of an effect; the active set is keyed by it
//! - `StatusTemplate`: author-time definition loaded from `statuses.ron`
//! - `ActiveStatus`: one application with its countdown and applied modifiers
//! - `ActiveStatuses`: component holding the active set
//! - `CapabilityFlags`: OR of rooted/silenced/invincible/ult-charge-banned
//!
//! ## Symmetry
//! The apply hook records every modifier it adds in the instance. Expiry
//! consumes the instance by value and removes exactly those records, so a
//! stat returns to its pre-apply value bit for bit and an instance cannot be
//! reverted twice.

pub mod config;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::stats::{DerivedStats, ModifierSource, StatBlock, StatKind};
use super::vitals::Vitals;

pub use config::{load_status_definitions, StatusConfigPlugin, StatusDefinitions};

/// Identity of a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Ult buff: bonus attack speed and attack range
    Overdrive,
    /// Bonus max health and regeneration
    Fortify,
    /// Stackable attack speed buff
    Frenzy,
    /// Cannot move
    Snare,
    /// Cannot attack or use abilities
    Silence,
    /// Ignores all incoming damage
    Invulnerability,
    /// Cannot gain ult charge
    Drained,
}

impl StatusKind {
    pub const ALL: [StatusKind; 7] = [
        StatusKind::Overdrive,
        StatusKind::Fortify,
        StatusKind::Frenzy,
        StatusKind::Snare,
        StatusKind::Silence,
        StatusKind::Invulnerability,
        StatusKind::Drained,
    ];
}

/// What happens when a kind that is already active is applied again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackPolicy {
    /// Restart the timer; magnitude unchanged
    #[default]
    Refresh,
    /// Keep the running instance untouched
    Ignore,
    /// Add another set of modifiers (up to `max_stacks`) and restart the timer
    Stack { max_stacks: u8 },
}

/// One additive stat modifier contributed by a status.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatKind,
    pub amount: f32,
}

/// Immutable definition of a status effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusTemplate {
    pub kind: StatusKind,
    /// Display name for logs
    pub name: String,
    /// Base duration in seconds
    pub duration: f32,
    #[serde(default)]
    pub roots: bool,
    #[serde(default)]
    pub bans_ult_charge: bool,
    #[serde(default)]
    pub invincible: bool,
    #[serde(default)]
    pub silences: bool,
    /// Scales every modifier amount at apply time
    #[serde(default = "default_rate")]
    pub power_rate: f32,
    /// Scales the duration at apply time
    #[serde(default = "default_rate")]
    pub duration_rate: f32,
    #[serde(default)]
    pub modifiers: Vec<StatModifier>,
    #[serde(default)]
    pub stacking: StackPolicy,
}

fn default_rate() -> f32 {
    1.0
}

impl StatusTemplate {
    /// Timer value a fresh application starts with. Never negative.
    pub fn initial_timer(&self) -> f32 {
        (self.duration * self.duration_rate).max(0.0)
    }

    pub fn flags(&self) -> CapabilityFlags {
        CapabilityFlags {
            rooted: self.roots,
            silenced: self.silences,
            invincible: self.invincible,
            ult_charge_banned: self.bans_ult_charge,
        }
    }
}

/// Combat-state gates aggregated over every active status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
    pub rooted: bool,
    pub silenced: bool,
    pub invincible: bool,
    pub ult_charge_banned: bool,
}

impl std::ops::BitOr for CapabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            rooted: self.rooted || rhs.rooted,
            silenced: self.silenced || rhs.silenced,
            invincible: self.invincible || rhs.invincible,
            ult_charge_banned: self.ult_charge_banned || rhs.ult_charge_banned,
        }
    }
}

/// A single application of a status on an entity.
#[derive(Clone, Debug)]
pub struct ActiveStatus {
    template: StatusTemplate,
    /// Seconds until expiry
    pub timer: f32,
    stacks: u8,
    applied: SmallVec<[StatModifier; 4]>,
}

impl ActiveStatus {
    pub fn kind(&self) -> StatusKind {
        self.template.kind
    }

    pub fn template(&self) -> &StatusTemplate {
        &self.template
    }

    pub fn stacks(&self) -> u8 {
        self.stacks
    }

    pub fn is_expired(&self) -> bool {
        self.timer <= 0.0
    }

    /// Modifiers currently contributed to the stat block.
    pub fn applied_modifiers(&self) -> &[StatModifier] {
        &self.applied
    }

    fn new(template: &StatusTemplate) -> Self {
        Self {
            timer: template.initial_timer(),
            template: template.clone(),
            stacks: 0,
            applied: SmallVec::new(),
        }
    }

    /// Apply one stack of modifiers.
    fn on_apply(&mut self, stats: &mut StatBlock) -> DerivedStats {
        let source = ModifierSource::Status(self.template.kind);
        let mut derived = stats.derived();
        for modifier in &self.template.modifiers {
            let amount = modifier.amount * self.template.power_rate;
            derived = stats.add_modifier(modifier.stat, source, amount);
            self.applied.push(StatModifier { stat: modifier.stat, amount });
        }
        self.stacks += 1;
        derived
    }

    /// Revert exactly what `on_apply` added. Consumes the instance.
    fn on_expire(self, stats: &mut StatBlock) -> DerivedStats {
        let source = ModifierSource::Status(self.template.kind);
        for modifier in &self.applied {
            let removed = stats.remove_modifier(modifier.stat, source, modifier.amount);
            debug_assert!(removed, "status {:?} reverted a modifier it never applied", self.template.kind);
        }
        stats.derived()
    }
}

/// Result of [`ActiveStatuses::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Refreshed,
    Stacked { stacks: u8 },
    Ignored,
}

/// Why a status left the active set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    Expired,
    Dispelled,
}

/// Active status effects on an entity, keyed by kind.
#[derive(Component, Clone, Debug, Default)]
pub struct ActiveStatuses {
    active: SmallVec<[ActiveStatus; 4]>,
}

impl ActiveStatuses {
    pub fn iter(&self) -> impl Iterator<Item = &ActiveStatus> {
        self.active.iter()
    }

    pub fn get(&self, kind: StatusKind) -> Option<&ActiveStatus> {
        self.active.iter().find(|s| s.kind() == kind)
    }

    pub fn contains(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Logical OR of every active status's flags.
    pub fn flags(&self) -> CapabilityFlags {
        self.active
            .iter()
            .fold(CapabilityFlags::default(), |acc, s| acc | s.template.flags())
    }

    /// Apply `template`, honoring its stack policy. Derived stats are pushed
    /// into `vitals` before returning.
    pub fn apply(&mut self, template: &StatusTemplate, stats: &mut StatBlock, vitals: &mut Vitals) -> ApplyOutcome {
        if let Some(existing) = self.active.iter_mut().find(|s| s.kind() == template.kind) {
            return match template.stacking {
                StackPolicy::Ignore => ApplyOutcome::Ignored,
                StackPolicy::Refresh => {
                    existing.timer = template.initial_timer();
                    ApplyOutcome::Refreshed
                }
                StackPolicy::Stack { max_stacks } => {
                    existing.timer = template.initial_timer();
                    if existing.stacks >= max_stacks {
                        ApplyOutcome::Refreshed
                    } else {
                        vitals.sync_caps(existing.on_apply(stats));
                        ApplyOutcome::Stacked { stacks: existing.stacks }
                    }
                }
            };
        }

        let mut status = ActiveStatus::new(template);
        vitals.sync_caps(status.on_apply(stats));
        self.active.push(status);
        ApplyOutcome::Applied
    }

    /// Count every timer down by `dt` and expire the ones that reach zero.
    /// Returns the kinds that expired this tick.
    pub fn tick(&mut self, dt: f32, stats: &mut StatBlock, vitals: &mut Vitals) -> SmallVec<[StatusKind; 2]> {
        let dt = dt.max(0.0);
        for status in self.active.iter_mut() {
            status.timer -= dt;
        }

        let mut expired = SmallVec::new();
        let mut index = 0;
        while index < self.active.len() {
            if self.active[index].is_expired() {
                let status = self.active.remove(index);
                expired.push(status.kind());
                vitals.sync_caps(status.on_expire(stats));
            } else {
                index += 1;
            }
        }
        expired
    }

    /// Remove a status before it expires, reverting its contributions.
    pub fn remove(&mut self, kind: StatusKind, stats: &mut StatBlock, vitals: &mut Vitals) -> bool {
        let Some(index) = self.active.iter().position(|s| s.kind() == kind) else {
            return false;
        };
        let status = self.active.remove(index);
        vitals.sync_caps(status.on_expire(stats));
        true
    }

    /// Remove everything (used on reactivation).
    pub fn clear(&mut self, stats: &mut StatBlock, vitals: &mut Vitals) {
        for status in self.active.drain(..) {
            vitals.sync_caps(status.on_expire(stats));
        }
    }
}
