//! Stat Block
//!
//! Holds a unit's base combat attributes and the additive modifiers that
//! status effects contribute to them. Derived values (the integer resource
//! caps consumed by [`Vitals`](super::vitals::Vitals)) are recomputed
//! synchronously by every mutator, so they are never stale.
//!
//! Modifiers are stored per source rather than folded into a running total.
//! Removing a source drops its entries and the stat is re-summed from the
//! base, which makes apply/revert an exact round trip even for values that
//! do not survive `a + b - b` in floating point.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

use super::status::StatusKind;

/// Combat attributes tracked by the stat block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Health cap (rounded to an integer for [`Vitals`](super::vitals::Vitals))
    MaxHealth,
    /// Health restored per regeneration tick
    HealthRegen,
    /// Shield cap
    MaxShield,
    /// Attacks per second
    AttackSpeed,
    /// Distance at which a unit can strike
    AttackRange,
    /// Units per second
    MovementSpeed,
    /// Ult charge gained per point of damage taken
    InjuryChargeRate,
}

impl StatKind {
    pub const ALL: [StatKind; 7] = [
        StatKind::MaxHealth,
        StatKind::HealthRegen,
        StatKind::MaxShield,
        StatKind::AttackSpeed,
        StatKind::AttackRange,
        StatKind::MovementSpeed,
        StatKind::InjuryChargeRate,
    ];
}

/// Identity of whoever contributed a modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModifierSource {
    Status(StatusKind),
}

#[derive(Clone, Debug, Default)]
struct StatEntry {
    base: f32,
    modifiers: SmallVec<[(ModifierSource, f32); 2]>,
    value: f32,
}

impl StatEntry {
    fn resum(&mut self) {
        self.value = self.base + self.modifiers.iter().map(|(_, amount)| amount).sum::<f32>();
    }
}

/// Values derived from the stat entries, recomputed on every change.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DerivedStats {
    pub max_health: i32,
    pub health_regen: i32,
    pub max_shield: i32,
}

/// Per-entity stat block.
#[derive(Component, Clone, Debug, Default)]
pub struct StatBlock {
    entries: HashMap<StatKind, StatEntry>,
    derived: DerivedStats,
}

impl StatBlock {
    /// Build a stat block from base values. Stats not listed default to 0.
    pub fn from_bases(bases: impl IntoIterator<Item = (StatKind, f32)>) -> Self {
        let mut block = Self::default();
        for (stat, base) in bases {
            let entry = block.entries.entry(stat).or_default();
            entry.base = base;
            entry.resum();
        }
        block.recompute();
        block
    }

    /// Current value of a stat (base plus all active modifiers).
    pub fn value(&self, stat: StatKind) -> f32 {
        self.entries.get(&stat).map_or(0.0, |e| e.value)
    }

    pub fn base(&self, stat: StatKind) -> f32 {
        self.entries.get(&stat).map_or(0.0, |e| e.base)
    }

    /// Sum of active modifiers on a stat.
    pub fn modifier_total(&self, stat: StatKind) -> f32 {
        self.entries
            .get(&stat)
            .map_or(0.0, |e| e.modifiers.iter().map(|(_, amount)| amount).sum())
    }

    pub fn has_stat(&self, stat: StatKind) -> bool {
        self.entries.contains_key(&stat)
    }

    pub fn derived(&self) -> DerivedStats {
        self.derived
    }

    pub fn set_base(&mut self, stat: StatKind, base: f32) -> DerivedStats {
        let entry = self.entries.entry(stat).or_default();
        entry.base = base;
        entry.resum();
        self.recompute()
    }

    /// Add an additive modifier and recompute derived values.
    pub fn add_modifier(&mut self, stat: StatKind, source: ModifierSource, amount: f32) -> DerivedStats {
        let entry = self.entries.entry(stat).or_default();
        entry.modifiers.push((source, amount));
        entry.resum();
        self.recompute()
    }

    /// Remove every modifier `source` contributed to `stat`.
    /// Returns the number of modifier entries removed.
    pub fn remove_modifiers(&mut self, stat: StatKind, source: ModifierSource) -> usize {
        let Some(entry) = self.entries.get_mut(&stat) else {
            return 0;
        };
        let before = entry.modifiers.len();
        entry.modifiers.retain(|(s, _)| *s != source);
        let removed = before - entry.modifiers.len();
        if removed > 0 {
            entry.resum();
            self.recompute();
        }
        removed
    }

    /// Remove one modifier entry matching `source` and `amount` exactly.
    pub fn remove_modifier(&mut self, stat: StatKind, source: ModifierSource, amount: f32) -> bool {
        let Some(entry) = self.entries.get_mut(&stat) else {
            return false;
        };
        let Some(index) = entry
            .modifiers
            .iter()
            .position(|(s, a)| *s == source && a.to_bits() == amount.to_bits())
        else {
            return false;
        };
        entry.modifiers.remove(index);
        entry.resum();
        self.recompute();
        true
    }

    /// Recompute derived values from the current entries.
    pub fn recompute(&mut self) -> DerivedStats {
        self.derived = DerivedStats {
            max_health: round_non_negative(self.value(StatKind::MaxHealth)),
            health_regen: round_non_negative(self.value(StatKind::HealthRegen)),
            max_shield: round_non_negative(self.value(StatKind::MaxShield)),
        };
        self.derived
    }
}

fn round_non_negative(value: f32) -> i32 {
    value.round().max(0.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASTE: ModifierSource = ModifierSource::Status(StatusKind::Overdrive);
    const FORTIFY: ModifierSource = ModifierSource::Status(StatusKind::Fortify);

    fn block() -> StatBlock {
        StatBlock::from_bases([
            (StatKind::MaxHealth, 100.0),
            (StatKind::HealthRegen, 2.0),
            (StatKind::AttackSpeed, 1.1),
            (StatKind::AttackRange, 3.0),
        ])
    }

    #[test]
    fn test_derived_values_from_bases() {
        let stats = block();
        assert_eq!(stats.derived().max_health, 100);
        assert_eq!(stats.derived().health_regen, 2);
        assert_eq!(stats.derived().max_shield, 0);
    }

    #[test]
    fn test_add_modifier_recomputes_immediately() {
        let mut stats = block();
        let derived = stats.add_modifier(StatKind::MaxHealth, FORTIFY, 24.6);
        assert_eq!(derived.max_health, 125, "124.6 rounds to 125");
        assert_eq!(stats.derived().max_health, 125);
    }

    #[test]
    fn test_remove_modifiers_restores_exact_value() {
        let mut stats = block();
        let before = stats.value(StatKind::AttackSpeed);

        stats.add_modifier(StatKind::AttackSpeed, HASTE, 0.2);
        assert!(stats.value(StatKind::AttackSpeed) > before);
        assert_eq!(stats.remove_modifiers(StatKind::AttackSpeed, HASTE), 1);

        assert_eq!(stats.value(StatKind::AttackSpeed).to_bits(), before.to_bits());
    }

    #[test]
    fn test_sources_are_independent() {
        let mut stats = block();
        stats.add_modifier(StatKind::AttackRange, HASTE, 1.5);
        stats.add_modifier(StatKind::AttackRange, FORTIFY, 0.5);
        assert_eq!(stats.value(StatKind::AttackRange), 5.0);

        stats.remove_modifiers(StatKind::AttackRange, HASTE);
        assert_eq!(stats.value(StatKind::AttackRange), 3.5);
        assert_eq!(stats.modifier_total(StatKind::AttackRange), 0.5);
    }

    #[test]
    fn test_remove_single_modifier_keeps_other_stacks() {
        let mut stats = block();
        stats.add_modifier(StatKind::AttackSpeed, HASTE, 0.25);
        stats.add_modifier(StatKind::AttackSpeed, HASTE, 0.25);
        assert!(stats.remove_modifier(StatKind::AttackSpeed, HASTE, 0.25));
        assert_eq!(stats.modifier_total(StatKind::AttackSpeed), 0.25);
        assert!(!stats.remove_modifier(StatKind::AttackSpeed, FORTIFY, 0.25));
    }

    #[test]
    fn test_negative_stat_clamps_derived_cap_to_zero() {
        let mut stats = block();
        let derived = stats.add_modifier(StatKind::MaxHealth, FORTIFY, -150.0);
        assert_eq!(derived.max_health, 0);
        assert_eq!(stats.value(StatKind::MaxHealth), -50.0);
    }

    #[test]
    fn test_unknown_stat_reads_zero() {
        let stats = block();
        assert_eq!(stats.value(StatKind::InjuryChargeRate), 0.0);
        assert!(!stats.has_stat(StatKind::MovementSpeed));
    }
}
