//! Combat system
//!
//! Implements the per-entity combat core:
//! - Stat blocks with per-source modifiers and derived caps
//! - Health and shield (regeneration, shield restore, overflow, death)
//! - Timed status effects and the capability flags they grant
//! - Knockback, stagger and ult charge
//! - Combat logging

use bevy::prelude::*;

pub mod constants;
pub mod damage;
pub mod error;
pub mod events;
pub mod knockback;
pub mod log;
pub mod stats;
pub mod status;
pub mod systems;
pub mod vitals;

use events::*;

/// Plugin for the combat core.
///
/// Status templates are not loaded here; add [`status::StatusConfigPlugin`]
/// or insert a [`status::StatusDefinitions`] resource directly.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Combat events
            .add_event::<DamageRequest>()
            .add_event::<DamageTaken>()
            .add_event::<EntityDied>()
            .add_event::<ApplyStatus>()
            .add_event::<DispelStatus>()
            .add_event::<StatusApplied>()
            .add_event::<StatusRemoved>()
            // Resources
            .init_resource::<log::CombatLog>();

        systems::configure_combat_system_ordering(app);
        systems::add_core_combat_systems(app);
    }
}
