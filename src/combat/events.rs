//! Combat events
//!
//! Requests flowing into the core (damage, status application) and
//! notifications flowing out to presentation and scenario layers.

use bevy::prelude::*;

use super::status::{RemovalReason, StatusKind};

/// Request to damage an entity
#[derive(Event, Clone, Debug)]
pub struct DamageRequest {
    /// Entity dealing the damage (None for environmental damage)
    pub source: Option<Entity>,
    /// Entity receiving the damage
    pub target: Entity,
    /// Raw damage; negative values are clamped to zero
    pub amount: i32,
    /// Stagger duration in seconds (0.0 = none)
    pub stun_time: f32,
    /// If set, the same source cannot damage the target again for this long
    pub immunity_window: Option<f32>,
    /// Blow force added to the target's knockback velocity
    pub knockback: Vec3,
}

impl DamageRequest {
    pub fn new(target: Entity, amount: i32) -> Self {
        Self {
            source: None,
            target,
            amount,
            stun_time: 0.0,
            immunity_window: None,
            knockback: Vec3::ZERO,
        }
    }

    pub fn from_source(mut self, source: Entity) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_stun(mut self, stun_time: f32) -> Self {
        self.stun_time = stun_time;
        self
    }

    pub fn with_immunity_window(mut self, seconds: f32) -> Self {
        self.immunity_window = Some(seconds);
        self
    }

    pub fn with_knockback(mut self, impulse: Vec3) -> Self {
        self.knockback = impulse;
        self
    }
}

/// Fired after damage has been applied to an entity
#[derive(Event, Clone, Debug)]
pub struct DamageTaken {
    pub source: Option<Entity>,
    pub target: Entity,
    pub absorbed_by_shield: i32,
    pub health_lost: i32,
}

/// Fired exactly once when an entity dies
#[derive(Event, Clone, Debug)]
pub struct EntityDied {
    pub entity: Entity,
    /// Source of the killing blow, if known
    pub killer: Option<Entity>,
}

/// Request to apply a status from `StatusDefinitions` to an entity
#[derive(Event, Clone, Debug)]
pub struct ApplyStatus {
    pub target: Entity,
    pub kind: StatusKind,
}

/// Request to remove an active status early
#[derive(Event, Clone, Debug)]
pub struct DispelStatus {
    pub target: Entity,
    pub kind: StatusKind,
}

/// Fired when a status is applied, refreshed or stacked
#[derive(Event, Clone, Debug)]
pub struct StatusApplied {
    pub target: Entity,
    pub kind: StatusKind,
    pub duration: f32,
}

/// Fired when a status leaves the active set
#[derive(Event, Clone, Debug)]
pub struct StatusRemoved {
    pub target: Entity,
    pub kind: StatusKind,
    pub reason: RemovalReason,
}
