//! Per-tick snapshot handed to unit behaviors.

use bevy::prelude::*;

use super::AiAction;
use crate::combat::status::CapabilityFlags;

/// Read-only view of a unit and its target for one tick.
///
/// Built by the AI system from ECS state so behaviors never touch queries
/// and can be tested in isolation.
#[derive(Clone, Copy, Debug)]
pub struct BehaviorContext {
    pub target: Entity,
    pub position: Vec3,
    pub target_position: Vec3,
    pub home: Vec3,
    /// Planar distance to the target
    pub distance: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub move_speed: f32,
    /// Own health fraction (0.0 to 1.0)
    pub health_pct: f32,
    /// Attack cooldown has elapsed
    pub attack_ready: bool,
    pub attack_damage: i32,
    pub flags: CapabilityFlags,
    pub staggered: bool,
    /// Unit direction rolled for idle wandering this tick
    pub wander: Vec3,
}

impl BehaviorContext {
    /// Planar distance between two points.
    pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
        a.truncate().distance(b.truncate())
    }

    /// Unit vector toward the target (zero when on top of it).
    pub fn direction_to_target(&self) -> Vec3 {
        let delta = self.target_position - self.position;
        Vec3::new(delta.x, delta.y, 0.0).normalize_or_zero()
    }

    /// Unit vector away from the target.
    pub fn direction_away(&self) -> Vec3 {
        -self.direction_to_target()
    }

    pub fn in_attack_range(&self) -> bool {
        self.distance <= self.attack_range
    }

    pub fn in_detection_range(&self) -> bool {
        self.distance < self.detection_range
    }

    /// Strike the target if the cooldown allows it and the unit is not
    /// silenced.
    pub fn strike(&self) -> Option<AiAction> {
        (self.attack_ready && !self.flags.silenced).then_some(AiAction::Strike {
            target: self.target,
            damage: self.attack_damage,
        })
    }
}
