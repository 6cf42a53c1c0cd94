//! Knockback
//!
//! Blow-force velocity added by hits. It decays toward zero by a fixed amount
//! per tick on each axis, snaps to zero under a threshold, and keeps moving
//! the entity even while rooted. Movement is planar (z is always 0).

use bevy::prelude::*;

use super::constants::{KNOCKBACK_REDUCE_RATE, KNOCKBACK_STOP_THRESHOLD};
use super::vitals::Dead;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Knockback {
    pub velocity: Vec3,
    /// Speed removed per tick on each axis
    pub reduce_rate: f32,
    /// Axis speeds below this snap to zero
    pub stop_threshold: f32,
}

impl Default for Knockback {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            reduce_rate: KNOCKBACK_REDUCE_RATE,
            stop_threshold: KNOCKBACK_STOP_THRESHOLD,
        }
    }
}

impl Knockback {
    pub fn push(&mut self, impulse: Vec3) {
        self.velocity += Vec3::new(impulse.x, impulse.y, 0.0);
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec3::ZERO
    }

    /// One decay step.
    pub fn decay(&mut self) {
        let x = reduce_toward_zero(self.velocity.x, self.reduce_rate);
        let y = reduce_toward_zero(self.velocity.y, self.reduce_rate);
        self.velocity = Vec3::new(
            if x.abs() < self.stop_threshold { 0.0 } else { x },
            if y.abs() < self.stop_threshold { 0.0 } else { y },
            0.0,
        );
    }
}

fn reduce_toward_zero(speed: f32, rate: f32) -> f32 {
    if speed > 0.0 {
        (speed - rate).max(0.0)
    } else {
        (speed + rate).min(0.0)
    }
}

/// Move entities by their knockback velocity, then decay it.
pub fn apply_knockback(time: Res<Time>, mut query: Query<(&mut Transform, &mut Knockback), Without<Dead>>) {
    let dt = time.delta_secs();
    for (mut transform, mut knockback) in query.iter_mut() {
        if !knockback.is_moving() {
            continue;
        }
        transform.translation += knockback.velocity * dt;
        transform.translation.z = 0.0;
        knockback.decay();
    }
}
