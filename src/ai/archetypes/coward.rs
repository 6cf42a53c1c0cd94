//! Coward AI Module
//!
//! Fights like a brawler until its health drops below [`FLEE_HEALTH_PCT`],
//! then runs. Once well outside detection range it calms down to `Idle`.

use super::{close_in, melee};
use crate::ai::{AiState, BehaviorContext, BehaviorOutput, UnitBehavior};

/// Health fraction under which the coward breaks off.
pub const FLEE_HEALTH_PCT: f32 = 0.3;

/// Coward AI implementation
pub struct CowardBehavior;

impl CowardBehavior {
    fn panicking(ctx: &BehaviorContext) -> bool {
        ctx.health_pct < FLEE_HEALTH_PCT
    }
}

impl UnitBehavior for CowardBehavior {
    fn chase(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        if Self::panicking(ctx) {
            return self.flee(ctx);
        }
        close_in(ctx)
    }

    fn attack(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        if Self::panicking(ctx) {
            return self.flee(ctx);
        }
        melee(ctx)
    }

    fn flee(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        if ctx.distance > ctx.detection_range * 1.5 {
            return BehaviorOutput::hold(AiState::Idle);
        }
        BehaviorOutput::moving(AiState::Flee, ctx.direction_away() * ctx.move_speed)
    }

    fn name(&self) -> &'static str {
        "Coward"
    }
}
