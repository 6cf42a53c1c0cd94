//! Skirmisher AI Module
//!
//! Hit and run: closes in, lands one strike, then retreats to twice its
//! reach before chasing again. Waits in `Attack` while the strike is on
//! cooldown.

use super::close_in;
use crate::ai::{AiState, BehaviorContext, BehaviorOutput, UnitBehavior};

/// Skirmisher AI implementation
pub struct SkirmisherBehavior;

impl UnitBehavior for SkirmisherBehavior {
    fn chase(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        close_in(ctx)
    }

    fn attack(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        if !ctx.in_attack_range() {
            return close_in(ctx);
        }
        match ctx.strike() {
            Some(strike) => BehaviorOutput::hold(AiState::Retreat).with_action(strike),
            None => BehaviorOutput::hold(AiState::Attack),
        }
    }

    fn name(&self) -> &'static str {
        "Skirmisher"
    }
}
