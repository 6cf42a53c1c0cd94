//! Concrete unit behaviors
//!
//! Each archetype has its own module that implements [`UnitBehavior`].
//! The helpers here are the moves most archetypes share.

pub mod brawler;
pub mod coward;
pub mod skirmisher;

use super::{AiState, Archetype, BehaviorContext, BehaviorOutput, UnitBehavior};

/// Get the behavior implementation for an archetype.
pub fn behavior_for(archetype: Archetype) -> Box<dyn UnitBehavior> {
    match archetype {
        Archetype::Brawler => Box::new(brawler::BrawlerBehavior),
        Archetype::Skirmisher => Box::new(skirmisher::SkirmisherBehavior),
        Archetype::Coward => Box::new(coward::CowardBehavior),
    }
}

/// Run toward the target, switching to `Attack` once in reach.
pub fn close_in(ctx: &BehaviorContext) -> BehaviorOutput {
    if ctx.in_attack_range() {
        BehaviorOutput::hold(AiState::Attack)
    } else {
        BehaviorOutput::moving(AiState::Chase, ctx.direction_to_target() * ctx.move_speed)
    }
}

/// Stand and strike whenever the cooldown allows; chase again if the target
/// slipped out of reach.
pub fn melee(ctx: &BehaviorContext) -> BehaviorOutput {
    if !ctx.in_attack_range() {
        return BehaviorOutput::moving(AiState::Chase, ctx.direction_to_target() * ctx.move_speed);
    }
    let output = BehaviorOutput::hold(AiState::Attack);
    match ctx.strike() {
        Some(strike) => output.with_action(strike),
        None => output,
    }
}
