//! Brawler AI Module
//!
//! Walks up to the target and trades blows. Never retreats or flees on its
//! own; if something forces it into `Retreat` it backs off until twice its
//! reach and then closes in again.

use super::{close_in, melee};
use crate::ai::{BehaviorContext, BehaviorOutput, UnitBehavior};

/// Brawler AI implementation
pub struct BrawlerBehavior;

impl UnitBehavior for BrawlerBehavior {
    fn chase(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        close_in(ctx)
    }

    fn attack(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        melee(ctx)
    }

    fn name(&self) -> &'static str {
        "Brawler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::archetypes::test_support::ctx_at;
    use crate::ai::{AiAction, AiState};

    #[test]
    fn test_chase_to_attack_inside_reach() {
        let output = BrawlerBehavior.chase(&ctx_at(2.0));
        assert_eq!(output.next_state, AiState::Attack);
        assert_eq!(output.velocity.length(), 0.0);
    }

    #[test]
    fn test_attack_strikes_target() {
        let ctx = ctx_at(1.0);
        let output = BrawlerBehavior.attack(&ctx);
        assert_eq!(output.action, Some(AiAction::Strike { target: ctx.target, damage: 4 }));
        assert_eq!(output.next_state, AiState::Attack);
    }

    #[test]
    fn test_attack_to_chase_when_target_escapes() {
        let output = BrawlerBehavior.attack(&ctx_at(3.0));
        assert_eq!(output.next_state, AiState::Chase);
        assert_eq!(output.action, None);
    }

    #[test]
    fn test_retreat_then_reengage() {
        assert_eq!(BrawlerBehavior.retreat(&ctx_at(2.5)).next_state, AiState::Retreat);
        assert_eq!(BrawlerBehavior.retreat(&ctx_at(4.0)).next_state, AiState::Chase);
    }
}
