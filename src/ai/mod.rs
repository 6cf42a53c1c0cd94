//! Unit AI
//!
//! Per-tick behavior selection for enemy units.
//!
//! ## Architecture
//!
//! The AI works in two phases, like a dispatch table:
//! 1. **Context Building**: `BehaviorContext` snapshots everything a behavior
//!    may look at (positions, ranges, health, capability flags)
//! 2. **Dispatch**: [`step_state_machine`] runs the current state's behavior
//!    from the unit's [`UnitBehavior`] and applies the shared rules
//!
//! The shared rules are fixed for every archetype:
//! - No target (or a staggered unit) means no behavior and no transition
//! - `Idle` moves to `Chase` once the target is closer than `detection_range`
//! - Rooted units produce no movement in any state
//! - Silenced units produce no attack actions
//!
//! Every other transition belongs to the archetype (see [`archetypes`]).

pub mod archetypes;
pub mod context;
pub mod systems;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::systems::CombatSystemPhase;

pub use archetypes::behavior_for;
pub use context::BehaviorContext;

/// Default distance under which an idle unit notices its target.
pub const DEFAULT_DETECTION_RANGE: f32 = 10.0;

/// Behavior state of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Chase,
    Attack,
    Retreat,
    Flee,
}

/// Behavior family of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Closes in and trades blows until one side drops
    #[default]
    Brawler,
    /// Strikes, then backs off out of reach before closing in again
    Skirmisher,
    /// Fights like a brawler but runs away when badly hurt
    Coward,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::Brawler, Archetype::Skirmisher, Archetype::Coward];

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Brawler => "Brawler",
            Archetype::Skirmisher => "Skirmisher",
            Archetype::Coward => "Coward",
        }
    }
}

/// AI state owned by a unit.
///
/// `target` is a weak reference: the AI never keeps its target alive and
/// treats a despawned or dead target the same as no target.
#[derive(Component, Clone, Debug)]
pub struct UnitAi {
    pub state: AiState,
    pub archetype: Archetype,
    pub target: Option<Entity>,
    pub detection_range: f32,
    /// Fallback when the unit's stat block has no `AttackRange`
    pub attack_range: f32,
    pub attack_damage: i32,
    /// Stagger applied to the target by each strike
    pub stun_time: f32,
    /// Blow force applied to the target by each strike
    pub knockback_force: f32,
    /// Where idle wandering is anchored
    pub home: Vec3,
    /// Seconds until the next strike is allowed
    pub attack_cooldown: f32,
}

impl UnitAi {
    pub fn new(archetype: Archetype) -> Self {
        Self {
            state: AiState::Idle,
            archetype,
            target: None,
            detection_range: DEFAULT_DETECTION_RANGE,
            attack_range: 1.5,
            attack_damage: 1,
            stun_time: 0.0,
            knockback_force: 0.0,
            home: Vec3::ZERO,
            attack_cooldown: 0.0,
        }
    }

    pub fn with_home(mut self, home: Vec3) -> Self {
        self.home = Vec3::new(home.x, home.y, 0.0);
        self
    }

    /// Back to a freshly spawned state; the target is dropped.
    pub fn reset(&mut self) {
        self.state = AiState::Idle;
        self.target = None;
        self.attack_cooldown = 0.0;
    }
}

/// Self-propelled movement chosen by the AI this tick.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity(pub Vec3);

/// Something the unit does to another entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AiAction {
    Strike { target: Entity, damage: i32 },
}

/// What a behavior decided for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorOutput {
    pub next_state: AiState,
    pub velocity: Vec3,
    pub action: Option<AiAction>,
}

impl BehaviorOutput {
    /// Stay in `state`, stand still, do nothing.
    pub fn hold(state: AiState) -> Self {
        Self {
            next_state: state,
            velocity: Vec3::ZERO,
            action: None,
        }
    }

    pub fn moving(state: AiState, velocity: Vec3) -> Self {
        Self {
            next_state: state,
            velocity,
            action: None,
        }
    }

    pub fn with_action(mut self, action: AiAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn transition(mut self, next_state: AiState) -> Self {
        self.next_state = next_state;
        self
    }
}

/// Behavior of one archetype, one method per state.
///
/// Each method returns the state to be in after this tick; returning a
/// different state is how a behavior owns its exits.
pub trait UnitBehavior: Send + Sync {
    fn idle(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        let to_home = ctx.home - ctx.position;
        if to_home.length() > ctx.attack_range.max(1.0) * 2.0 {
            // Drift back toward home before wandering again
            BehaviorOutput::moving(AiState::Idle, to_home.normalize_or_zero() * ctx.move_speed * 0.5)
        } else {
            BehaviorOutput::moving(AiState::Idle, ctx.wander * ctx.move_speed * 0.3)
        }
    }

    fn chase(&self, ctx: &BehaviorContext) -> BehaviorOutput;

    fn attack(&self, ctx: &BehaviorContext) -> BehaviorOutput;

    fn retreat(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        BehaviorOutput::moving(AiState::Retreat, ctx.direction_away() * ctx.move_speed)
            .transition(if ctx.distance >= ctx.attack_range * 2.0 {
                AiState::Chase
            } else {
                AiState::Retreat
            })
    }

    fn flee(&self, ctx: &BehaviorContext) -> BehaviorOutput {
        BehaviorOutput::moving(AiState::Flee, ctx.direction_away() * ctx.move_speed)
    }

    fn name(&self) -> &'static str;
}

/// Run one step of the state machine.
///
/// `ctx` is `None` when the unit has no live target: the step is a no-op.
pub fn step_state_machine(
    state: AiState,
    behavior: &dyn UnitBehavior,
    ctx: Option<&BehaviorContext>,
) -> BehaviorOutput {
    let Some(ctx) = ctx else {
        return BehaviorOutput::hold(state);
    };
    if ctx.staggered {
        return BehaviorOutput::hold(state);
    }

    let mut output = match state {
        AiState::Idle => {
            let mut output = behavior.idle(ctx);
            if ctx.in_detection_range() {
                output.next_state = AiState::Chase;
            }
            output
        }
        AiState::Chase => behavior.chase(ctx),
        AiState::Attack => behavior.attack(ctx),
        AiState::Retreat => behavior.retreat(ctx),
        AiState::Flee => behavior.flee(ctx),
    };

    if ctx.flags.rooted {
        output.velocity = Vec3::ZERO;
    }
    if ctx.flags.silenced {
        output.action = None;
    }
    output.velocity.z = 0.0;
    output
}

/// Plugin for unit AI. Requires [`crate::combat::CombatPlugin`].
pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<systems::GameRng>().add_systems(
            Update,
            (systems::decide_unit_actions, systems::apply_unit_movement)
                .chain()
                .in_set(CombatSystemPhase::Behavior),
        );
    }
}
