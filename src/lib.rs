//! Skirmish - per-entity combat simulation core
//!
//! Health and shield resources, timed status effects with capability flags,
//! stat blocks and a distance-driven AI state machine, built as Bevy plugins.
//! A headless runner drives scripted scenarios for testing and balancing.
//!
//! This library exposes the core modules for testing and reuse.

pub mod ai;
pub mod cli;
pub mod combat;
pub mod headless;
pub mod spawn;

// Re-export commonly used types
pub use ai::{AiPlugin, AiState, Archetype, UnitAi};
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::status::{StatusConfigPlugin, StatusDefinitions, StatusKind};
pub use combat::CombatPlugin;
pub use headless::{run_scenario, ScenarioConfig, ScenarioResult};
