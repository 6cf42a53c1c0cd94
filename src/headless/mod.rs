//! Headless mode for scripted scenarios
//!
//! Runs a player target against AI units without any graphical output,
//! suitable for automated testing and balancing.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --scenario demos/ambush.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "player": { "name": "Player", "position": [0.0, 0.0] },
//!   "units": [
//!     { "name": "Grunt", "archetype": "Brawler", "position": [8.0, 0.0] }
//!   ],
//!   "script": [
//!     { "at": 2.0, "target": "Player", "action": "apply_status", "status": "Invulnerability" }
//!   ],
//!   "max_duration_secs": 60,
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;
pub mod world;

pub use config::ScenarioConfig;
pub use runner::{run_scenario, ScenarioOutcome, ScenarioResult};
pub use world::Player;
