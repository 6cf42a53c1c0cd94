//! Combat logging
//!
//! Records combat events for post-run analysis. The headless runner attaches
//! the entries to the scenario result it saves as JSON.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Timestamp in simulation time (seconds since start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Status effect applied, refreshed or stacked
    StatusApplied,
    /// Status effect expired or dispelled
    StatusRemoved,
    /// AI changed state
    AiTransition,
    /// Entity died
    Death,
    /// Scenario event (start, end, etc.)
    MatchEvent,
}

/// The combat log resource storing all events
#[derive(Resource, Default, Debug, Clone, Serialize, Deserialize)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current simulation time
    pub sim_time: f32,
}

impl CombatLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sim_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.sim_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Count entries of one type
    pub fn count(&self, event_type: CombatLogEventType) -> usize {
        self.entries.iter().filter(|e| e.event_type == event_type).count()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }
}

/// Advance the log clock.
pub fn advance_combat_log_clock(time: Res<Time>, mut combat_log: ResMut<CombatLog>) {
    combat_log.sim_time += time.delta_secs();
}

/// Name used in log messages: the entity's `Name`, or its id.
pub fn display_name(name: Option<&Name>, entity: Entity) -> String {
    match name {
        Some(name) => name.as_str().to_string(),
        None => format!("{}", entity),
    }
}
