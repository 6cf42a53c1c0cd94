//! Data-Driven Status Configuration
//!
//! Status templates are authored in `assets/config/statuses.ron` and loaded
//! once at startup. Loading validates every template so the simulation can
//! treat them as trusted, immutable records afterwards.
//!
//! ## Usage
//! ```ignore
//! fn my_system(statuses: Res<StatusDefinitions>) {
//!     let snare = statuses.get(StatusKind::Snare).unwrap();
//!     println!("Snare lasts {}s", snare.initial_timer());
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{StackPolicy, StatusKind, StatusTemplate};
use crate::combat::error::ConfigError;

/// Default location of the status definitions file.
pub const DEFAULT_STATUS_CONFIG: &str = "assets/config/statuses.ron";

/// Root structure of the statuses.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusesConfig {
    pub statuses: Vec<StatusTemplate>,
}

/// Resource containing every status template, keyed by kind.
#[derive(Resource, Debug, Clone)]
pub struct StatusDefinitions {
    definitions: HashMap<StatusKind, StatusTemplate>,
}

impl StatusDefinitions {
    /// Build from parsed config, validating each template.
    pub fn new(config: StatusesConfig) -> Result<Self, ConfigError> {
        let mut definitions = HashMap::new();
        for template in config.statuses {
            validate_template(&template)?;
            if definitions.insert(template.kind, template.clone()).is_some() {
                return Err(ConfigError::InvalidStatus {
                    kind: template.kind,
                    reason: "defined more than once".to_string(),
                });
            }
        }

        let definitions = Self { definitions };
        definitions.validate()?;
        Ok(definitions)
    }

    /// Parse definitions from RON text.
    pub fn from_ron_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: StatusesConfig = ron::from_str(contents).map_err(|source| ConfigError::Ron {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::new(config)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusTemplate> {
        self.definitions.get(&kind)
    }

    /// Check that every known kind has a template.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<StatusKind> = StatusKind::ALL
            .into_iter()
            .filter(|kind| !self.definitions.contains_key(kind))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingStatuses(missing))
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = &StatusKind> {
        self.definitions.keys()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn validate_template(template: &StatusTemplate) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidStatus {
        kind: template.kind,
        reason: reason.to_string(),
    };

    if !(template.duration >= 0.0) {
        return Err(invalid("duration must be non-negative"));
    }
    if !(template.duration_rate > 0.0) {
        return Err(invalid("duration_rate must be positive"));
    }
    if !(template.power_rate > 0.0) {
        return Err(invalid("power_rate must be positive"));
    }
    if template.modifiers.iter().any(|m| !m.amount.is_finite()) {
        return Err(invalid("modifier amounts must be finite"));
    }
    if let StackPolicy::Stack { max_stacks: 0 } = template.stacking {
        return Err(invalid("max_stacks must be at least 1"));
    }
    Ok(())
}

/// Load status definitions from a RON file.
pub fn load_status_definitions(path: impl AsRef<Path>) -> Result<StatusDefinitions, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let definitions = StatusDefinitions::from_ron_str(&contents, path)?;
    info!("Loaded {} status definitions from {}", definitions.len(), path.display());
    Ok(definitions)
}

/// Bevy plugin that loads status definitions at startup.
pub struct StatusConfigPlugin {
    pub path: PathBuf,
}

impl Default for StatusConfigPlugin {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATUS_CONFIG),
        }
    }
}

impl Plugin for StatusConfigPlugin {
    fn build(&self, app: &mut App) {
        match load_status_definitions(&self.path) {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                // A simulation without valid templates cannot apply any status
                panic!("Failed to load status definitions: {}", e);
            }
        }
    }
}
