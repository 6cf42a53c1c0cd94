//! Combat tuning constants.

/// Seconds between health regeneration ticks.
pub const HEALTH_REGEN_INTERVAL: f32 = 1.0;

/// Seconds without taking damage before the shield is restored to full.
pub const SHIELD_RESTORE_DELAY: f32 = 3.0;

/// Default per-source damage immunity window applied by AI strikes (seconds).
pub const DEFAULT_HIT_IMMUNITY: f32 = 0.5;

/// Knockback speed lost per tick on each axis.
pub const KNOCKBACK_REDUCE_RATE: f32 = 0.1;

/// Knockback components below this magnitude snap to zero.
pub const KNOCKBACK_STOP_THRESHOLD: f32 = 0.5;

/// Ult charge meter capacity.
pub const ULT_CHARGE_MAX: f32 = 100.0;
