//! Progress credited for time spent away from the game.

use log::info;

use crate::decimal::Decimal;
use crate::format::{format_number, format_time};

use super::logic::add_resource;
use super::state::LibraryState;

/// Fraction of live production earned while away.
pub const OFFLINE_EFFICIENCY: f64 = 0.5;

/// Glyphs produced over `seconds` away at the current rate, at reduced efficiency.
pub fn calculate_offline_progress(state: &LibraryState, seconds: f64) -> Decimal {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Decimal::ZERO;
    }
    state.total_production() * Decimal::from(seconds * OFFLINE_EFFICIENCY)
}

/// Credit the time elapsed since the last save, capped at `max_secs`. Returns the glyphs added.
///
/// A state that was never saved, or a clock that went backwards, earns nothing.
pub fn apply_offline_progress(state: &mut LibraryState, now_ms: i64, max_secs: f64) -> Decimal {
    let last_save = state.stats.last_save;
    if last_save <= 0 || now_ms <= last_save {
        return Decimal::ZERO;
    }
    let away = ((now_ms - last_save) as f64 / 1000.0).min(max_secs);
    let earned = calculate_offline_progress(state, away);
    if earned > Decimal::ZERO {
        add_resource(state, earned);
        info!(
            "offline for {}: +{} glyphs",
            format_time(away),
            format_number(earned, 0)
        );
    }
    earned
}
