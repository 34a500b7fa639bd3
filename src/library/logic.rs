//! Infinite Library game logic — pure functions over `LibraryState`, fully testable.
//!
//! Every transition runs to completion before returning, and rejected actions
//! (unaffordable, locked, unknown id) leave the state untouched and return
//! `false`.

use log::{debug, info};

use crate::decimal::Decimal;

use super::state::{
    Currency, LibraryState, Multipliers, UpgradeEffect, GENERATOR_REVEAL_RATIO,
};

/// Credit glyphs from any source (clicks, production, notes). Negative or non-finite amounts are ignored.
pub fn add_resource(state: &mut LibraryState, amount: Decimal) {
    if amount.is_negative() || amount.is_nan() || !amount.is_finite() {
        return;
    }
    state.resources.glyphs += amount;
    state.stats.total_glyphs_earned += amount;
    state.stats.glyphs_earned_this_run += amount;
    refresh_unlocks(state);
}

/// Manual click: one glyph scaled by the click multiplier.
pub fn click(state: &mut LibraryState) {
    let power = state.click_power();
    add_resource(state, power);
    state.stats.total_clicks += 1;
}

/// Try to buy one unit of a generator. Returns true if successful.
pub fn buy_generator(state: &mut LibraryState, id: &str) -> bool {
    let idx = match state.generators.iter().position(|g| g.id == id) {
        Some(i) => i,
        None => return false,
    };

    let cost = state.generators[idx].cost();
    if !state.resources.try_spend(Currency::Glyphs, cost) {
        return false;
    }
    let generator = &mut state.generators[idx];
    generator.owned += 1;
    generator.unlocked = true;
    debug!("bought {} ({} owned)", generator.id, generator.owned);

    refresh_unlocks(state);
    true
}

/// Try to buy an upgrade by id. Returns true if successful.
pub fn buy_upgrade(state: &mut LibraryState, id: &str) -> bool {
    let def = match state.upgrade_def(id) {
        Some(def) => def,
        None => return false,
    };
    if state.is_upgrade_purchased(id) || !state.is_upgrade_unlocked(id) {
        return false;
    }
    if !state.resources.try_spend(def.currency, Decimal::from(def.cost)) {
        return false;
    }

    if let Some(upgrade) = state.upgrades.iter_mut().find(|u| u.id == id) {
        upgrade.purchased = true;
        upgrade.unlocked = true;
    }
    recalculate_multipliers(state);
    debug!("upgrade {} purchased", def.id);
    true
}

/// Rebuild the multiplier cache from the purchased upgrades.
///
/// Click, global and per-generator multipliers compound; starting-glyph
/// bonuses add up. Synergy is left out: it depends on live generator counts
/// and is evaluated by `LibraryState::synergy_multiplier`.
pub fn recalculate_multipliers(state: &mut LibraryState) {
    let mut multipliers = Multipliers::default();
    let purchased = state
        .catalog
        .upgrades
        .iter()
        .filter(|def| state.is_upgrade_purchased(def.id));

    for def in purchased {
        match def.effect {
            UpgradeEffect::Click(factor) => multipliers.click *= factor,
            UpgradeEffect::Global(factor) => multipliers.global *= factor,
            UpgradeEffect::Generator {
                generator,
                multiplier,
            } => *multipliers.generators.entry(generator).or_insert(1.0) *= multiplier,
            UpgradeEffect::Synergy { .. } => {}
            UpgradeEffect::StartingGlyphs(amount) => {
                multipliers.starting_glyphs += Decimal::from(amount)
            }
        }
    }
    state.multipliers = multipliers;
}

/// Perform a prestige reset on `layer_id`. Returns the currency gained (zero if refused).
///
/// Glyphs drop to the starting bonus and every generator starts over, but
/// purchased upgrades and lifetime statistics survive.
pub fn prestige(state: &mut LibraryState, layer_id: &str) -> Decimal {
    if !state.can_prestige(layer_id) {
        return Decimal::ZERO;
    }
    let gain = state.prestige_gain(layer_id);
    let layer = match state.prestige_layers.iter_mut().find(|l| l.id == layer_id) {
        Some(l) => l,
        None => return Decimal::ZERO,
    };
    layer.times_reset += 1;
    let (currency, times_reset) = (layer.currency, layer.times_reset);

    *state.resources.get_mut(currency) += gain;

    let starting = state.multipliers.starting_glyphs;
    state.resources.glyphs = starting;
    state.generators = LibraryState::create_generators(&state.catalog);
    state.stats.glyphs_earned_this_run = starting;
    state.stats.total_glyphs_earned += starting;
    refresh_unlocks(state);

    info!(
        "prestige on {}: +{} {} (reset #{})",
        layer_id,
        gain,
        currency.name(),
        times_reset
    );
    gain
}

/// Advance the simulation by `delta_secs` seconds of production.
pub fn tick(state: &mut LibraryState, delta_secs: f64) {
    let dt = if delta_secs.is_finite() {
        delta_secs.max(0.0)
    } else {
        0.0
    };
    let earned = state.total_production() * Decimal::from(dt);
    if earned > Decimal::ZERO {
        add_resource(state, earned);
    }
    state.stats.play_time += dt;
}

/// Hard restart: everything back to the catalog's initial configuration.
pub fn reset(state: &mut LibraryState) {
    *state = LibraryState::with_catalog(state.catalog);
    info!("game reset");
}

/// Latch unlock flags whose conditions now hold.
///
/// Generators are revealed once this run has earned half their base cost;
/// upgrades once their unlock condition is met. Flags never clear except on
/// hard reset (generators also re-lock on prestige).
pub fn refresh_unlocks(state: &mut LibraryState) {
    let earned = state.stats.glyphs_earned_this_run;
    let ratio = Decimal::from(GENERATOR_REVEAL_RATIO);
    for g in &mut state.generators {
        if !g.unlocked && (g.owned > 0 || earned >= g.base_cost * ratio) {
            g.unlocked = true;
        }
    }

    for i in 0..state.upgrades.len() {
        if state.upgrades[i].unlocked {
            continue;
        }
        let met = state
            .upgrade_def(state.upgrades[i].id)
            .is_some_and(|def| state.condition_met(&def.unlock));
        if met {
            state.upgrades[i].unlocked = true;
        }
    }
}
