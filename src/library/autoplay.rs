//! Balance simulator for Infinite Library.
//!
//! A greedy player: every simulated second it clicks, lets production run,
//! then keeps buying whatever pays for itself fastest until nothing is
//! affordable. Used by the native binary to print balance numbers.

use std::fmt;

use crate::decimal::Decimal;
use crate::format::{format_number, format_time};

use super::logic;
use super::state::{Currency, LibraryState, SynergyMetric, UpgradeEffect};

/// What to purchase next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purchase {
    Generator(&'static str),
    Upgrade(&'static str),
}

/// Find the affordable purchase with the lowest payback time.
///
/// Upgrades paid in a prestige currency cost no glyphs and always win.
pub fn find_best_purchase(state: &LibraryState, clicks_per_sec: f64) -> Option<Purchase> {
    let mut best: Option<(f64, Purchase)> = None;
    let mut consider = |payback: f64, purchase: Purchase| {
        if best.as_ref().map_or(true, |(bp, _)| payback < *bp) {
            best = Some((payback, purchase));
        }
    };

    for g in state.generators.iter().filter(|g| g.unlocked) {
        if state.resources.glyphs < g.cost() {
            continue;
        }
        if let Some(payback) = state.payback_seconds(g.id) {
            consider(payback, Purchase::Generator(g.id));
        }
    }

    for def in state.available_upgrades() {
        if !state.can_afford_upgrade(def.id) {
            continue;
        }
        if def.currency != Currency::Glyphs {
            consider(0.0, Purchase::Upgrade(def.id));
            continue;
        }
        let gain = estimate_gain(state, &def.effect, clicks_per_sec);
        if gain > Decimal::ZERO {
            let payback = (Decimal::from(def.cost) / gain).to_f64();
            consider(payback, Purchase::Upgrade(def.id));
        }
    }

    best.map(|(_, p)| p)
}

/// Estimated glyphs per second an upgrade would add right now.
fn estimate_gain(state: &LibraryState, effect: &UpgradeEffect, clicks_per_sec: f64) -> Decimal {
    match *effect {
        UpgradeEffect::Click(factor) => {
            state.click_power() * Decimal::from(clicks_per_sec * (factor - 1.0))
        }
        UpgradeEffect::Global(factor) => state.total_production() * Decimal::from(factor - 1.0),
        UpgradeEffect::Generator {
            generator,
            multiplier,
        } => state.generator_production(generator) * Decimal::from(multiplier - 1.0),
        UpgradeEffect::Synergy {
            metric,
            coefficient,
        } => {
            let value = match metric {
                SynergyMetric::TotalGenerators => state.total_generators() as f64,
                SynergyMetric::GeneratorTypes => state.generator_types_owned() as f64,
            };
            // Relative to the current synergy product, ignoring compounding.
            let relative = coefficient * value / state.synergy_multiplier();
            state.total_production() * Decimal::from(relative)
        }
        UpgradeEffect::StartingGlyphs(_) => Decimal::ZERO,
    }
}

/// Snapshot of a finished run.
#[derive(Clone, Debug)]
pub struct AutoplayReport {
    pub seconds: u32,
    pub purchases: u32,
    pub glyphs: Decimal,
    pub production: Decimal,
    pub total_glyphs_earned: Decimal,
    pub total_clicks: u64,
    pub generators: Vec<(&'static str, u32)>,
    pub upgrades: Vec<&'static str>,
}

impl AutoplayReport {
    fn capture(state: &LibraryState, seconds: u32, purchases: u32) -> Self {
        Self {
            seconds,
            purchases,
            glyphs: state.resources.glyphs,
            production: state.total_production(),
            total_glyphs_earned: state.stats.total_glyphs_earned,
            total_clicks: state.stats.total_clicks,
            generators: state.generators.iter().map(|g| (g.id, g.owned)).collect(),
            upgrades: state.purchased_upgrades().iter().map(|u| u.id).collect(),
        }
    }
}

impl fmt::Display for AutoplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─── {} ─────────────────────────", format_time(self.seconds as f64))?;
        writeln!(
            f,
            "│ Glyphs: {}  /s: {}  Clicks: {}",
            format_number(self.glyphs, 0),
            format_number(self.production, 1),
            self.total_clicks
        )?;
        writeln!(
            f,
            "│ Lifetime: {}  Purchases: {}",
            format_number(self.total_glyphs_earned, 0),
            self.purchases
        )?;
        let owned: Vec<String> = self
            .generators
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(id, n)| format!("{id}:{n}"))
            .collect();
        writeln!(f, "│ Generators: {}", owned.join("  "))?;
        writeln!(f, "│ Upgrades: {}", self.upgrades.join(", "))?;
        write!(f, "└──────────────────────────────────────")
    }
}

/// Play `seconds` one-second steps with `clicks_per_sec` clicks each.
pub fn run(state: &mut LibraryState, seconds: u32, clicks_per_sec: u32) -> AutoplayReport {
    let mut purchases = 0;
    for _ in 0..seconds {
        for _ in 0..clicks_per_sec {
            logic::click(state);
        }
        logic::tick(state, 1.0);

        while let Some(purchase) = find_best_purchase(state, clicks_per_sec as f64) {
            let bought = match purchase {
                Purchase::Generator(id) => logic::buy_generator(state, id),
                Purchase::Upgrade(id) => logic::buy_upgrade(state, id),
            };
            if !bought {
                break;
            }
            purchases += 1;
        }
    }
    AutoplayReport::capture(state, seconds, purchases)
}
