//! Infinite Library game state definitions.

use std::collections::HashMap;

use crate::decimal::Decimal;

use super::data::Catalog;

/// Fraction of a generator's base cost this run must have earned before it is revealed.
pub const GENERATOR_REVEAL_RATIO: f64 = 0.5;

/// The four tracked resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    Glyphs,
    Vocables,
    Fragments,
    Codex,
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[
            Currency::Glyphs,
            Currency::Vocables,
            Currency::Fragments,
            Currency::Codex,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Glyphs => "glyphs",
            Currency::Vocables => "vocables",
            Currency::Fragments => "fragments",
            Currency::Codex => "codex",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Currency::Glyphs => "✒️",
            Currency::Vocables => "📖",
            Currency::Fragments => "📜",
            Currency::Codex => "📕",
        }
    }
}

/// Resource balances. Never negative: spends are checked before deduction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resources {
    pub glyphs: Decimal,
    pub vocables: Decimal,
    pub fragments: Decimal,
    pub codex: Decimal,
}

impl Resources {
    pub fn get(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Glyphs => self.glyphs,
            Currency::Vocables => self.vocables,
            Currency::Fragments => self.fragments,
            Currency::Codex => self.codex,
        }
    }

    pub fn get_mut(&mut self, currency: Currency) -> &mut Decimal {
        match currency {
            Currency::Glyphs => &mut self.glyphs,
            Currency::Vocables => &mut self.vocables,
            Currency::Fragments => &mut self.fragments,
            Currency::Codex => &mut self.codex,
        }
    }

    /// Deduct `cost` if affordable. Returns false (and changes nothing) otherwise.
    pub fn try_spend(&mut self, currency: Currency, cost: Decimal) -> bool {
        let balance = self.get_mut(currency);
        if *balance >= cost {
            *balance = (*balance - cost).max(Decimal::ZERO);
            true
        } else {
            false
        }
    }
}

// ── Static definitions ──────────────────────────────────────────

/// Immutable generator blueprint.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub base_cost: f64,
    /// Glyphs per second per unit.
    pub base_production: f64,
    /// Cost growth per owned unit (> 1).
    pub cost_multiplier: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeCategory {
    Click,
    Generator,
    Global,
    Synergy,
    Prestige,
}

impl UpgradeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeCategory::Click => "Clic",
            UpgradeCategory::Generator => "Générateurs",
            UpgradeCategory::Global => "Global",
            UpgradeCategory::Synergy => "Synergie",
            UpgradeCategory::Prestige => "Prestige",
        }
    }
}

/// What a synergy upgrade scales with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynergyMetric {
    /// Sum of owned units across every generator.
    TotalGenerators,
    /// Number of generators with at least one unit.
    GeneratorTypes,
}

/// Effect of a purchased upgrade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeEffect {
    Click(f64),
    Global(f64),
    Generator {
        generator: &'static str,
        multiplier: f64,
    },
    /// Production × (1 + coefficient × metric), evaluated live.
    Synergy {
        metric: SynergyMetric,
        coefficient: f64,
    },
    /// Glyphs granted at the start of every run after a prestige.
    StartingGlyphs(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnlockResource {
    TotalGlyphsEarned,
    Glyphs,
    Vocables,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnlockCondition {
    Resource {
        resource: UnlockResource,
        amount: f64,
    },
    GeneratorOwned {
        generator: &'static str,
        amount: u32,
    },
    TotalGenerators(u32),
    GeneratorTypes(u32),
}

/// Immutable upgrade blueprint.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub cost: f64,
    pub currency: Currency,
    pub category: UpgradeCategory,
    pub effect: UpgradeEffect,
    pub unlock: UnlockCondition,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrestigeLayerDef {
    pub id: &'static str,
    pub name: &'static str,
    pub currency: Currency,
    pub requirement: f64,
}

// ── Runtime state ───────────────────────────────────────────────

/// A generator roster entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Generator {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub base_cost: Decimal,
    pub base_production: Decimal,
    pub cost_multiplier: f64,
    pub owned: u32,
    pub unlocked: bool,
}

impl Generator {
    pub fn new(def: &GeneratorDef, unlocked: bool) -> Self {
        Self {
            id: def.id,
            name: def.name,
            description: def.description,
            icon: def.icon,
            base_cost: Decimal::from(def.base_cost),
            base_production: Decimal::from(def.base_production),
            cost_multiplier: def.cost_multiplier,
            owned: 0,
            unlocked,
        }
    }

    /// Cost of the next unit: `base_cost × cost_multiplier^owned`.
    pub fn cost(&self) -> Decimal {
        self.base_cost * Decimal::from(self.cost_multiplier).powi(self.owned as i64)
    }
}

/// Runtime status of one upgrade definition.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeState {
    pub id: &'static str,
    pub purchased: bool,
    pub unlocked: bool,
}

/// Aggregate of purchased upgrade effects (synergy excluded).
#[derive(Clone, Debug, PartialEq)]
pub struct Multipliers {
    pub click: f64,
    pub global: f64,
    pub generators: HashMap<&'static str, f64>,
    pub starting_glyphs: Decimal,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            click: 1.0,
            global: 1.0,
            generators: HashMap::new(),
            starting_glyphs: Decimal::ZERO,
        }
    }
}

impl Multipliers {
    pub fn generator(&self, id: &str) -> f64 {
        self.generators.get(id).copied().unwrap_or(1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrestigeLayer {
    pub id: &'static str,
    pub name: &'static str,
    pub currency: Currency,
    pub requirement: Decimal,
    pub times_reset: u32,
}

impl PrestigeLayer {
    pub fn new(def: &PrestigeLayerDef) -> Self {
        Self {
            id: def.id,
            name: def.name,
            currency: def.currency,
            requirement: Decimal::from(def.requirement),
            times_reset: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    /// Glyphs earned across every run. Never decreases.
    pub total_glyphs_earned: Decimal,
    /// Glyphs earned since the last prestige.
    pub glyphs_earned_this_run: Decimal,
    pub total_clicks: u64,
    /// Simulated seconds.
    pub play_time: f64,
    /// Unix milliseconds of the last save, 0 if never saved.
    pub last_save: i64,
}

/// Full state of an Infinite Library game.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryState {
    pub catalog: Catalog,
    pub resources: Resources,
    pub generators: Vec<Generator>,
    pub upgrades: Vec<UpgradeState>,
    pub prestige_layers: Vec<PrestigeLayer>,
    pub multipliers: Multipliers,
    pub stats: Stats,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryState {
    /// A fresh game over the standard catalog.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::standard())
    }

    /// A fresh game over an arbitrary catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            resources: Resources::default(),
            generators: Self::create_generators(&catalog),
            upgrades: catalog
                .upgrades
                .iter()
                .map(|def| UpgradeState {
                    id: def.id,
                    purchased: false,
                    unlocked: false,
                })
                .collect(),
            prestige_layers: catalog.prestige_layers.iter().map(PrestigeLayer::new).collect(),
            multipliers: Multipliers::default(),
            stats: Stats::default(),
            catalog,
        }
    }

    /// The generator roster as it stands at the start of a run. Only the first is revealed.
    pub fn create_generators(catalog: &Catalog) -> Vec<Generator> {
        catalog
            .generators
            .iter()
            .enumerate()
            .map(|(i, def)| Generator::new(def, i == 0))
            .collect()
    }

    pub fn generator(&self, id: &str) -> Option<&Generator> {
        self.generators.iter().find(|g| g.id == id)
    }

    pub fn upgrade_def(&self, id: &str) -> Option<&'static UpgradeDef> {
        self.catalog.upgrades.iter().find(|u| u.id == id)
    }

    pub fn upgrade_state(&self, id: &str) -> Option<&UpgradeState> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn prestige_layer(&self, id: &str) -> Option<&PrestigeLayer> {
        self.prestige_layers.iter().find(|l| l.id == id)
    }

    // ── Generators ──────────────────────────────────────────────

    /// Cost of the next unit, or `Decimal::INFINITY` for an unknown id.
    pub fn generator_cost(&self, id: &str) -> Decimal {
        self.generator(id)
            .map(Generator::cost)
            .unwrap_or(Decimal::INFINITY)
    }

    /// Glyphs per second from one generator with every multiplier applied.
    pub fn generator_production(&self, id: &str) -> Decimal {
        match self.generator(id) {
            Some(g) if g.owned > 0 => self.production_of(g, self.synergy_multiplier()),
            _ => Decimal::ZERO,
        }
    }

    fn production_of(&self, g: &Generator, synergy: f64) -> Decimal {
        let factor = self.multipliers.generator(g.id) * self.multipliers.global * synergy;
        g.base_production * Decimal::from(g.owned) * Decimal::from(factor)
    }

    /// Glyphs per second across all generators.
    pub fn total_production(&self) -> Decimal {
        let synergy = self.synergy_multiplier();
        self.generators
            .iter()
            .filter(|g| g.owned > 0)
            .map(|g| self.production_of(g, synergy))
            .sum()
    }

    /// Glyphs gained per second by buying one more unit of `id`.
    pub fn next_unit_production(&self, id: &str) -> Decimal {
        match self.generator(id) {
            Some(g) => {
                let factor = self.multipliers.generator(g.id)
                    * self.multipliers.global
                    * self.synergy_multiplier();
                g.base_production * Decimal::from(factor)
            }
            None => Decimal::ZERO,
        }
    }

    /// Seconds until the next unit pays for itself. None if it produces nothing.
    pub fn payback_seconds(&self, id: &str) -> Option<f64> {
        let rate = self.next_unit_production(id);
        if rate.is_zero() {
            return None;
        }
        Some((self.generator_cost(id) / rate).to_f64())
    }

    pub fn total_generators(&self) -> u64 {
        self.generators.iter().map(|g| g.owned as u64).sum()
    }

    pub fn generator_types_owned(&self) -> u32 {
        self.generators.iter().filter(|g| g.owned > 0).count() as u32
    }

    /// Product of `(1 + coefficient × metric)` over purchased synergy upgrades.
    pub fn synergy_multiplier(&self) -> f64 {
        self.purchased_defs()
            .filter_map(|def| match def.effect {
                UpgradeEffect::Synergy {
                    metric,
                    coefficient,
                } => {
                    let value = match metric {
                        SynergyMetric::TotalGenerators => self.total_generators() as f64,
                        SynergyMetric::GeneratorTypes => self.generator_types_owned() as f64,
                    };
                    Some(1.0 + coefficient * value)
                }
                _ => None,
            })
            .product()
    }

    /// Glyphs per click.
    pub fn click_power(&self) -> Decimal {
        Decimal::from(self.multipliers.click)
    }

    // ── Upgrades ────────────────────────────────────────────────

    fn purchased_defs(&self) -> impl Iterator<Item = &'static UpgradeDef> + '_ {
        self.catalog
            .upgrades
            .iter()
            .filter(|def| self.is_upgrade_purchased(def.id))
    }

    pub fn is_upgrade_purchased(&self, id: &str) -> bool {
        self.upgrade_state(id).is_some_and(|u| u.purchased)
    }

    /// Unlocked once latched, or while its condition currently holds.
    pub fn is_upgrade_unlocked(&self, id: &str) -> bool {
        let latched = self
            .upgrade_state(id)
            .is_some_and(|u| u.unlocked || u.purchased);
        latched || self.upgrade_def(id).is_some_and(|def| self.condition_met(&def.unlock))
    }

    pub fn condition_met(&self, condition: &UnlockCondition) -> bool {
        match *condition {
            UnlockCondition::Resource { resource, amount } => {
                let current = match resource {
                    UnlockResource::TotalGlyphsEarned => self.stats.total_glyphs_earned,
                    UnlockResource::Glyphs => self.resources.glyphs,
                    UnlockResource::Vocables => self.resources.vocables,
                };
                current >= Decimal::from(amount)
            }
            UnlockCondition::GeneratorOwned { generator, amount } => self
                .generator(generator)
                .is_some_and(|g| g.owned >= amount),
            UnlockCondition::TotalGenerators(amount) => self.total_generators() >= amount as u64,
            UnlockCondition::GeneratorTypes(amount) => self.generator_types_owned() >= amount,
        }
    }

    /// Unlocked upgrades that have not been bought yet, in catalog order.
    pub fn available_upgrades(&self) -> Vec<&'static UpgradeDef> {
        self.catalog
            .upgrades
            .iter()
            .filter(|def| self.is_upgrade_unlocked(def.id) && !self.is_upgrade_purchased(def.id))
            .collect()
    }

    pub fn purchased_upgrades(&self) -> Vec<&'static UpgradeDef> {
        self.purchased_defs().collect()
    }

    pub fn can_afford_upgrade(&self, id: &str) -> bool {
        self.upgrade_def(id)
            .is_some_and(|def| self.resources.get(def.currency) >= Decimal::from(def.cost))
    }

    // ── Prestige ────────────────────────────────────────────────

    pub fn can_prestige(&self, layer_id: &str) -> bool {
        self.prestige_layer(layer_id)
            .is_some_and(|l| self.resources.glyphs >= l.requirement)
    }

    /// `floor(sqrt(glyphs / requirement))`, zero for an unknown layer.
    pub fn prestige_gain(&self, layer_id: &str) -> Decimal {
        match self.prestige_layer(layer_id) {
            Some(l) => (self.resources.glyphs / l.requirement).sqrt().floor(),
            None => Decimal::ZERO,
        }
    }
}
