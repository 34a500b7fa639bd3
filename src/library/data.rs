//! Static reference tables: the generator roster, the upgrade tree and the
//! prestige layers.

use super::state::{
    Currency, GeneratorDef, PrestigeLayerDef, SynergyMetric, UnlockCondition, UnlockResource,
    UpgradeCategory, UpgradeDef, UpgradeEffect,
};

/// The only prestige layer of the standard catalog.
pub const STANDARD_LAYER: &str = "lexicon";

/// A full set of definitions a game is built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Catalog {
    pub generators: &'static [GeneratorDef],
    pub upgrades: &'static [UpgradeDef],
    pub prestige_layers: &'static [PrestigeLayerDef],
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            generators: GENERATORS,
            upgrades: UPGRADES,
            prestige_layers: PRESTIGE_LAYERS,
        }
    }
}

const fn generator(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    base_cost: f64,
    base_production: f64,
) -> GeneratorDef {
    GeneratorDef {
        id,
        name,
        description,
        icon,
        base_cost,
        base_production,
        cost_multiplier: 1.15,
    }
}

pub const GENERATORS: &[GeneratorDef] = &[
    generator("quill", "Plume d'oie", "Une plume qui griffonne seule.", "🪶", 10.0, 1.0),
    generator("scribe", "Scribe", "Recopie patiemment les glyphes.", "✍️", 100.0, 5.0),
    generator("copyist", "Copiste", "Un atelier de copistes infatigables.", "📜", 1_100.0, 32.0),
    generator("press", "Presse", "Caractères mobiles et encre grasse.", "🖨️", 12_000.0, 180.0),
    generator("scriptorium", "Scriptorium", "Un monastère entier voué à l'écriture.", "⛪", 130_000.0, 1_000.0),
    generator("librarian", "Bibliothécaire", "Classe et reproduit les volumes.", "🧓", 1.4e6, 5_500.0),
    generator("hexagon", "Hexagone", "Une galerie hexagonale de plus.", "⬡", 2e7, 32_000.0),
    generator("babel", "Tour de Babel", "Toutes les langues, tous les livres.", "🗼", 3.3e8, 200_000.0),
];

const fn earned(amount: f64) -> UnlockCondition {
    UnlockCondition::Resource {
        resource: UnlockResource::TotalGlyphsEarned,
        amount,
    }
}

const fn vocables(amount: f64) -> UnlockCondition {
    UnlockCondition::Resource {
        resource: UnlockResource::Vocables,
        amount,
    }
}

const fn generator_boost(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    target: &'static str,
    cost: f64,
) -> UpgradeDef {
    UpgradeDef {
        id,
        name,
        description,
        icon: "⚙️",
        cost,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Generator,
        effect: UpgradeEffect::Generator {
            generator: target,
            multiplier: 2.0,
        },
        unlock: UnlockCondition::GeneratorOwned {
            generator: target,
            amount: 5,
        },
    }
}

pub const UPGRADES: &[UpgradeDef] = &[
    // ── Click ───────────────────────────────────────────────────
    UpgradeDef {
        id: "ink_well",
        name: "Encrier",
        description: "Clics ×2",
        icon: "🖋️",
        cost: 50.0,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Click,
        effect: UpgradeEffect::Click(2.0),
        unlock: earned(25.0),
    },
    UpgradeDef {
        id: "gilded_nib",
        name: "Plume dorée",
        description: "Clics ×2",
        icon: "✨",
        cost: 500.0,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Click,
        effect: UpgradeEffect::Click(2.0),
        unlock: earned(250.0),
    },
    UpgradeDef {
        id: "illumination",
        name: "Enluminure",
        description: "Clics ×3",
        icon: "🎨",
        cost: 10_000.0,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Click,
        effect: UpgradeEffect::Click(3.0),
        unlock: earned(5_000.0),
    },
    // ── Generators ──────────────────────────────────────────────
    generator_boost("sharpened_quills", "Plumes taillées", "Plumes d'oie ×2", "quill", 100.0),
    generator_boost("trained_scribes", "Scribes formés", "Scribes ×2", "scribe", 1_000.0),
    generator_boost("patient_copyists", "Copistes patients", "Copistes ×2", "copyist", 11_000.0),
    generator_boost("movable_type", "Caractères mobiles", "Presses ×2", "press", 120_000.0),
    generator_boost("vaulted_scriptorium", "Scriptorium voûté", "Scriptoria ×2", "scriptorium", 1.3e6),
    generator_boost("card_catalogue", "Fichier", "Bibliothécaires ×2", "librarian", 1.4e7),
    generator_boost("mirror_hexagons", "Miroirs des hexagones", "Hexagones ×2", "hexagon", 2e8),
    generator_boost("babel_foundations", "Fondations de Babel", "Tours de Babel ×2", "babel", 3.3e9),
    // ── Global ──────────────────────────────────────────────────
    UpgradeDef {
        id: "reading_lamps",
        name: "Lampes de lecture",
        description: "Production ×1.5",
        icon: "🕯️",
        cost: 5_000.0,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Global,
        effect: UpgradeEffect::Global(1.5),
        unlock: earned(2_500.0),
    },
    UpgradeDef {
        id: "classification",
        name: "Classification décimale",
        description: "Production ×2",
        icon: "🗂️",
        cost: 250_000.0,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Global,
        effect: UpgradeEffect::Global(2.0),
        unlock: earned(100_000.0),
    },
    // ── Synergy ─────────────────────────────────────────────────
    UpgradeDef {
        id: "cross_references",
        name: "Renvois",
        description: "+1% de production par générateur possédé",
        icon: "🔗",
        cost: 2_000.0,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Synergy,
        effect: UpgradeEffect::Synergy {
            metric: SynergyMetric::TotalGenerators,
            coefficient: 0.01,
        },
        unlock: UnlockCondition::TotalGenerators(10),
    },
    UpgradeDef {
        id: "encyclopedia",
        name: "Savoir encyclopédique",
        description: "+5% de production par type de générateur",
        icon: "📚",
        cost: 50_000.0,
        currency: Currency::Glyphs,
        category: UpgradeCategory::Synergy,
        effect: UpgradeEffect::Synergy {
            metric: SynergyMetric::GeneratorTypes,
            coefficient: 0.05,
        },
        unlock: UnlockCondition::GeneratorTypes(4),
    },
    // ── Prestige ────────────────────────────────────────────────
    UpgradeDef {
        id: "first_words",
        name: "Premiers mots",
        description: "Production ×2",
        icon: "🌱",
        cost: 1.0,
        currency: Currency::Vocables,
        category: UpgradeCategory::Prestige,
        effect: UpgradeEffect::Global(2.0),
        unlock: vocables(1.0),
    },
    UpgradeDef {
        id: "remembered_pages",
        name: "Pages retenues",
        description: "Commence chaque partie avec 100 glyphes",
        icon: "🔖",
        cost: 3.0,
        currency: Currency::Vocables,
        category: UpgradeCategory::Prestige,
        effect: UpgradeEffect::StartingGlyphs(100.0),
        unlock: vocables(3.0),
    },
    UpgradeDef {
        id: "rich_vocabulary",
        name: "Vocabulaire riche",
        description: "Clics ×5",
        icon: "🗣️",
        cost: 5.0,
        currency: Currency::Vocables,
        category: UpgradeCategory::Prestige,
        effect: UpgradeEffect::Click(5.0),
        unlock: vocables(5.0),
    },
    UpgradeDef {
        id: "inherited_shelf",
        name: "Étagère héritée",
        description: "Commence chaque partie avec 1 000 glyphes",
        icon: "🗄️",
        cost: 10.0,
        currency: Currency::Vocables,
        category: UpgradeCategory::Prestige,
        effect: UpgradeEffect::StartingGlyphs(1_000.0),
        unlock: vocables(10.0),
    },
];

pub const PRESTIGE_LAYERS: &[PrestigeLayerDef] = &[PrestigeLayerDef {
    id: STANDARD_LAYER,
    name: "Lexique",
    currency: Currency::Vocables,
    requirement: 1_000.0,
}];
