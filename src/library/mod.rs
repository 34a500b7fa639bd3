//! Infinite Library — an incremental glyph-copying game with a prestige layer.

pub mod autoplay;
pub mod data;
pub mod logic;
pub mod offline;
pub mod save;
pub mod state;

use crate::decimal::Decimal;

use state::LibraryState;

/// A player or subsystem request routed to the store.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Click,
    BuyGenerator(String),
    BuyUpgrade(String),
    Prestige(String),
    /// Glyphs granted from outside the economy (the notes feature).
    AddGlyphs(Decimal),
    Reset,
}

pub struct LibraryGame {
    pub state: LibraryState,
}

impl Default for LibraryGame {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryGame {
    pub fn new() -> Self {
        Self {
            state: LibraryState::new(),
        }
    }

    /// Apply an action. Returns true if the state changed.
    pub fn handle(&mut self, action: &Action) -> bool {
        match action {
            Action::Click => {
                logic::click(&mut self.state);
                true
            }
            Action::BuyGenerator(id) => logic::buy_generator(&mut self.state, id),
            Action::BuyUpgrade(id) => logic::buy_upgrade(&mut self.state, id),
            Action::Prestige(layer) => logic::prestige(&mut self.state, layer) > Decimal::ZERO,
            Action::AddGlyphs(amount) => {
                if *amount > Decimal::ZERO && amount.is_finite() {
                    logic::add_resource(&mut self.state, *amount);
                    true
                } else {
                    false
                }
            }
            Action::Reset => {
                logic::reset(&mut self.state);
                true
            }
        }
    }

    /// Advance the simulation by `delta_secs` seconds.
    pub fn tick(&mut self, delta_secs: f64) {
        logic::tick(&mut self.state, delta_secs);
    }
}
