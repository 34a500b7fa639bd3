//! A full session through the public API: play, save, come back later, prestige.

use infinite_library::config::EngineConfig;
use infinite_library::decimal::Decimal;
use infinite_library::library::autoplay;
use infinite_library::library::data::STANDARD_LAYER;
use infinite_library::library::offline::apply_offline_progress;
use infinite_library::library::save::{load_game, save_game, MemorySlot};
use infinite_library::library::state::LibraryState;
use infinite_library::library::{Action, LibraryGame};
use infinite_library::time::{FrameScheduler, SimulationLoop};

struct Immediate;

impl FrameScheduler for Immediate {
    fn request_frame(&mut self) -> Option<i32> {
        Some(1)
    }

    fn cancel_frame(&mut self, _handle: i32) {}
}

#[test]
fn play_save_return_prestige() {
    let config = EngineConfig::default();
    let slot = MemorySlot::new();

    let mut game = LibraryGame::new();
    autoplay::run(&mut game.state, 900, 5);
    let production = game.state.total_production();
    assert!(production > Decimal::ZERO);

    let saved_at = 1_700_000_000_000;
    save_game(&mut game.state, &slot, &config.storage_key, saved_at).unwrap();

    // Two hours later, in a fresh page.
    let mut returning = LibraryGame::new();
    assert!(load_game(&mut returning.state, &slot, &config.storage_key));
    let before = returning.state.resources.glyphs;
    let earned = apply_offline_progress(
        &mut returning.state,
        saved_at + 2 * 3_600 * 1_000,
        config.max_offline_secs,
    );
    let expected = production.to_f64() * 7_200.0 * 0.5;
    assert!((earned.to_f64() / expected - 1.0).abs() < 1e-9);
    assert!(returning.state.resources.glyphs > before);

    // Enough for a prestige now.
    assert!(returning.state.can_prestige(STANDARD_LAYER));
    let upgrades = returning.state.purchased_upgrades();
    assert!(returning.handle(&Action::Prestige(STANDARD_LAYER.into())));
    assert!(returning.state.resources.vocables >= Decimal::ONE);
    assert_eq!(returning.state.total_generators(), 0);
    assert_eq!(returning.state.purchased_upgrades(), upgrades);
}

#[test]
fn frame_loop_drives_a_game() {
    let mut state = LibraryState::new();
    state.generators[0].owned = 10;
    let mut sim = SimulationLoop::new(EngineConfig::default().max_frame_delta_secs);
    let mut sched = Immediate;
    sim.start(&mut sched);

    // 120 frames at 60 fps, then a five minute stall.
    for i in 0..=120 {
        sim.frame(&mut state, i as f64 * 1_000.0 / 60.0, &mut sched);
    }
    sim.frame(&mut state, 2_000.0 + 300_000.0, &mut sched);
    sim.stop(&mut sched);

    assert!((state.stats.play_time - 3.0).abs() < 1e-9);
    assert!((state.resources.glyphs.to_f64() - 30.0).abs() < 1e-6);
}
