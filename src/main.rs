//! Headless balance run: `infinite-library [SECONDS] [CLICKS_PER_SEC]`.
//!
//! In the browser the page drives the game through `web::LibraryHandle`.

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Play a fresh library with the greedy autoplayer and print a report.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "infinite-library", version)]
struct Args {
    /// Simulated seconds of play
    #[arg(default_value_t = 1800)]
    seconds: u32,

    /// Manual clicks per simulated second
    #[arg(default_value_t = 5)]
    clicks_per_sec: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use infinite_library::library::autoplay;
    use infinite_library::library::state::LibraryState;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::debug!("{args:?}");

    let mut state = LibraryState::new();
    let report = autoplay::run(&mut state, args.seconds, args.clicks_per_sec);
    println!("{report}");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    infinite_library::web::init_runtime();
}

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["infinite-library"]).unwrap();
        assert_eq!(args.seconds, 1800);
        assert_eq!(args.clicks_per_sec, 5);
    }

    #[test]
    fn positional_overrides() {
        let args = Args::try_parse_from(["infinite-library", "60", "0"]).unwrap();
        assert_eq!(args.seconds, 60);
        assert_eq!(args.clicks_per_sec, 0);
    }

    #[test]
    fn rejects_non_numeric() {
        assert!(Args::try_parse_from(["infinite-library", "soon"]).is_err());
        assert!(Args::try_parse_from(["infinite-library", "60", "-1"]).is_err());
    }
}
