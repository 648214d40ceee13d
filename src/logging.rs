//! Log backend setup.

use log::LevelFilter;

/// Level for this crate's own modules at a given `-v` count.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. Dependencies stay at error level; `RUST_LOG`
/// directives are applied last. Calling this twice is harmless.
pub fn init(verbose: u8) {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Error)
        .filter_module("aarlo", level_for(verbose))
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
