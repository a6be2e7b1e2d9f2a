//! env_logger setup for binaries and tests embedding the library.

use std::io::Write;

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialize logging. Safe to call more than once; repeated calls are
/// no-ops.
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", "warn,revoice=info");

    let mut builder = Builder::from_env(env);
    builder
        .filter_module("hyper", LevelFilter::Error)
        .filter_module("reqwest", LevelFilter::Warn)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr);

    // try_init so tests that each call this do not panic
    let _ = builder.try_init();
}
