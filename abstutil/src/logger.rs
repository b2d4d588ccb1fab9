/// Adjust the log level without recompiling with the `RUST_LOG` env variable.
///
///     RUST_LOG=debug cargo run --bin headless
///
/// This can be done on a per-crate basis:
///
///     RUST_LOG=sim=debug cargo run --bin headless
///
/// Or module-by-module:
///
///     RUST_LOG=sim::car=debug cargo run --bin headless
pub fn setup() {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();
}
