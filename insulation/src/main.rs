//! Deep Sea Insulation.
//!
//! Watches the game's debuff bar for the electrified debuff and sounds an
//! alert whenever its stacks go up.

mod alert;
mod capture;
mod config;
mod detector;
mod host;
mod i18n;
mod locator;
mod overlay;
mod poll;
mod scanner;
mod session;
mod ui;
mod util;

#[cfg(test)]
mod testutil;

fn main() -> eframe::Result {
	// Structured logging. Use `RUST_LOG=info` etc.
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	i18n::init(None);
	ui::run()
}
