use ie::screen::buffbar::{self, BarKind, BarPosition};

use crate::config::{Settings, SettingsStore};

/// Finds the debuff bar and remembers where it was.
#[derive(Debug, Default)]
pub struct DebuffLocator {
	cached: Option<BarPosition>,
	/// The last read at `cached` found no bar; search again before trusting it.
	stale: bool,
}

impl DebuffLocator {
	/// Start from a previously persisted position, if any.
	pub fn new(seed: Option<BarPosition>) -> Self {
		Self {
			cached: seed,
			stale: false,
		}
	}

	pub fn location(&self) -> Option<BarPosition> {
		self.cached
	}

	pub fn needs_locate(&self) -> bool {
		self.cached.is_none() || self.stale
	}

	/// The bar was not at the cached position (moved, interface resized, ...).
	pub fn invalidate(&mut self) {
		self.stale = true;
	}

	/// Search the whole capture. On success the position is cached and
	/// persisted; on failure the previous cache is kept.
	pub fn locate(&mut self, screen: ie::Image, store: &SettingsStore, settings: &mut Settings) -> bool {
		let Some(pos) = buffbar::find(screen, BarKind::Debuffs) else {
			tracing::debug!("debuff bar not found");
			return false;
		};

		if self.cached != Some(pos) {
			tracing::info!(x = pos.x, y = pos.y, "debuff bar located");
		}
		self.cached = Some(pos);
		self.stale = false;

		if settings.debuffs_location != Some(pos) {
			settings.debuffs_location = Some(pos);
			if let Err(err) = store.save(settings) {
				tracing::warn!(error = %format!("{err:#}"), "failed to persist debuff bar location");
			}
		}
		true
	}
}
