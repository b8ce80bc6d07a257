//! Electrocution detection.
//!
//! Matches the electrified icon against every debuff on the bar, reads its
//! stack counter and decides whether the stacks went up since the last poll.
//!
//! ```text
//!             game inactive (any state)
//!   * ───────────────────────────────────► Suppressed
//!
//!             no entry matches
//!   * ───────────────────────────────────► Idle         (stacks reset to 0/0)
//!
//!             match, stacks not increased / alert already sounding
//!   * ───────────────────────────────────► Matched
//!
//!             match, 0 < stacks > last stacks, alert quiet
//!   * ───────────────────────────────────► Alerting
//! ```

use std::path::Path;

use anyhow::{Context, Result};

/// A slot counts as the tracked icon when strictly more pixels than this match.
pub const MATCH_THRESHOLD: u32 = 500;

/// Only fully opaque template pixels are compared.
const TEMPLATE_ALPHA: u8 = 255;

/// The reference icon plus the mask of pixels that take part in matching.
pub struct Template {
	image: ie::OwnedImage,
	mask: ie::OwnedMask,
}

impl Template {
	pub fn new(image: ie::OwnedImage, mask: ie::OwnedMask) -> Self {
		Self { image, mask }
	}

	pub fn from_png(bytes: &[u8]) -> Result<Self> {
		let (image, mask) = ie::OwnedImage::from_png_mask(bytes, TEMPLATE_ALPHA)?;
		Ok(Self::new(image, mask))
	}

	pub fn load(path: &Path) -> Result<Self> {
		let bytes = std::fs::read(path).with_context(|| format!("read {:?}", path))?;
		Self::from_png(&bytes).with_context(|| format!("load template {:?}", path))
	}

	pub fn count_match(&self, icon: ie::Image) -> ie::MatchCount {
		icon.count_match(self.image.as_image(), self.mask.as_mask())
	}

	pub fn matches(&self, icon: ie::Image) -> bool {
		self.count_match(icon).passed > MATCH_THRESHOLD
	}
}

/// Reads the stack number printed on an icon.
pub trait StackReader {
	/// Unreadable counters are 0.
	fn read_stacks(&self, counter: ie::Image) -> u32;
}

impl StackReader for ie::Ie {
	fn read_stacks(&self, counter: ie::Image) -> u32 {
		self.read_counter(counter)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
	/// No slot matched the icon this poll.
	Idle,
	/// Icon found, stacks read, no alert needed.
	Matched,
	/// Icon found and the stacks went up: the alert should sound.
	Alerting,
	/// The game window is not focused.
	Suppressed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertState {
	pub current_stacks: u32,
	pub last_stacks: u32,
}

#[derive(Debug, Default)]
pub struct Detector {
	stacks: AlertState,
}

impl Detector {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn stacks(&self) -> AlertState {
		self.stacks
	}

	/// The game lost focus. Counters are left as they were.
	pub fn suppress(&mut self) -> DetectorState {
		self.finish(DetectorState::Suppressed)
	}

	/// Feed one poll's outcome: the stacks of the matching slot (`None` when
	/// nothing matched) and whether the alert is still sounding.
	pub fn observe(&mut self, matched: Option<u32>, alert_playing: bool) -> DetectorState {
		let state = match matched {
			None => {
				self.stacks = AlertState::default();
				DetectorState::Idle
			}
			Some(stacks) => {
				self.stacks.current_stacks = stacks;
				if stacks > 0 && stacks > self.stacks.last_stacks && !alert_playing {
					DetectorState::Alerting
				} else {
					DetectorState::Matched
				}
			}
		};
		self.finish(state)
	}

	fn finish(&mut self, state: DetectorState) -> DetectorState {
		self.stacks.last_stacks = self.stacks.current_stacks;
		state
	}
}

pub fn tooltip_text(stacks: u32) -> String {
	format!("You were shocked! Current Stacks: {stacks}")
}
