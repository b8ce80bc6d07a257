//! What the tool needs from its surroundings: the game window, screen capture
//! and somewhere to draw the tooltip.

use thiserror::Error;

/// Startup failures. Each one keeps the poll loop from starting and is shown
/// in the output area instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
	#[error("Game window \"{0}\" not found. Start the game (or pick its window in the settings) so the screen can be captured.")]
	WindowNotFound(String),

	#[error("The game window was found but could not be captured. Check that screen capture is permitted for this app.")]
	CaptureDenied,

	#[error("Attempted to use the overlay but it is disabled. Please enable \"Show overlay\" in the settings.")]
	OverlayDisabled,

	#[error("Missing assets: {0}")]
	Assets(String),

	#[error("Could not start watching: {0}")]
	Worker(String),
}

/// Result of the startup capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
	/// The game window exists.
	pub embedded: bool,
	/// A capture of the game window succeeded.
	pub capture: bool,
	/// Drawing over the game is allowed.
	pub overlay: bool,
}

impl Capabilities {
	/// First failing check, in the order the host grants them.
	pub fn check(self, window_app_name: &str) -> Result<(), EnvironmentError> {
		if !self.embedded {
			return Err(EnvironmentError::WindowNotFound(window_app_name.to_string()));
		}
		if !self.capture {
			return Err(EnvironmentError::CaptureDenied);
		}
		if !self.overlay {
			return Err(EnvironmentError::OverlayDisabled);
		}
		Ok(())
	}
}

pub trait Host {
	fn capabilities(&self) -> Capabilities;

	/// Whether the game window currently has focus.
	fn game_active(&self) -> bool;

	fn capture(&self) -> Option<ie::OwnedImage>;

	fn set_tooltip(&self, text: &str);

	fn clear_tooltip(&self);
}
