use xcap::image::EncodableLayout;

use crate::host::{Capabilities, Host};
use crate::overlay::Tooltip;

/// Geometry information for the captured game window.
#[derive(Debug, Clone, Copy)]
pub struct WindowBounds {
	pub x: f32,
	pub y: f32,
	pub width: f32,
	pub height: f32,
	/// Monitor scale factor (physical pixels per logical point).
	pub scale_factor: f32,
}

pub fn find_window(app_name: &str) -> Option<xcap::Window> {
	let windows = xcap::Window::all().ok()?;
	windows
		.into_iter()
		.find(|window| window.app_name().ok().as_deref() == Some(app_name))
}

/// App names of all visible windows, for the window picker.
pub fn window_app_names() -> Vec<String> {
	let mut names = xcap::Window::all()
		.map(|windows| windows.into_iter().filter_map(|w| w.app_name().ok()).collect::<Vec<_>>())
		.unwrap_or_else(|err| {
			tracing::warn!(error = %err, "failed to enumerate windows");
			Vec::new()
		});
	names.sort();
	names.dedup();
	names
}

pub fn window_bounds(app_name: &str) -> Option<WindowBounds> {
	let window = find_window(app_name)?;
	let scale_factor = window
		.current_monitor()
		.ok()
		.and_then(|m| m.scale_factor().ok())
		.unwrap_or(1.0);

	Some(WindowBounds {
		x: window.x().ok()? as f32,
		y: window.y().ok()? as f32,
		width: window.width().ok()? as f32,
		height: window.height().ok()? as f32,
		scale_factor,
	})
}

fn capture_window(window: &xcap::Window) -> Option<ie::OwnedImage> {
	let img = window.capture_image().ok()?;
	Some(ie::OwnedImage::from_rgba(img.width() as usize, img.as_bytes()))
}

/// The game window, looked up by app name on every call so restarts of the
/// game are picked up.
#[derive(Clone)]
pub struct GameWindow {
	app_name: String,
	overlay_enabled: bool,
	tooltip: Tooltip,
}

impl GameWindow {
	pub fn new(app_name: impl Into<String>, overlay_enabled: bool, tooltip: Tooltip) -> Self {
		Self {
			app_name: app_name.into(),
			overlay_enabled,
			tooltip,
		}
	}
}

impl Host for GameWindow {
	fn capabilities(&self) -> Capabilities {
		let window = find_window(&self.app_name);
		Capabilities {
			embedded: window.is_some(),
			capture: window.as_ref().and_then(capture_window).is_some(),
			overlay: self.overlay_enabled,
		}
	}

	fn game_active(&self) -> bool {
		find_window(&self.app_name).is_some_and(|w| w.is_focused().unwrap_or(false))
	}

	fn capture(&self) -> Option<ie::OwnedImage> {
		capture_window(&find_window(&self.app_name)?)
	}

	fn set_tooltip(&self, text: &str) {
		if self.overlay_enabled {
			self.tooltip.set(text);
		}
	}

	fn clear_tooltip(&self) {
		self.tooltip.clear();
	}
}
