//! The always-on-top tooltip drawn over the game.
//!
//! The tooltip is rendered as a small, borderless, click-through egui viewport
//! anchored to the game window's top-left corner. The poll thread only sets the
//! text; the UI thread draws it.

use std::sync::{Arc, Mutex, PoisonError};

use crate::capture::WindowBounds;

/// Offset from the game window's corner, in egui points.
pub const TOOLTIP_MARGIN: f32 = 24.0;
pub const TOOLTIP_W: f32 = 300.0;
pub const TOOLTIP_H: f32 = 36.0;

/// Tooltip text shared between the poll thread and the UI thread.
#[derive(Clone)]
pub struct Tooltip {
	text: Arc<Mutex<Option<String>>>,
	ctx: egui::Context,
}

impl Tooltip {
	pub fn new(ctx: egui::Context) -> Self {
		Self {
			text: Arc::new(Mutex::new(None)),
			ctx,
		}
	}

	pub fn set(&self, text: &str) {
		*self.text.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
		self.ctx.request_repaint();
	}

	pub fn clear(&self) {
		let previous = self.text.lock().unwrap_or_else(PoisonError::into_inner).take();
		if previous.is_some() {
			self.ctx.request_repaint();
		}
	}

	pub fn text(&self) -> Option<String> {
		self.text.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// Draw the tooltip viewport if there is text to show.
	pub fn show(&self, ctx: &egui::Context, anchor: impl FnOnce() -> Option<WindowBounds>) {
		let Some(text) = self.text() else { return };

		let mut builder = egui::ViewportBuilder::default()
			.with_title("Deep Sea Insulation")
			.with_decorations(false)
			.with_always_on_top()
			.with_transparent(true)
			.with_mouse_passthrough(true)
			.with_taskbar(false)
			.with_resizable(false)
			.with_inner_size([TOOLTIP_W, TOOLTIP_H]);
		if let Some(bounds) = anchor() {
			let scale = bounds.scale_factor.max(0.1);
			builder = builder.with_position([
				bounds.x / scale + TOOLTIP_MARGIN,
				bounds.y / scale + TOOLTIP_MARGIN,
			]);
		}

		ctx.show_viewport_immediate(egui::ViewportId::from_hash_of("dsi-tooltip"), builder, |ctx, _class| {
			egui::CentralPanel::default()
				.frame(egui::Frame::popup(&ctx.style()))
				.show(ctx, |ui| {
					ui.label(egui::RichText::new(&text).strong());
				});
		});
	}
}
