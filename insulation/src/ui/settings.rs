use crate::config::{AlertSound, Settings};
use crate::tr;

#[derive(Debug, Default)]
pub struct Response {
	/// A setting was edited and should be persisted.
	pub changed: bool,
	pub test_alert: bool,
	pub refresh_windows: bool,
}

pub fn ui(ui: &mut egui::Ui, settings: &mut Settings, window_names: &[String]) -> Response {
	let mut response = Response::default();

	ui.heading(tr!("alarm-settings"));

	ui.horizontal(|ui| {
		ui.label(tr!("alert-sound"));
		egui::ComboBox::from_id_salt("alert-sound")
			.selected_text(settings.alert.label())
			.show_ui(ui, |ui| {
				for sound in AlertSound::ALL {
					response.changed |= ui
						.selectable_value(&mut settings.alert, sound, sound.label())
						.changed();
				}
			});
		response.test_alert = ui.button(tr!("test-alert")).clicked();
	});

	response.changed |= ui
		.add(
			egui::Slider::new(&mut settings.volume, 0..=100)
				.step_by(1.0)
				.suffix("%")
				.text(tr!("volume")),
		)
		.changed();

	response.changed |= ui
		.checkbox(&mut settings.show_tooltip, tr!("show-tooltip"))
		.changed();

	ui.separator();
	ui.heading(tr!("game-settings"));

	ui.horizontal(|ui| {
		ui.label(tr!("game-window"));
		egui::ComboBox::from_id_salt("game-window")
			.selected_text(settings.window_app_name.as_str())
			.show_ui(ui, |ui| {
				for name in window_names {
					response.changed |= ui
						.selectable_value(&mut settings.window_app_name, name.clone(), name)
						.changed();
				}
			});
		response.refresh_windows = ui.button(tr!("refresh")).clicked();
	});

	response.changed |= ui
		.checkbox(&mut settings.overlay_enabled, tr!("overlay-enabled"))
		.changed();

	response
}
