use std::path::PathBuf;

use crate::alert::{Alarm, AlertPlayer};
use crate::capture::{self, GameWindow};
use crate::config::{APP_NAME, Settings, SettingsStore};
use crate::detector::Template;
use crate::host::{EnvironmentError, Host};
use crate::overlay::Tooltip;
use crate::poll::{self, POLL_INTERVAL, PollHandle};
use crate::session::Session;
use crate::tr;
use crate::util::assets::resolve_assets;

mod settings;

pub fn run() -> eframe::Result {
	let options = eframe::NativeOptions {
		viewport: egui::ViewportBuilder::default()
			.with_title("Deep Sea Insulation")
			.with_inner_size([380.0, 380.0]),
		..Default::default()
	};
	eframe::run_native(APP_NAME, options, Box::new(|cc| Ok(Box::new(InsulationApp::new(cc)))))
}

pub struct InsulationApp {
	store: SettingsStore,
	settings: Settings,

	tooltip: Tooltip,
	poll: Option<PollHandle>,

	/// Startup errors shown in the output area.
	output: Vec<String>,
	window_names: Vec<String>,
	/// Player for the "test alert" button (UI thread only).
	preview: Option<AlertPlayer>,
}

impl InsulationApp {
	pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
		let path = SettingsStore::default_path().unwrap_or_else(|err| {
			tracing::warn!(error = %err, "no config directory; storing settings next to the working directory");
			PathBuf::from(format!("{APP_NAME}.json"))
		});
		let store = SettingsStore::new(path);
		let settings = store.load_or_default();

		let mut app = Self {
			store,
			settings,
			tooltip: Tooltip::new(cc.egui_ctx.clone()),
			poll: None,
			output: Vec::new(),
			window_names: capture::window_app_names(),
			preview: None,
		};
		app.start();
		app
	}

	/// Run the capability checks and start watching if they pass.
	fn start(&mut self) {
		// Stop a previous loop before its settings file is shared with a new one.
		if let Some(poll) = self.poll.take() {
			poll.stop();
		}
		self.store.sync_location(&mut self.settings);
		self.output.clear();

		match start_polling(&self.store, &self.settings, self.tooltip.clone()) {
			Ok(handle) => self.poll = Some(handle),
			Err(err) => {
				tracing::warn!(error = %err, "not watching");
				self.output.push(err.to_string());
			}
		}
	}

	fn is_watching(&self) -> bool {
		self.poll.as_ref().is_some_and(PollHandle::is_running)
	}

	fn settings_changed(&mut self) {
		// While polling, the poll thread is the only writer of the settings file.
		match &self.poll {
			Some(poll) if poll.is_running() => poll.update_settings(self.settings.clone()),
			_ => {
				self.store.sync_location(&mut self.settings);
				if let Err(err) = self.store.save(&self.settings) {
					tracing::warn!(error = %format!("{err:#}"), "failed to save settings");
				}
			}
		}
	}

	fn test_alert(&mut self) {
		if self.preview.is_none() {
			match resolve_assets() {
				Ok(assets) => self.preview = Some(AlertPlayer::new(assets.sounds())),
				Err(err) => {
					self.output.push(format!("{err:#}"));
					return;
				}
			}
		}
		if let Some(player) = &mut self.preview {
			player.play(self.settings.alert, self.settings.volume);
		}
	}
}

fn start_polling(store: &SettingsStore, settings: &Settings, tooltip: Tooltip) -> Result<PollHandle, EnvironmentError> {
	let host = GameWindow::new(settings.window_app_name.clone(), settings.overlay_enabled, tooltip);
	host.capabilities().check(&settings.window_app_name)?;

	let assets = resolve_assets().map_err(|err| EnvironmentError::Assets(format!("{err:#}")))?;

	let store = store.clone();
	let settings = settings.clone();
	poll::spawn(
		move || {
			let template = Template::load(&assets.template())?;
			let ie = ie::Ie::try_new(
				ie::Theme::COUNTER,
				assets.ocr_detection(),
				assets.ocr_recognition(),
				assets.ocr_charset(),
			)?;
			Ok(Session::new(host, AlertPlayer::new(assets.sounds()), ie, template, store, settings))
		},
		POLL_INTERVAL,
	)
	.map_err(|err| EnvironmentError::Worker(format!("{err:#}")))
}

impl eframe::App for InsulationApp {
	fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
		let mut response = settings::Response::default();
		let (window, overlay) = (self.settings.window_app_name.clone(), self.settings.overlay_enabled);

		egui::CentralPanel::default().show(ctx, |ui| {
			ui.heading(tr!("header", version = env!("CARGO_PKG_VERSION")));
			ui.separator();

			response = settings::ui(ui, &mut self.settings, &self.window_names);

			ui.separator();
			if self.is_watching() {
				ui.label(tr!("status-watching"));
			} else {
				ui.label(tr!("status-stopped"));
			}
			for message in &self.output {
				ui.colored_label(ui.visuals().warn_fg_color, message);
			}
			if !self.is_watching() && ui.button(tr!("retry")).clicked() {
				self.start();
			}
		});

		if response.changed {
			self.settings_changed();
			// The host is bound to one window and overlay permission; rebuild it.
			if (&self.settings.window_app_name, self.settings.overlay_enabled) != (&window, overlay) {
				self.start();
			}
		}
		if response.refresh_windows {
			self.window_names = capture::window_app_names();
		}
		if response.test_alert {
			self.test_alert();
		}

		let app_name = self.settings.window_app_name.clone();
		self.tooltip.show(ctx, || capture::window_bounds(&app_name));
	}
}
