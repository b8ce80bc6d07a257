//! Persistent settings.
//!
//! Stored as one JSON record named after the application in a
//! platform-appropriate config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ie::screen::buffbar::BarPosition;
use serde::{Deserialize, Deserializer, Serialize};

/// Key the settings record is stored under.
pub const APP_NAME: &str = "deepseainsulation";

pub const DEFAULT_VOLUME: u8 = 100;

/// Selectable alert sounds. Serialized by id (`"alarm2"`, `"bell"`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSound {
	#[default]
	Alarm2,
	Notification1,
	Notification2,
	Notification3,
	Bell,
	Elevator,
	Nuclear,
}

impl AlertSound {
	pub const ALL: [AlertSound; 7] = [
		AlertSound::Alarm2,
		AlertSound::Notification1,
		AlertSound::Notification2,
		AlertSound::Notification3,
		AlertSound::Bell,
		AlertSound::Elevator,
		AlertSound::Nuclear,
	];

	pub fn id(self) -> &'static str {
		match self {
			AlertSound::Alarm2 => "alarm2",
			AlertSound::Notification1 => "notification1",
			AlertSound::Notification2 => "notification2",
			AlertSound::Notification3 => "notification3",
			AlertSound::Bell => "bell",
			AlertSound::Elevator => "elevator",
			AlertSound::Nuclear => "nuclear",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			AlertSound::Alarm2 => "Alarm",
			AlertSound::Notification1 => "Notification 1",
			AlertSound::Notification2 => "Notification 2",
			AlertSound::Notification3 => "Notification 3",
			AlertSound::Bell => "Bell",
			AlertSound::Elevator => "Elevator",
			AlertSound::Nuclear => "Nuclear",
		}
	}

	/// Sound file name inside the `alarms/` asset folder.
	pub fn file_name(self) -> String {
		format!("{}.wav", self.id())
	}
}

/// The persisted settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
	pub alert: AlertSound,

	/// Percent, 0..=100.
	#[serde(deserialize_with = "volume_from_any")]
	pub volume: u8,

	pub show_tooltip: bool,

	/// Where the debuff bar was last found.
	pub debuffs_location: Option<BarPosition>,

	/// Application name of the game window (from `xcap::Window::app_name()`).
	///
	/// If multiple windows share the same app name, the first match is used.
	pub window_app_name: String,

	/// Whether the tooltip overlay may be drawn over the game.
	pub overlay_enabled: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			alert: AlertSound::Alarm2,
			volume: DEFAULT_VOLUME,
			show_tooltip: false,
			debuffs_location: None,
			window_app_name: "rs2client".to_string(),
			overlay_enabled: true,
		}
	}
}

impl Settings {
	pub fn set_volume(&mut self, volume: u8) {
		self.volume = volume.min(100);
	}
}

/// Accepts `100`, `55.5` or `"100"` (range inputs store strings) and clamps to 0..=100.
fn volume_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawVolume {
		Number(f64),
		Text(String),
	}

	let volume = match RawVolume::deserialize(deserializer)? {
		RawVolume::Number(v) => v,
		RawVolume::Text(s) => s.trim().parse().unwrap_or(DEFAULT_VOLUME as f64),
	};
	Ok(volume.clamp(0.0, 100.0).round() as u8)
}

/// Reads and writes the single settings slot.
#[derive(Debug, Clone)]
pub struct SettingsStore {
	path: PathBuf,
}

impl SettingsStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Path of the settings file in the user's config directory.
	pub fn default_path() -> Result<PathBuf> {
		let base = dirs::config_dir().context("config_dir() unavailable")?;
		Ok(base.join(format!("{APP_NAME}.json")))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Load settings, writing the defaults first if nothing is stored yet.
	pub fn load(&self) -> Result<Settings> {
		if !self.path.exists() {
			tracing::info!(path = %self.path.display(), "no settings stored; writing defaults");
			self.save(&Settings::default())?;
		}
		let json = fs::read_to_string(&self.path).with_context(|| format!("read {:?}", self.path))?;
		let settings = serde_json::from_str(&json).with_context(|| format!("parse {:?}", self.path))?;
		Ok(settings)
	}

	/// Load settings, falling back to defaults on any error.
	pub fn load_or_default(&self) -> Settings {
		match self.load() {
			Ok(settings) => settings,
			Err(err) => {
				tracing::warn!(error = %format!("{err:#}"), "failed to load settings; using defaults");
				Settings::default()
			}
		}
	}

	/// Copy the persisted debuff bar location into `settings`.
	///
	/// The poll thread owns that field on disk; callers holding an older copy
	/// of the record refresh it before writing the record back.
	pub fn sync_location(&self, settings: &mut Settings) {
		if !self.path.exists() {
			return;
		}
		match self.load() {
			Ok(stored) => settings.debuffs_location = stored.debuffs_location,
			Err(err) => tracing::debug!(error = %format!("{err:#}"), "stored location unavailable"),
		}
	}

	pub fn save(&self, settings: &Settings) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
		}
		let json = serde_json::to_string_pretty(settings).context("serialize settings")?;
		fs::write(&self.path, json).with_context(|| format!("write {:?}", self.path))?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn store() -> (tempfile::TempDir, SettingsStore) {
		let dir = tempfile::tempdir().unwrap();
		let store = SettingsStore::new(dir.path().join(format!("{APP_NAME}.json")));
		(dir, store)
	}

	#[test]
	fn first_run_writes_defaults_before_reading() {
		let (_dir, store) = store();
		assert!(!store.path().exists());

		let settings = store.load().unwrap();
		assert!(store.path().exists());
		assert_eq!(settings.alert, AlertSound::Alarm2);
		assert_eq!(settings.volume, 100);

		let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
		assert_eq!(raw["alert"], "alarm2");
		assert_eq!(raw["volume"], 100);
	}

	#[test]
	fn save_then_load_keeps_changes() {
		let (_dir, store) = store();
		let mut settings = store.load().unwrap();
		settings.alert = AlertSound::Bell;
		settings.set_volume(40);
		settings.show_tooltip = true;
		settings.debuffs_location = Some(BarPosition { x: 812, y: 530 });
		store.save(&settings).unwrap();

		assert_eq!(store.load().unwrap(), settings);
	}

	#[test]
	fn reads_blob_written_by_range_inputs() {
		let (_dir, store) = store();
		fs::write(
			store.path(),
			r#"{"alert":"nuclear","volume":"55","showTooltip":true,"debuffsLocation":[10,20]}"#,
		)
		.unwrap();

		let settings = store.load().unwrap();
		assert_eq!(settings.alert, AlertSound::Nuclear);
		assert_eq!(settings.volume, 55);
		assert!(settings.show_tooltip);
		assert_eq!(settings.debuffs_location, Some(BarPosition { x: 10, y: 20 }));
		// Missing keys fall back to defaults.
		assert!(settings.overlay_enabled);
	}

	#[test]
	fn volume_is_clamped() {
		let settings: Settings = serde_json::from_str(r#"{"volume":250}"#).unwrap();
		assert_eq!(settings.volume, 100);

		let mut settings = Settings::default();
		settings.set_volume(180);
		assert_eq!(settings.volume, 100);
	}

	#[test]
	fn corrupt_file_falls_back_to_defaults() {
		let (_dir, store) = store();
		fs::write(store.path(), "{not json").unwrap();
		assert!(store.load().is_err());
		assert_eq!(store.load_or_default(), Settings::default());
	}

	#[test]
	fn sync_location_picks_up_the_persisted_position() {
		let (_dir, store) = store();
		let mut stale = store.load().unwrap();

		let mut worker = stale.clone();
		worker.debuffs_location = Some(BarPosition { x: 300, y: 40 });
		store.save(&worker).unwrap();

		stale.alert = AlertSound::Elevator;
		store.sync_location(&mut stale);
		store.save(&stale).unwrap();

		let stored = store.load().unwrap();
		assert_eq!(stored.debuffs_location, Some(BarPosition { x: 300, y: 40 }));
		assert_eq!(stored.alert, AlertSound::Elevator);
	}

	#[test]
	fn sync_location_without_a_file_changes_nothing() {
		let (_dir, store) = store();
		let mut settings = Settings {
			debuffs_location: Some(BarPosition { x: 1, y: 2 }),
			..Settings::default()
		};
		store.sync_location(&mut settings);
		assert_eq!(settings.debuffs_location, Some(BarPosition { x: 1, y: 2 }));
		assert!(!store.path().exists());
	}

	#[test]
	fn sound_ids_match_serialized_names() {
		for sound in AlertSound::ALL {
			let json = serde_json::to_string(&sound).unwrap();
			assert_eq!(json, format!("\"{}\"", sound.id()));
		}
	}
}
