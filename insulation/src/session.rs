//! Everything one poll needs, owned in one place.
//!
//! A session ties locator, scanner, detector and alert player together. It is
//! owned by the poll thread; the UI only talks to it through [`crate::poll`].

use crate::alert::Alarm;
use crate::config::{Settings, SettingsStore};
use crate::detector::{Detector, DetectorState, StackReader, Template, tooltip_text};
use crate::host::Host;
use crate::locator::DebuffLocator;
use crate::poll::Poller;
use crate::scanner::{self, DebuffEntry};

pub struct Session<H, A, R> {
	host: H,
	alarm: A,
	reader: R,
	template: Template,

	store: SettingsStore,
	settings: Settings,

	locator: DebuffLocator,
	detector: Detector,
}

impl<H: Host, A: Alarm, R: StackReader> Session<H, A, R> {
	pub fn new(host: H, alarm: A, reader: R, template: Template, store: SettingsStore, settings: Settings) -> Self {
		Self {
			locator: DebuffLocator::new(settings.debuffs_location),
			detector: Detector::new(),
			host,
			alarm,
			reader,
			template,
			store,
			settings,
		}
	}

	/// Run one poll.
	pub fn tick(&mut self) -> DetectorState {
		if !self.host.game_active() {
			self.host.clear_tooltip();
			self.alarm.silence();
			return self.detector.suppress();
		}

		let matched = match self.host.capture() {
			Some(screen) => self.find_electrified(screen.as_image()),
			None => {
				tracing::debug!("capture unavailable; treating as an empty poll");
				None
			}
		};

		let state = self.detector.observe(matched, self.alarm.is_playing());
		tracing::debug!(?state, stacks = ?self.detector.stacks(), "poll");
		if state == DetectorState::Alerting {
			self.alert();
		}
		state
	}

	/// Stacks of the electrified debuff, if it is on the bar.
	fn find_electrified(&mut self, screen: ie::Image) -> Option<u32> {
		let entries = self.read_entries(screen);
		// Several matching slots: the last one on the bar wins.
		entries
			.iter()
			.rev()
			.find(|entry| self.template.matches(entry.icon))
			.map(|entry| self.reader.read_stacks(entry.counter))
	}

	fn read_entries<'a>(&mut self, screen: ie::Image<'a>) -> Vec<DebuffEntry<'a>> {
		if self.locator.needs_locate() && !self.locator.locate(screen, &self.store, &mut self.settings) {
			return Vec::new();
		}
		let Some(location) = self.locator.location() else {
			return Vec::new();
		};

		if let Some(entries) = scanner::scan(screen, location) {
			return entries;
		}

		// The bar moved since the last poll; look for it again right away.
		self.locator.invalidate();
		if !self.locator.locate(screen, &self.store, &mut self.settings) {
			return Vec::new();
		}
		self.locator
			.location()
			.and_then(|location| scanner::scan(screen, location))
			.unwrap_or_default()
	}

	fn alert(&mut self) {
		let stacks = self.detector.stacks().current_stacks;
		tracing::info!(stacks, "shocked");
		if self.settings.show_tooltip {
			self.host.set_tooltip(&tooltip_text(stacks));
		}
		// Sound and volume are read from the current settings on every alert.
		self.alarm.play(self.settings.alert, self.settings.volume);
	}

	/// Take over settings edited in the UI and persist them.
	///
	/// The debuff bar location is owned by the session and is kept.
	pub fn apply_settings(&mut self, mut settings: Settings) {
		settings.debuffs_location = self.settings.debuffs_location;
		settings.set_volume(settings.volume);
		if settings == self.settings {
			return;
		}

		self.settings = settings;
		if let Err(err) = self.store.save(&self.settings) {
			tracing::warn!(error = %format!("{err:#}"), "failed to save settings");
		}
	}
}

impl<H: Host, A: Alarm, R: StackReader> Poller for Session<H, A, R> {
	fn tick(&mut self) {
		Session::tick(self);
	}

	fn apply_settings(&mut self, settings: Settings) {
		Session::apply_settings(self, settings);
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};

	use ie::OwnedImage;
	use ie::screen::buffbar::{BarPosition, GRID};

	use super::*;
	use crate::config::AlertSound;
	use crate::detector::AlertState;
	use crate::host::Capabilities;
	use crate::testutil::{PixelStacks, draw_electrified, draw_slot, electrified, screen};

	struct FakeHost {
		active: Cell<bool>,
		screen: RefCell<Option<OwnedImage>>,
		tooltip: RefCell<Option<String>>,
	}

	impl Host for FakeHost {
		fn capabilities(&self) -> Capabilities {
			Capabilities {
				embedded: true,
				capture: true,
				overlay: true,
			}
		}

		fn game_active(&self) -> bool {
			self.active.get()
		}

		fn capture(&self) -> Option<OwnedImage> {
			self.screen.borrow().clone()
		}

		fn set_tooltip(&self, text: &str) {
			*self.tooltip.borrow_mut() = Some(text.to_string());
		}

		fn clear_tooltip(&self) {
			*self.tooltip.borrow_mut() = None;
		}
	}

	#[derive(Debug, Default, Clone, PartialEq)]
	struct FakeAlarm {
		playing: bool,
		gain: f32,
		position: u32,
		plays: Vec<(AlertSound, u8)>,
	}

	impl Alarm for FakeAlarm {
		fn play(&mut self, sound: AlertSound, volume: u8) {
			self.gain = crate::alert::volume_gain(volume);
			self.position = 0;
			self.playing = true;
			self.plays.push((sound, volume));
		}

		fn silence(&mut self) {
			self.gain = 0.0;
			self.position = 0;
			self.playing = false;
		}

		fn is_playing(&self) -> bool {
			self.playing
		}
	}

	const BAR: BarPosition = BarPosition { x: 200, y: 150 };

	struct Fixture {
		_dir: tempfile::TempDir,
		session: Session<FakeHost, FakeAlarm, PixelStacks>,
	}

	fn fixture(settings: Settings) -> Fixture {
		let dir = tempfile::tempdir().unwrap();
		let store = SettingsStore::new(dir.path().join("settings.json"));
		let host = FakeHost {
			active: Cell::new(true),
			screen: RefCell::new(Some(screen())),
			tooltip: RefCell::new(None),
		};
		let session = Session::new(host, FakeAlarm::default(), PixelStacks, electrified(), store, settings);
		Fixture { _dir: dir, session }
	}

	fn with_tooltip() -> Settings {
		Settings {
			show_tooltip: true,
			..Settings::default()
		}
	}

	/// A bar at `BAR` with one unrelated debuff followed by electrified.
	fn bar_with_stacks(stacks: u8) -> OwnedImage {
		let mut image = screen();
		draw_slot(&mut image, BAR.x, BAR.y, ie::Color::WHITE);
		draw_electrified(&mut image, BAR.x + GRID, BAR.y, stacks);
		image
	}

	impl Fixture {
		fn show(&self, image: OwnedImage) {
			*self.session.host.screen.borrow_mut() = Some(image);
		}

		/// The alert sound ran to its end.
		fn finish_sound(&mut self) {
			self.session.alarm.playing = false;
		}

		fn tooltip(&self) -> Option<String> {
			self.session.host.tooltip.borrow().clone()
		}
	}

	#[test]
	fn empty_screen_resets_counters() {
		let mut f = fixture(Settings::default());
		assert_eq!(f.session.tick(), DetectorState::Idle);
		assert_eq!(f.session.detector.stacks(), AlertState::default());
		assert!(f.session.alarm.plays.is_empty());
	}

	#[test]
	fn first_stack_shows_tooltip_and_plays() {
		let mut f = fixture(with_tooltip());
		f.show(bar_with_stacks(1));

		assert_eq!(f.session.tick(), DetectorState::Alerting);
		assert_eq!(f.tooltip().as_deref(), Some("You were shocked! Current Stacks: 1"));
		assert_eq!(f.session.alarm.plays, vec![(AlertSound::Alarm2, 100)]);
		assert_eq!(f.session.alarm.gain, 1.0);
	}

	#[test]
	fn repeated_stack_does_not_alert_again() {
		let mut f = fixture(with_tooltip());
		f.show(bar_with_stacks(1));
		f.session.tick();
		f.finish_sound();

		assert_eq!(f.session.tick(), DetectorState::Matched);
		assert_eq!(f.session.alarm.plays.len(), 1);
	}

	#[test]
	fn increased_stacks_alert_again() {
		let mut f = fixture(with_tooltip());
		f.show(bar_with_stacks(1));
		f.session.tick();
		f.finish_sound();

		f.show(bar_with_stacks(2));
		assert_eq!(f.session.tick(), DetectorState::Alerting);
		assert_eq!(f.tooltip().as_deref(), Some("You were shocked! Current Stacks: 2"));
		assert_eq!(f.session.alarm.plays.len(), 2);
	}

	#[test]
	fn no_alert_while_still_sounding() {
		let mut f = fixture(Settings::default());
		f.show(bar_with_stacks(1));
		f.session.tick();

		f.show(bar_with_stacks(2));
		assert_eq!(f.session.tick(), DetectorState::Matched);
		assert_eq!(f.session.alarm.plays.len(), 1);
	}

	#[test]
	fn tooltip_setting_off_only_plays() {
		let mut f = fixture(Settings::default());
		f.show(bar_with_stacks(3));

		assert_eq!(f.session.tick(), DetectorState::Alerting);
		assert_eq!(f.tooltip(), None);
		assert_eq!(f.session.alarm.plays.len(), 1);
	}

	#[test]
	fn inactive_game_silences_immediately() {
		let mut f = fixture(with_tooltip());
		f.show(bar_with_stacks(1));
		f.session.tick();
		assert!(f.session.alarm.playing);

		f.session.host.active.set(false);
		f.show(bar_with_stacks(4));
		assert_eq!(f.session.tick(), DetectorState::Suppressed);
		assert!(!f.session.alarm.playing);
		assert_eq!(f.session.alarm.gain, 0.0);
		assert_eq!(f.session.alarm.position, 0);
		assert_eq!(f.tooltip(), None);
		assert_eq!(f.session.alarm.plays.len(), 1);
	}

	#[test]
	fn silencing_twice_equals_once() {
		let mut f = fixture(Settings::default());
		f.show(bar_with_stacks(1));
		f.session.tick();
		f.session.host.active.set(false);

		f.session.tick();
		let once = f.session.alarm.clone();
		f.session.tick();
		assert_eq!(f.session.alarm, once);
	}

	#[test]
	fn debuff_gone_resets_counters() {
		let mut f = fixture(Settings::default());
		f.show(bar_with_stacks(2));
		f.session.tick();

		let mut image = screen();
		draw_slot(&mut image, BAR.x, BAR.y, ie::Color::WHITE);
		f.show(image);
		assert_eq!(f.session.tick(), DetectorState::Idle);
		assert_eq!(f.session.detector.stacks(), AlertState::default());
	}

	#[test]
	fn last_matching_slot_wins() {
		let mut f = fixture(Settings::default());
		let mut image = screen();
		draw_electrified(&mut image, BAR.x, BAR.y, 2);
		draw_electrified(&mut image, BAR.x + GRID, BAR.y, 5);
		f.show(image);

		f.session.tick();
		assert_eq!(f.session.detector.stacks().current_stacks, 5);
	}

	#[test]
	fn missing_capture_is_an_empty_poll() {
		let mut f = fixture(Settings::default());
		f.show(bar_with_stacks(2));
		f.session.tick();

		*f.session.host.screen.borrow_mut() = None;
		assert_eq!(f.session.tick(), DetectorState::Idle);
		assert_eq!(f.session.detector.stacks(), AlertState::default());
	}

	#[test]
	fn location_is_found_persisted_and_followed() {
		let mut f = fixture(Settings::default());
		f.show(bar_with_stacks(1));
		f.session.tick();
		assert_eq!(f.session.settings.debuffs_location, Some(BAR));
		assert_eq!(f.session.store.load().unwrap().debuffs_location, Some(BAR));

		// Interface moved: the bar is found again in the same poll.
		f.finish_sound();
		let moved = BarPosition { x: 40, y: 300 };
		let mut image = screen();
		draw_electrified(&mut image, moved.x, moved.y, 2);
		f.show(image);
		assert_eq!(f.session.tick(), DetectorState::Alerting);
		assert_eq!(f.session.settings.debuffs_location, Some(moved));
	}

	#[test]
	fn stale_persisted_location_is_replaced() {
		let mut f = fixture(Settings {
			debuffs_location: Some(BarPosition { x: 1, y: 1 }),
			..Settings::default()
		});
		f.show(bar_with_stacks(1));

		assert_eq!(f.session.tick(), DetectorState::Alerting);
		assert_eq!(f.session.settings.debuffs_location, Some(BAR));
	}

	#[test]
	fn changed_sound_is_used_on_next_alert() {
		let mut f = fixture(Settings::default());
		f.show(bar_with_stacks(1));
		f.session.tick();
		f.finish_sound();

		f.session.apply_settings(Settings {
			alert: AlertSound::Bell,
			volume: 30,
			..Settings::default()
		});
		// The UI's copy had no location; the session's is kept.
		assert_eq!(f.session.settings.debuffs_location, Some(BAR));

		f.show(bar_with_stacks(2));
		f.session.tick();
		assert_eq!(f.session.alarm.plays.last(), Some(&(AlertSound::Bell, 30)));
		assert_eq!(f.session.store.load().unwrap().alert, AlertSound::Bell);
	}

	#[test]
	fn last_stacks_always_equal_current_after_tick() {
		let mut f = fixture(Settings::default());
		for stacks in [1u8, 3, 3, 0, 2] {
			f.show(bar_with_stacks(stacks));
			f.session.tick();
			let s = f.session.detector.stacks();
			assert_eq!(s.last_stacks, s.current_stacks);
			assert_eq!(s.current_stacks, stacks as u32);
		}
	}
}
