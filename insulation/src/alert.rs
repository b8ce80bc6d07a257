//! Alert sound playback.

use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::config::AlertSound;

/// Map a 0..=100 percent setting onto rodio's 0.0..=1.0 gain.
pub fn volume_gain(volume: u8) -> f32 {
	volume.min(100) as f32 / 100.0
}

/// Something that can sound the alert.
pub trait Alarm {
	/// Set the volume, rewind and start playing `sound`.
	fn play(&mut self, sound: AlertSound, volume: u8);

	/// Volume 0, rewind, pause. Safe to call in any state.
	fn silence(&mut self);

	fn is_playing(&self) -> bool;
}

/// Plays alert sounds through the default output device.
///
/// The device is opened on first use, so the player has to live on the thread
/// that plays it.
pub struct AlertPlayer {
	sounds: PathBuf,
	// Declared before the stream so it is dropped first.
	sink: Option<Sink>,
	stream: Option<(OutputStream, OutputStreamHandle)>,
}

impl AlertPlayer {
	pub fn new(sounds: impl Into<PathBuf>) -> Self {
		Self {
			sounds: sounds.into(),
			sink: None,
			stream: None,
		}
	}

	fn sink(&mut self) -> Option<&Sink> {
		if self.sink.is_none() {
			match OutputStream::try_default() {
				Ok((stream, handle)) => match Sink::try_new(&handle) {
					Ok(sink) => {
						self.sink = Some(sink);
						self.stream = Some((stream, handle));
					}
					Err(err) => tracing::warn!(error = %err, "failed to create audio sink"),
				},
				Err(err) => tracing::warn!(error = %err, "audio output unavailable; alert sounds disabled"),
			}
		}
		self.sink.as_ref()
	}
}

impl Alarm for AlertPlayer {
	fn play(&mut self, sound: AlertSound, volume: u8) {
		let path = self.sounds.join(sound.file_name());
		let source = File::open(&path)
			.with_context(|| format!("open {:?}", path))
			.and_then(|file| Decoder::new(BufReader::new(file)).with_context(|| format!("decode {:?}", path)));
		let source = match source {
			Ok(source) => source,
			Err(err) => {
				tracing::warn!(error = %format!("{err:#}"), "failed to load alert sound");
				return;
			}
		};

		let Some(sink) = self.sink() else { return };
		sink.clear();
		sink.set_volume(volume_gain(volume));
		sink.append(source);
		sink.play();
		tracing::debug!(sound = sound.id(), volume, "alert playing");
	}

	fn silence(&mut self) {
		if let Some(sink) = &self.sink {
			sink.set_volume(0.0);
			// Drops the queued sound (so the next play starts from the beginning) and pauses.
			sink.clear();
		}
	}

	fn is_playing(&self) -> bool {
		self.sink.as_ref().is_some_and(|sink| !sink.empty() && !sink.is_paused())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn volume_maps_linearly() {
		assert_eq!(volume_gain(0), 0.0);
		assert_eq!(volume_gain(50), 0.5);
		assert_eq!(volume_gain(100), 1.0);
		assert_eq!(volume_gain(250), 1.0);
	}

	#[test]
	fn silence_is_idempotent_before_any_playback() {
		let mut player = AlertPlayer::new("does-not-exist");
		player.silence();
		assert!(!player.is_playing());
		player.silence();
		assert!(!player.is_playing());
	}

	#[test]
	fn missing_sound_file_does_not_play() {
		let dir = tempfile::tempdir().unwrap();
		let mut player = AlertPlayer::new(dir.path());
		player.play(AlertSound::Bell, 100);
		assert!(!player.is_playing());
	}
}
