//! The poll loop.
//!
//! A dedicated thread owns the session and runs one poll per interval. The UI
//! talks to it only through a mailbox, so all detection state has a single
//! writer. Ticks never overlap; a slow tick delays the next ones instead.

use std::{
	sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
	thread::JoinHandle,
	time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};

use crate::config::Settings;

pub const POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// What the poll thread runs.
pub trait Poller {
	fn tick(&mut self);

	fn apply_settings(&mut self, settings: Settings);
}

#[derive(Debug)]
pub enum Command {
	UpdateSettings(Settings),
	Stop,
}

/// Owner side of a running poll loop. Dropping it stops the loop.
pub struct PollHandle {
	tx: Sender<Command>,
	thread: Option<JoinHandle<()>>,
}

/// Start polling every `interval`.
///
/// `build` runs on the poll thread, so the poller may hold thread-bound
/// resources such as the audio output. Returns once `build` has finished; its
/// error, if any, is returned here and no loop is started.
pub fn spawn<P, F>(build: F, interval: Duration) -> Result<PollHandle>
where
	P: Poller,
	F: FnOnce() -> Result<P> + Send + 'static,
{
	let (tx, rx) = mpsc::channel();
	let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
	let thread = std::thread::Builder::new()
		.name("dsi-poll".into())
		.spawn(move || {
			let poller = match build() {
				Ok(poller) => {
					let _ = ready_tx.send(Ok(()));
					poller
				}
				Err(err) => {
					let _ = ready_tx.send(Err(err));
					return;
				}
			};
			run(poller, rx, interval);
		})
		.context("spawn poll thread")?;

	let startup = ready_rx.recv();
	match startup {
		Ok(Ok(())) => {}
		Ok(Err(err)) => {
			let _ = thread.join();
			return Err(err);
		}
		Err(_) => {
			let _ = thread.join();
			bail!("poll thread exited during startup");
		}
	}

	tracing::info!(interval_ms = interval.as_millis() as u64, "poll loop started");
	Ok(PollHandle {
		tx,
		thread: Some(thread),
	})
}

fn run<P: Poller>(mut poller: P, rx: Receiver<Command>, interval: Duration) {
	let mut next = Instant::now() + interval;
	loop {
		let wait = next.saturating_duration_since(Instant::now());
		match rx.recv_timeout(wait) {
			Ok(Command::UpdateSettings(settings)) => poller.apply_settings(settings),
			Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
			Err(RecvTimeoutError::Timeout) => {
				poller.tick();
				next = next_deadline(next, interval, Instant::now());
			}
		}
	}
	tracing::info!("poll loop stopped");
}

/// The first period boundary after `now`. Periods missed while a tick ran
/// long (or the machine slept) are dropped, not replayed.
fn next_deadline(next: Instant, interval: Duration, now: Instant) -> Instant {
	let next = next + interval;
	if next > now {
		return next;
	}
	let missed = ((now - next).as_nanos() / interval.as_nanos().max(1) + 1) as u32;
	tracing::debug!(missed, "poll fell behind; skipping missed periods");
	next + interval * missed
}

impl PollHandle {
	pub fn update_settings(&self, settings: Settings) {
		if self.tx.send(Command::UpdateSettings(settings)).is_err() {
			tracing::warn!("poll loop is not running; settings change dropped");
		}
	}

	pub fn is_running(&self) -> bool {
		self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
	}

	/// Stop the loop and wait for the current tick to finish.
	pub fn stop(mut self) {
		self.shutdown();
	}

	fn shutdown(&mut self) {
		let _ = self.tx.send(Command::Stop);
		if let Some(thread) = self.thread.take()
			&& thread.join().is_err()
		{
			tracing::warn!("poll thread panicked");
		}
	}
}

impl Drop for PollHandle {
	fn drop(&mut self) {
		self.shutdown();
	}
}
