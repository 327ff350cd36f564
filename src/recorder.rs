//! In-memory stand-in for the two GPIO lines.
//!
//! Every level change is logged so tests and demos can look at exactly what went out on
//! the wire, decoded back into bits, bytes and LED frames.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use blinkt_shared::{BYTES_PER_LED, LEDSTRIP_LENGTH, PREAMBLE_LEN, UPDATE_LEN};
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::Line;

/// One level set on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
	pub line: Line,
	pub high: bool,
}

/// A single update decoded from the recorded clock edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
	pub preamble:       [u8; PREAMBLE_LEN],
	pub frames:         Vec<[u8; BYTES_PER_LED]>,
	/// Clock pulses after the last LED frame.
	pub latch_pulses:   usize,
	pub latch_data_low: bool,
}

/// Returned by a [`RecorderPin`] once the failure set up with [`Recorder::fail_after`] kicks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderError;

impl digital::Error for RecorderError {
	fn kind(&self) -> ErrorKind {
		ErrorKind::Other
	}
}

#[derive(Debug, Default)]
struct Inner {
	events:    Vec<Event>,
	/// Successful sets left before every set fails.
	remaining: Option<usize>,
}

/// Shared log behind a data pin and a clock pin.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
	inner: Arc<Mutex<Inner>>,
}

impl Recorder {
	pub fn new() -> Self {
		Self::default()
	}

	/// A data pin and a clock pin that both log into this recorder.
	pub fn pins(&self) -> (RecorderPin, RecorderPin) {
		(self.pin(Line::Data), self.pin(Line::Clock))
	}

	fn pin(&self, line: Line) -> RecorderPin {
		RecorderPin {
			line,
			inner: Arc::clone(&self.inner),
		}
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn events(&self) -> Vec<Event> {
		self.lock().events.clone()
	}

	/// Forgets everything recorded so far.
	pub fn clear(&self) {
		self.lock().events.clear();
	}

	/// Let `sets` more level changes through, then fail every one after that.
	pub fn fail_after(&self, sets: usize) {
		self.lock().remaining = Some(sets);
	}

	/// Stops failing.
	pub fn recover(&self) {
		self.lock().remaining = None;
	}

	/// Data level at every rising clock edge, which is when an APA102 samples it.
	pub fn clocked_bits(&self) -> Vec<bool> {
		let inner = self.lock();

		let mut data = false;
		let mut clock = false;
		let mut bits = Vec::new();

		for event in &inner.events {
			match event.line {
				Line::Data => data = event.high,
				Line::Clock => {
					if event.high && !clock {
						bits.push(data);
					}
					clock = event.high;
				}
			}
		}

		bits
	}

	/// Decodes the recorded trace as one full update, `None` if it is too short to hold one.
	///
	/// Everything clocked after the last frame is counted as latch. Call [`Recorder::clear`]
	/// between updates to look at them one at a time.
	pub fn capture(&self) -> Option<Capture> {
		let bits = self.clocked_bits();
		if bits.len() < UPDATE_LEN * 8 {
			return None;
		}

		let (update, latch) = bits.split_at(UPDATE_LEN * 8);
		let bytes: Vec<u8> = update
			.chunks(8)
			.map(|byte| byte.iter().fold(0u8, |acc, bit| (acc << 1) | u8::from(*bit)))
			.collect();

		let (preamble, frames) = bytes.split_at(PREAMBLE_LEN);
		let preamble = preamble.try_into().ok()?;
		let frames = frames
			.chunks(BYTES_PER_LED)
			.map(|frame| frame.try_into().ok())
			.collect::<Option<Vec<[u8; BYTES_PER_LED]>>>()?;
		debug_assert_eq!(frames.len(), LEDSTRIP_LENGTH);

		Some(Capture {
			preamble,
			frames,
			latch_pulses: latch.len(),
			latch_data_low: latch.iter().all(|bit| !bit),
		})
	}
}

/// One side of a [`Recorder`].
#[derive(Debug)]
pub struct RecorderPin {
	line:  Line,
	inner: Arc<Mutex<Inner>>,
}

impl RecorderPin {
	pub fn line(&self) -> Line {
		self.line
	}

	fn record(&mut self, high: bool) -> Result<(), RecorderError> {
		let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

		match inner.remaining {
			Some(0) => return Err(RecorderError),
			Some(ref mut left) => *left -= 1,
			None => {}
		}

		inner.events.push(Event { line: self.line, high });

		Ok(())
	}
}

impl ErrorType for RecorderPin {
	type Error = RecorderError;
}

impl OutputPin for RecorderPin {
	fn set_low(&mut self) -> Result<(), Self::Error> {
		self.record(false)
	}

	fn set_high(&mut self) -> Result<(), Self::Error> {
		self.record(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn samples_data_on_rising_clock_edges_only() {
		let recorder = Recorder::new();
		let (mut data, mut clock) = recorder.pins();

		data.set_high().unwrap();
		clock.set_high().unwrap();
		// a second high without a low in between is not an edge
		clock.set_high().unwrap();
		clock.set_low().unwrap();
		data.set_low().unwrap();
		clock.set_high().unwrap();
		clock.set_low().unwrap();

		assert_eq!(recorder.clocked_bits(), vec![true, false]);
	}

	#[test]
	fn fails_after_the_allowed_sets() {
		let recorder = Recorder::new();
		let (mut data, mut clock) = recorder.pins();
		recorder.fail_after(2);

		data.set_high().unwrap();
		clock.set_high().unwrap();
		assert_eq!(clock.set_low(), Err(RecorderError));
		assert_eq!(data.set_low(), Err(RecorderError));
		assert_eq!(recorder.events().len(), 2);

		recorder.recover();
		data.set_low().unwrap();
		assert_eq!(recorder.events().len(), 3);
	}

	#[test]
	fn short_trace_has_no_capture() {
		let recorder = Recorder::new();
		let (_, mut clock) = recorder.pins();

		clock.set_high().unwrap();
		clock.set_low().unwrap();

		assert_eq!(recorder.capture(), None);
	}
}
