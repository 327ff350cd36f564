use std::fmt;
#[cfg(feature = "timings")]
use std::time::{Duration, Instant};

pub use blinkt_shared::{DEFAULT_BRIGHTNESS, LEDSTRIP_LENGTH, MAX_BRIGHTNESS};
use embedded_hal::digital::{self, ErrorKind, OutputPin};
use thiserror::Error;
use tracing::{debug, trace, warn};

pub mod board;
pub mod encoder;
pub mod recorder;
pub mod state;
#[cfg(feature = "tokio")]
pub mod tokio;

pub use board::Board;
pub use encoder::Encoder;
pub use state::{Direction, StripState};

/// One of the two lines the strip is driven through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
	Data,
	Clock,
}

impl fmt::Display for Line {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Line::Data => f.write_str("data"),
			Line::Clock => f.write_str("clock"),
		}
	}
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("brightness needs to be between 0 and {max}, got {0}", max = MAX_BRIGHTNESS)]
	InvalidBrightness(u8),
	#[error("led index needs to be below {len}, got {0}", len = LEDSTRIP_LENGTH)]
	InvalidIndex(usize),
	#[error("writing the {line} line failed: {kind}")]
	Transport { line: Line, kind: ErrorKind },
	#[error("unknown board \"{0}\"")]
	UnknownBoard(String),
	#[cfg(feature = "tokio")]
	#[error("the driver task has shut down")]
	Disconnected,
}

impl Error {
	pub(crate) fn transport<E: digital::Error>(line: Line, err: &E) -> Self {
		Error::Transport { line, kind: err.kind() }
	}

	/// Whether the call was rejected for its arguments rather than failing on the lines.
	pub fn is_invalid_argument(&self) -> bool {
		matches!(self, Error::InvalidBrightness(_) | Error::InvalidIndex(_))
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// How long an update took on the wire.
#[cfg(feature = "timings")]
pub type WriteResult = Duration;
#[cfg(not(feature = "timings"))]
pub type WriteResult = ();

/// Settings applied to the strip when the driver is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	pub brightness: u8,
	pub direction:  Direction,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			brightness: DEFAULT_BRIGHTNESS,
			direction:  Direction::Normal,
		}
	}
}

/// Blinkt! driver over a data line and a clock line.
pub struct Blinkt<D, C> {
	encoder: Encoder<D, C>,
	state:   StripState,
}

impl<D, C> Blinkt<D, C>
where
	D: OutputPin,
	C: OutputPin,
{
	/// Create a new instance driving the strip through `data` and `clock`.
	///
	/// Both lines are pulled low and the strip is switched off, so whatever it showed before
	/// is gone once this returns.
	pub fn new(data: D, clock: C, config: Config) -> Result<Self> {
		let mut state = StripState::new();
		state.set_brightness(config.brightness)?;
		state.set_direction(config.direction);
		state.clear();

		let mut encoder = Encoder::new(data, clock);
		encoder.idle()?;

		let mut blinkt = Self { encoder, state };
		blinkt.show()?;

		debug!(brightness = config.brightness, direction = ?config.direction, "blinkt opened");

		Ok(blinkt)
	}

	/// Drives both lines low and hands them back, dropping them releases them in the HAL.
	pub fn release(mut self) -> Result<(D, C)> {
		self.encoder.idle()?;
		debug!("blinkt released");

		Ok(self.encoder.into_inner())
	}

	/// Sets the configuration for the instance.
	///
	/// Colors already stored keep their brightness, nothing is sent until the next `show`.
	pub fn set_config(&mut self, config: Config) -> Result<()> {
		self.state.set_brightness(config.brightness)?;
		self.state.set_direction(config.direction);
		debug!(brightness = config.brightness, direction = ?config.direction, "blinkt configured");

		Ok(())
	}

	/// Sets the brightness new colors get when none is given, between 0 and [`MAX_BRIGHTNESS`].
	pub fn set_brightness(&mut self, level: u8) -> Result<()> {
		self.state.set_brightness(level)
	}

	pub fn brightness(&self) -> u8 {
		self.state.brightness()
	}

	pub fn set_direction(&mut self, direction: Direction) {
		self.state.set_direction(direction);
	}

	pub fn direction(&self) -> Direction {
		self.state.direction()
	}

	/// Sets a color in memory with the current brightness, call `show` to display it.
	pub fn set_color(&mut self, index: usize, color: u32) -> Result<()> {
		self.state.set_color(index, color)
	}

	/// Sets a color in memory with its own brightness, call `show` to display it.
	pub fn set_color_with_brightness(&mut self, index: usize, color: u32, brightness: u8) -> Result<()> {
		self.state.set_color_with_brightness(index, color, brightness)
	}

	pub fn color(&self, index: usize) -> Result<u32> {
		self.state.color(index)
	}

	pub fn colors(&self) -> &[u32; LEDSTRIP_LENGTH] {
		self.state.colors()
	}

	/// Turns every LED off in memory.
	pub fn clear(&mut self) {
		self.state.clear();
	}

	pub fn state(&self) -> &StripState {
		&self.state
	}

	/// Sets the first colors with the current brightness and displays the whole strip.
	///
	/// Entries past [`LEDSTRIP_LENGTH`] are ignored, LEDs without an entry keep their color.
	pub fn write(&mut self, colors: &[u32]) -> Result<WriteResult> {
		self.state.apply(colors);
		self.show()
	}

	/// Sends the colors in memory to the strip.
	pub fn show(&mut self) -> Result<WriteResult> {
		#[cfg(feature = "timings")]
		let start = Instant::now();

		trace!(direction = ?self.state.direction(), "sending update");
		if let Err(err) = self.encoder.show(&self.state) {
			warn!(%err, "update aborted, strip may be partially updated");
			return Err(err);
		}

		#[cfg(feature = "timings")]
		return Ok(start.elapsed());

		#[cfg(not(feature = "timings"))]
		Ok(())
	}
}

impl<D, C> fmt::Debug for Blinkt<D, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Blinkt").field("state", &self.state).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::recorder::{Recorder, RecorderPin};

	fn open(config: Config) -> (Recorder, Blinkt<RecorderPin, RecorderPin>) {
		let recorder = Recorder::new();
		let (data, clock) = recorder.pins();
		let blinkt = Blinkt::new(data, clock, config).unwrap();

		(recorder, blinkt)
	}

	#[test]
	fn new_idles_lines_then_shows_all_off() {
		let (recorder, blinkt) = open(Config::default());

		let events = recorder.events();
		assert!(!events[0].high && events[0].line == Line::Data);
		assert!(!events[1].high && events[1].line == Line::Clock);

		let capture = recorder.capture().unwrap();
		assert!(capture.frames.iter().all(|frame| *frame == [0xEF, 0, 0, 0]));
		assert_eq!(capture.latch_pulses, blinkt_shared::LATCH_CLOCK_PULSES);
		assert_eq!(blinkt.brightness(), DEFAULT_BRIGHTNESS);
	}

	#[test]
	fn new_applies_config() {
		let (_, blinkt) = open(Config {
			brightness: 1,
			direction:  Direction::Reversed,
		});

		assert_eq!(blinkt.brightness(), 1);
		assert_eq!(blinkt.direction(), Direction::Reversed);
	}

	#[test]
	fn new_rejects_bad_brightness_before_touching_lines() {
		let recorder = Recorder::new();
		let (data, clock) = recorder.pins();

		let err = Blinkt::new(data, clock, Config { brightness: 40, ..Config::default() }).unwrap_err();
		assert!(matches!(err, Error::InvalidBrightness(40)));
		assert!(recorder.events().is_empty());
	}

	#[test]
	fn new_fails_when_a_line_fails() {
		let recorder = Recorder::new();
		let (data, clock) = recorder.pins();
		recorder.fail_after(10);

		let err = Blinkt::new(data, clock, Config::default()).unwrap_err();
		assert!(matches!(err, Error::Transport { kind: ErrorKind::Other, .. }));
	}

	#[test]
	fn set_config_keeps_colors() {
		let (_, mut blinkt) = open(Config::default());
		blinkt.set_color(0, 0x0000FF).unwrap();

		blinkt
			.set_config(Config {
				brightness: 31,
				direction:  Direction::Reversed,
			})
			.unwrap();

		assert_eq!(blinkt.color(0).unwrap(), (15 << 24) | 0xFF);
		assert_eq!(blinkt.brightness(), 31);
		assert!(blinkt.set_config(Config { brightness: 32, ..Config::default() }).is_err());
		assert_eq!(blinkt.brightness(), 31);
	}

	#[test]
	fn release_idles_and_returns_the_lines() {
		let (recorder, blinkt) = open(Config::default());
		recorder.clear();

		let (data, clock) = blinkt.release().unwrap();
		assert_eq!(data.line(), Line::Data);
		assert_eq!(clock.line(), Line::Clock);
		assert_eq!(recorder.events().len(), 2);
	}

	#[test]
	fn error_messages() {
		assert_eq!(
			Error::InvalidBrightness(32).to_string(),
			"brightness needs to be between 0 and 31, got 32"
		);
		assert_eq!(Error::InvalidIndex(8).to_string(), "led index needs to be below 8, got 8");
		assert_eq!(
			Error::Transport {
				line: Line::Clock,
				kind: ErrorKind::Other,
			}
			.to_string(),
			format!("writing the clock line failed: {}", ErrorKind::Other)
		);
		assert!(!Error::UnknownBoard("x".into()).is_invalid_argument());
	}
}
