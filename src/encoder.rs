use blinkt_shared::LATCH_CLOCK_PULSES;
use embedded_hal::digital::{OutputPin, PinState};

use crate::{state::StripState, Error, Line, Result};

/// Bit-bangs APA102 updates over a data line and a clock line.
///
/// Both lines are expected to be low-idle, active-high outputs. Every call blocks until the
/// last level change has been handed to the HAL.
pub struct Encoder<D, C> {
	data:  D,
	clock: C,
}

impl<D, C> Encoder<D, C>
where
	D: OutputPin,
	C: OutputPin,
{
	pub fn new(data: D, clock: C) -> Self {
		Self { data, clock }
	}

	/// Drives both lines low, the idle level the protocol starts from.
	pub fn idle(&mut self) -> Result<()> {
		self.set_data(false)?;
		self.set_clock(false)
	}

	/// Sends one complete update: preamble, a frame per LED in wire order, then the latch.
	///
	/// A line error aborts the update where it happened, the strip may then show a mix of
	/// old and new colors until the next successful call.
	pub fn show(&mut self, state: &StripState) -> Result<()> {
		for byte in state.wire_bytes() {
			self.write_byte(byte)?;
		}

		self.latch()
	}

	/// Write out a single byte, MSB first.
	pub fn write_byte(&mut self, byte: u8) -> Result<()> {
		for bit in (0..u8::BITS).rev() {
			self.set_data(byte & (1 << bit) != 0)?;
			self.pulse_clock()?;
		}

		Ok(())
	}

	/// End frame: zeros, not ones, clocked through the whole chain.
	pub fn latch(&mut self) -> Result<()> {
		self.set_data(false)?;

		for _ in 0..LATCH_CLOCK_PULSES {
			self.pulse_clock()?;
		}

		Ok(())
	}

	/// Gives the lines back.
	pub fn into_inner(self) -> (D, C) {
		(self.data, self.clock)
	}

	fn pulse_clock(&mut self) -> Result<()> {
		self.set_clock(true)?;
		self.set_clock(false)
	}

	fn set_data(&mut self, high: bool) -> Result<()> {
		self.data
			.set_state(PinState::from(high))
			.map_err(|e| Error::transport(Line::Data, &e))
	}

	fn set_clock(&mut self, high: bool) -> Result<()> {
		self.clock
			.set_state(PinState::from(high))
			.map_err(|e| Error::transport(Line::Clock, &e))
	}
}
