use blinkt_shared::{
	BRIGHTNESS_MASK,
	BRIGHTNESS_SHIFT,
	BYTES_PER_LED,
	COLOR_MASK,
	DEFAULT_BRIGHTNESS,
	FRAME_MARKER,
	LEDSTRIP_LENGTH,
	MAX_BRIGHTNESS,
	PREAMBLE_LEN,
};

use crate::{Error, Result};

/// The direction to apply colors in when writing LED data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
	#[default]
	Normal,
	Reversed,
}

/// Buffer index whose color goes out at wire `position`.
///
/// Reversed walks the buffer back to front, the physical order on the wire never changes.
pub const fn source_index(position: usize, direction: Direction) -> usize {
	match direction {
		Direction::Normal => position,
		Direction::Reversed => LEDSTRIP_LENGTH - 1 - position,
	}
}

/// Packs a 24 bit RGB color and a 5 bit brightness into one buffer word.
///
/// Bits of `color` above the low 24 are dropped.
pub const fn pack(color: u32, brightness: u8) -> u32 {
	((brightness as u32 & BRIGHTNESS_MASK) << BRIGHTNESS_SHIFT) | (color & COLOR_MASK)
}

/// The four bytes one LED receives: brightness with the frame marker, then blue, green, red.
pub const fn led_frame(word: u32) -> [u8; BYTES_PER_LED] {
	let [_, red, green, blue] = word.to_be_bytes();
	let brightness = ((word >> BRIGHTNESS_SHIFT) & BRIGHTNESS_MASK) as u8;

	[FRAME_MARKER | brightness, blue, green, red]
}

fn check_brightness(level: u8) -> Result<()> {
	if level > MAX_BRIGHTNESS {
		return Err(Error::InvalidBrightness(level));
	}

	Ok(())
}

fn check_index(index: usize) -> Result<()> {
	if index >= LEDSTRIP_LENGTH {
		return Err(Error::InvalidIndex(index));
	}

	Ok(())
}

/// In-memory colors of the strip plus the settings that shape how they are sent.
///
/// Nothing here touches the hardware; changes become visible on the next `show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripState {
	colors:     [u32; LEDSTRIP_LENGTH],
	brightness: u8,
	direction:  Direction,
}

impl Default for StripState {
	fn default() -> Self {
		Self::new()
	}
}

impl StripState {
	/// All LEDs off at the default brightness, normal direction.
	pub const fn new() -> Self {
		Self {
			colors:     [pack(0, DEFAULT_BRIGHTNESS); LEDSTRIP_LENGTH],
			brightness: DEFAULT_BRIGHTNESS,
			direction:  Direction::Normal,
		}
	}

	/// Sets the brightness used by later color sets that don't pass one.
	///
	/// Colors already in the buffer keep the brightness they were stored with.
	pub fn set_brightness(&mut self, level: u8) -> Result<()> {
		check_brightness(level)?;
		self.brightness = level;

		Ok(())
	}

	pub fn brightness(&self) -> u8 {
		self.brightness
	}

	pub fn set_direction(&mut self, direction: Direction) {
		self.direction = direction;
	}

	pub fn direction(&self) -> Direction {
		self.direction
	}

	/// Stores `color` for the LED at `index` using the current default brightness.
	pub fn set_color(&mut self, index: usize, color: u32) -> Result<()> {
		self.set_color_with_brightness(index, color, self.brightness)
	}

	/// Stores `color` for the LED at `index` with its own brightness.
	///
	/// Only the low 24 bits of `color` are kept.
	pub fn set_color_with_brightness(&mut self, index: usize, color: u32, brightness: u8) -> Result<()> {
		check_index(index)?;
		check_brightness(brightness)?;

		self.colors[index] = pack(color, brightness);

		Ok(())
	}

	/// The packed word stored for the LED at `index`.
	pub fn color(&self, index: usize) -> Result<u32> {
		self.colors.get(index).copied().ok_or(Error::InvalidIndex(index))
	}

	pub fn colors(&self) -> &[u32; LEDSTRIP_LENGTH] {
		&self.colors
	}

	/// Sets the first `min(colors.len(), LEDSTRIP_LENGTH)` LEDs with the default brightness.
	///
	/// Extra entries are ignored and LEDs past the end of `colors` keep their value.
	pub fn apply(&mut self, colors: &[u32]) {
		for (slot, color) in self.colors.iter_mut().zip(colors) {
			*slot = pack(*color, self.brightness);
		}
	}

	/// Turns every LED off, stored at the current default brightness.
	pub fn clear(&mut self) {
		self.colors = [pack(0, self.brightness); LEDSTRIP_LENGTH];
	}

	/// LED frames in the order they go out on the wire.
	pub fn frames(&self) -> impl Iterator<Item = [u8; BYTES_PER_LED]> + '_ {
		(0..LEDSTRIP_LENGTH).map(|position| led_frame(self.colors[source_index(position, self.direction)]))
	}

	/// Preamble followed by every LED frame, the byte framed part of an update.
	pub fn wire_bytes(&self) -> impl Iterator<Item = u8> + '_ {
		[0u8; PREAMBLE_LEN].into_iter().chain(self.frames().flatten())
	}
}
