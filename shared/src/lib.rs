#![no_std]

/// Number of APA102 LEDs on a Blinkt! board.
pub const LEDSTRIP_LENGTH: usize = 8;

pub const MAX_BRIGHTNESS: u8 = 31;
/// Half of max, what a freshly opened strip uses.
pub const DEFAULT_BRIGHTNESS: u8 = MAX_BRIGHTNESS >> 1;

pub const BYTES_PER_LED: usize = 4;
pub const PREAMBLE_LEN: usize = 4;
pub const UPDATE_LEN: usize = PREAMBLE_LEN + BYTES_PER_LED * LEDSTRIP_LENGTH;

/// Top three bits of every LED frame's first byte.
pub const FRAME_MARKER: u8 = 0b1110_0000;

pub const BRIGHTNESS_SHIFT: u32 = 24;
pub const BRIGHTNESS_MASK: u32 = 0x1F;
pub const COLOR_MASK: u32 = 0x00FF_FFFF;

/// The datasheets disagree on how long the end frame has to be, 36 zero clocks is what
/// reliably pushes the data through all 8 LEDs.
pub const LATCH_CLOCK_PULSES: usize = 36;
