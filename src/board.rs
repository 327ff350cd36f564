use std::{fmt, str::FromStr};

use crate::Error;

/// Boards with a known Blinkt! wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
	Rpi3,
	Imx6ulPico,
	Imx7dPico,
}

impl Board {
	pub const ALL: [Board; 3] = [Board::Rpi3, Board::Imx6ulPico, Board::Imx7dPico];

	/// Identifier the board reports for itself.
	pub fn id(self) -> &'static str {
		match self {
			Board::Rpi3 => "rpi3",
			Board::Imx6ulPico => "imx6ul_pico",
			Board::Imx7dPico => "imx7d_pico",
		}
	}

	/// Name of the GPIO line the strip's data input is wired to.
	pub fn data_line(self) -> &'static str {
		match self {
			Board::Rpi3 => "BCM23",
			Board::Imx6ulPico => "GPIO2_IO00",
			Board::Imx7dPico => "GPIO6_IO13",
		}
	}

	/// Name of the GPIO line the strip's clock input is wired to.
	pub fn clock_line(self) -> &'static str {
		match self {
			Board::Rpi3 => "BCM24",
			Board::Imx6ulPico => "GPIO2_IO01",
			Board::Imx7dPico => "GPIO6_IO12",
		}
	}
}

impl FromStr for Board {
	type Err = Error;

	fn from_str(id: &str) -> Result<Self, Self::Err> {
		Board::ALL
			.into_iter()
			.find(|board| board.id() == id)
			.ok_or_else(|| Error::UnknownBoard(id.to_string()))
	}
}

impl fmt::Display for Board {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.id())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolves_known_boards() {
		let rpi3: Board = "rpi3".parse().unwrap();
		assert_eq!((rpi3.data_line(), rpi3.clock_line()), ("BCM23", "BCM24"));

		let imx6ul: Board = "imx6ul_pico".parse().unwrap();
		assert_eq!((imx6ul.data_line(), imx6ul.clock_line()), ("GPIO2_IO00", "GPIO2_IO01"));

		let imx7d: Board = "imx7d_pico".parse().unwrap();
		assert_eq!((imx7d.data_line(), imx7d.clock_line()), ("GPIO6_IO13", "GPIO6_IO12"));
	}

	#[test]
	fn id_round_trips_through_display() {
		for board in Board::ALL {
			assert_eq!(board.to_string().parse::<Board>().unwrap(), board);
		}
	}

	#[test]
	fn unknown_board_is_an_error() {
		let err = "rpi4".parse::<Board>().unwrap_err();
		assert!(matches!(err, Error::UnknownBoard(ref id) if id == "rpi4"));
		assert_eq!(err.to_string(), "unknown board \"rpi4\"");
	}
}
