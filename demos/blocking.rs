use blinkt::{recorder::Recorder, Blinkt, Board, Config, LEDSTRIP_LENGTH};
use color_eyre::Result;
use eyre::WrapErr;
use smart_leds::hsv::{hsv2rgb, Hsv};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Paints a rainbow across the strip at the lowest visible brightness.
///
/// There is no GPIO in here: the recorder stands in for the two lines and the frames that
/// would have reached the strip get logged instead. Pass a board id to see its wiring.
fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let board: Board = std::env::args().nth(1).as_deref().unwrap_or("rpi3").parse()?;
	info!(%board, data = board.data_line(), clock = board.clock_line(), "wiring");

	let recorder = Recorder::new();
	let (data, clock) = recorder.pins();
	let mut blinkt = Blinkt::new(data, clock, Config {
		brightness: 1,
		..Config::default()
	})
	.wrap_err("opening the strip")?;

	let rainbow: Vec<u32> = (0..LEDSTRIP_LENGTH)
		.map(|i| {
			let rgb = hsv2rgb(Hsv {
				hue: (i * 256 / LEDSTRIP_LENGTH) as u8,
				sat: 255,
				val: 255,
			});
			u32::from_be_bytes([0, rgb.r, rgb.g, rgb.b])
		})
		.collect();

	recorder.clear();
	let took = blinkt.write(&rainbow).wrap_err("writing the rainbow")?;
	info!(?took, "rainbow written");

	if let Some(capture) = recorder.capture() {
		for (led, frame) in capture.frames.iter().enumerate() {
			info!(led, ?frame, "frame");
		}
		info!(pulses = capture.latch_pulses, "latched");
	}

	blinkt.release()?;

	Ok(())
}
