use std::time::Duration;

use blinkt::{recorder::Recorder, tokio::BlinktHandle, Config, Direction, LEDSTRIP_LENGTH};
use color_eyre::Result;
use eyre::WrapErr;
use tokio::task::JoinSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A handful of tasks light up one LED each through clones of the same handle.
#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let recorder = Recorder::new();
	let (data, clock) = recorder.pins();
	let handle = BlinktHandle::new(data, clock, Config {
		brightness: 4,
		direction:  Direction::Reversed,
	})
	.await
	.wrap_err("opening the strip")?;

	let mut tasks = JoinSet::new();
	for index in 0..LEDSTRIP_LENGTH {
		let handle = handle.clone();
		tasks.spawn(async move {
			tokio::time::sleep(Duration::from_millis(20 * index as u64)).await;
			handle.set_color(index, 0x0020FF >> index).await?;
			handle.show().await
		});
	}

	while let Some(result) = tasks.join_next().await {
		let took = result??;
		info!(?took, "update sent");
	}

	let state = handle.state().await?;
	info!(colors = ?state.colors(), "final buffer");

	handle.release().await?;
	info!(bits = recorder.clocked_bits().len(), "lines released");

	Ok(())
}
