//! Async access to a single driver from many tasks.
//!
//! The driver itself has no locking. [`BlinktHandle`] moves it onto a blocking task that owns
//! the lines and runs one command at a time, in the order they arrive.

use embedded_hal::digital::OutputPin;
use tokio::{
	sync::{mpsc, oneshot},
	task,
};
use tracing::debug;

use crate::{Blinkt, Config, Direction, Error, Result, StripState, WriteResult};

const COMMAND_BUFFER: usize = 16;

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command<D, C> {
	SetConfig(Config, Reply<()>),
	SetBrightness(u8, Reply<()>),
	SetDirection(Direction, Reply<()>),
	SetColor {
		index:      usize,
		color:      u32,
		brightness: Option<u8>,
		reply:      Reply<()>,
	},
	Clear(Reply<()>),
	State(Reply<StripState>),
	Write(Vec<u32>, Reply<WriteResult>),
	Show(Reply<WriteResult>),
	Release(Reply<(D, C)>),
}

/// Cloneable async front for a [`Blinkt`] running on its own blocking task.
pub struct BlinktHandle<D, C> {
	commands: mpsc::Sender<Command<D, C>>,
}

impl<D, C> Clone for BlinktHandle<D, C> {
	fn clone(&self) -> Self {
		Self {
			commands: self.commands.clone(),
		}
	}
}

impl<D, C> BlinktHandle<D, C>
where
	D: OutputPin + Send + 'static,
	C: OutputPin + Send + 'static,
{
	/// Opens the strip on a blocking task, see [`Blinkt::new`].
	pub async fn new(data: D, clock: C, config: Config) -> Result<Self> {
		let blinkt = task::spawn_blocking(move || Blinkt::new(data, clock, config))
			.await
			.map_err(|_| Error::Disconnected)??;

		Ok(Self::spawn(blinkt))
	}

	/// Moves an open driver onto a blocking task. Has to be called from within a tokio runtime.
	pub fn spawn(blinkt: Blinkt<D, C>) -> Self {
		let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
		task::spawn_blocking(move || run(blinkt, receiver));

		Self { commands }
	}

	async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command<D, C>) -> Result<T> {
		let (reply, response) = oneshot::channel();

		self.commands
			.send(command(reply))
			.await
			.map_err(|_| Error::Disconnected)?;

		response.await.map_err(|_| Error::Disconnected)?
	}

	pub async fn set_config(&self, config: Config) -> Result<()> {
		self.request(|reply| Command::SetConfig(config, reply)).await
	}

	pub async fn set_brightness(&self, level: u8) -> Result<()> {
		self.request(|reply| Command::SetBrightness(level, reply)).await
	}

	pub async fn brightness(&self) -> Result<u8> {
		Ok(self.state().await?.brightness())
	}

	pub async fn set_direction(&self, direction: Direction) -> Result<()> {
		self.request(|reply| Command::SetDirection(direction, reply)).await
	}

	pub async fn direction(&self) -> Result<Direction> {
		Ok(self.state().await?.direction())
	}

	pub async fn set_color(&self, index: usize, color: u32) -> Result<()> {
		self.request(|reply| Command::SetColor {
			index,
			color,
			brightness: None,
			reply,
		})
		.await
	}

	pub async fn set_color_with_brightness(&self, index: usize, color: u32, brightness: u8) -> Result<()> {
		self.request(|reply| Command::SetColor {
			index,
			color,
			brightness: Some(brightness),
			reply,
		})
		.await
	}

	pub async fn color(&self, index: usize) -> Result<u32> {
		self.state().await?.color(index)
	}

	pub async fn clear(&self) -> Result<()> {
		self.request(Command::Clear).await
	}

	/// Snapshot of the driver's colors and settings.
	pub async fn state(&self) -> Result<StripState> {
		self.request(Command::State).await
	}

	pub async fn write(&self, colors: Vec<u32>) -> Result<WriteResult> {
		self.request(|reply| Command::Write(colors, reply)).await
	}

	pub async fn show(&self) -> Result<WriteResult> {
		self.request(Command::Show).await
	}

	/// Stops the driver task and returns the lines. Every clone fails with
	/// [`Error::Disconnected`] afterwards.
	pub async fn release(&self) -> Result<(D, C)> {
		self.request(Command::Release).await
	}
}

fn run<D, C>(mut blinkt: Blinkt<D, C>, mut commands: mpsc::Receiver<Command<D, C>>)
where
	D: OutputPin,
	C: OutputPin,
{
	debug!("driver task started");

	while let Some(command) = commands.blocking_recv() {
		// the caller may have given up waiting, nothing to do about that here
		let _ = match command {
			Command::SetConfig(config, reply) => reply.send(blinkt.set_config(config)).is_ok(),
			Command::SetBrightness(level, reply) => reply.send(blinkt.set_brightness(level)).is_ok(),
			Command::SetDirection(direction, reply) => {
				blinkt.set_direction(direction);
				reply.send(Ok(())).is_ok()
			}
			Command::SetColor {
				index,
				color,
				brightness,
				reply,
			} => {
				let result = match brightness {
					Some(brightness) => blinkt.set_color_with_brightness(index, color, brightness),
					None => blinkt.set_color(index, color),
				};
				reply.send(result).is_ok()
			}
			Command::Clear(reply) => {
				blinkt.clear();
				reply.send(Ok(())).is_ok()
			}
			Command::State(reply) => reply.send(Ok(blinkt.state().clone())).is_ok(),
			Command::Write(colors, reply) => reply.send(blinkt.write(&colors)).is_ok(),
			Command::Show(reply) => reply.send(blinkt.show()).is_ok(),
			Command::Release(reply) => {
				let _ = reply.send(blinkt.release());
				debug!("driver task released the lines");
				return;
			}
		};
	}

	debug!("all handles dropped, driver task stopping");
}
