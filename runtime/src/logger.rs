use std::time::SystemTime;

use log::{Level, LevelFilter};
use nu_ansi_term::ansi::RESET;
use nu_ansi_term::{Color, Style};

/// A colored, timestamped `log::Log` backend writing to stderr.
///
/// stdout is reserved for the receiver's delivered byte stream, so all
/// diagnostic output -- on both the sender and the receiver -- goes to
/// stderr through this backend rather than through `println!`.
pub struct Logger {
	max_level: LevelFilter,
}

impl Logger {
	pub fn new(max_level: LevelFilter) -> Self {
		Self { max_level }
	}

	/// Installs this backend as the global `log` logger.
	pub fn init(max_level: LevelFilter) {
		let logger = Self::new(max_level);
		log::set_max_level(max_level);
		if log::set_boxed_logger(Box::new(logger)).is_err() {
			// A logger is already installed; leave it in place rather than panicking.
		}
	}
}

impl log::Log for Logger {
	fn enabled(&self, metadata: &log::Metadata) -> bool {
		metadata.level() <= self.max_level
	}

	fn log(&self, record: &log::Record) {
		if !self.enabled(record.metadata()) {
			return;
		}

		let time = humantime::format_rfc3339_nanos(SystemTime::now());

		let dim = Style::new().dimmed().prefix();

		eprintln!(
			"{dim}{time}{RESET} {}{:5}{RESET} {}{}{RESET}{dim}:{RESET} {}",
			match record.level() {
				Level::Trace => Color::Purple,
				Level::Debug => Color::Blue,
				Level::Info => Color::Green,
				Level::Warn => Color::Yellow,
				Level::Error => Color::Red,
			}
			.bold()
			.prefix(),
			record.level(),
			Style::new().bold().prefix(),
			record.target(),
			record.args()
		);
	}

	fn flush(&self) {}
}
