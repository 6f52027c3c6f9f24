use std::{fmt, str::FromStr};

use stock::Ticker;
use tokio::time::Instant;

/// Price remembered before the first poll of a watch.
pub const PRICE_SENTINEL: &str = "0.00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogStyle {
    /// Rewrite a single terminal line in place.
    #[default]
    Overwrite,
    /// One line per poll.
    Append,
}

impl LogStyle {
    pub fn toggled(self) -> Self {
        match self {
            LogStyle::Overwrite => LogStyle::Append,
            LogStyle::Append => LogStyle::Overwrite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogStyle(String);

impl fmt::Display for UnknownLogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log style \"{}\", expected overwrite or append", self.0)
    }
}

impl std::error::Error for UnknownLogStyle {}

impl FromStr for LogStyle {
    type Err = UnknownLogStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" | "single" => Ok(LogStyle::Overwrite),
            "append" | "multi" => Ok(LogStyle::Append),
            other => Err(UnknownLogStyle(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Watched {
    pub ticker: Ticker,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramState {
    pub running: bool,
    /// `Some` exactly while the watch loop owns the terminal.
    pub watched: Option<Watched>,
    pub last_update: Instant,
    pub last_price: String,
    pub log_style: LogStyle,
    /// Width of the line last written in place, so a shorter one can blank it.
    pub line_width: usize,
}

impl ProgramState {
    pub fn new(log_style: LogStyle) -> Self {
        Self {
            running: true,
            watched: None,
            last_update: Instant::now(),
            last_price: PRICE_SENTINEL.to_string(),
            log_style,
            line_width: 0,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watched.is_some()
    }

    pub fn start_watching(&mut self, watched: Watched) {
        self.watched = Some(watched);
        self.last_update = Instant::now();
        self.last_price = PRICE_SENTINEL.to_string();
        self.line_width = 0;
    }

    pub fn reset_watching(&mut self) {
        self.watched = None;
        self.last_update = Instant::now();
        self.last_price = PRICE_SENTINEL.to_string();
        self.line_width = 0;
    }
}
