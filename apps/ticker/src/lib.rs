use std::{
    io::{self, Write},
    sync::Arc,
};

use stock::MarketData;

pub mod command;
pub mod config;
pub mod render;
pub mod shell;
pub mod state;

use config::Config;
use render::ChartRenderer;
use state::ProgramState;

pub struct Data {
    pub market: Arc<dyn MarketData>,
    pub renderer: Arc<dyn ChartRenderer>,
    pub config: Config,
}

pub type Error = anyhow::Error;

/// Everything a command handler may touch while it runs.
pub struct Context<'a> {
    pub data: &'a Data,
    pub state: &'a mut ProgramState,
    pub out: &'a mut dyn Write,
}

impl Context<'_> {
    /// Print one line and flush it.
    pub fn say(&mut self, msg: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", msg.as_ref())?;
        self.out.flush()
    }
}
