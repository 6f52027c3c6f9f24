use std::io::Write;

use anyhow::Result;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    select,
    sync::mpsc::UnboundedReceiver,
    time::sleep_until,
};
use tracing::{debug, info};

use crate::{Context, Data, command, state::ProgramState};

const PROMPT: &str = "Enter a command. ('help' for a list of commands)\n» ";

/// Interactive loop. Reads commands while idle and polls the watched ticker
/// while watching; never both at once.
pub struct Shell {
    data: Data,
    state: ProgramState,
    out: Box<dyn Write>,
}

impl Shell {
    pub fn new(data: Data, out: Box<dyn Write>) -> Self {
        let state = ProgramState::new(data.config.log_style);
        Self { data, state, out }
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    /// Run until `quit`, end of input, or an interrupt while idle.
    ///
    /// Interrupts are only looked at while waiting for input or for the next
    /// poll, so a command or fetch in flight always finishes first.
    pub async fn run<R>(&mut self, input: R, interrupts: &mut UnboundedReceiver<()>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        while self.state.running {
            if self.state.is_watching() {
                let deadline = self.state.last_update + self.data.config.watch_interval;
                select! {
                    _ = sleep_until(deadline) => self.report().await?,
                    Some(()) = interrupts.recv() => {
                        self.interrupt()?;
                    }
                }
                continue;
            }

            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;

            select! {
                line = lines.next_line() => match line? {
                    Some(line) => self.execute(&line).await?,
                    None => {
                        debug!("input closed");
                        writeln!(self.out)?;
                        self.state.running = false;
                    }
                },
                Some(()) = interrupts.recv() => {
                    writeln!(self.out)?;
                    self.interrupt()?;
                }
            }
        }

        info!("shell stopped");
        Ok(())
    }

    /// Handle one line of input as if it had been typed at the prompt.
    pub async fn execute(&mut self, line: &str) -> Result<()> {
        let mut ctx = self.context();
        command::dispatch(&mut ctx, line).await
    }

    /// Ctrl-C: stop watching if we are, otherwise stop the shell.
    /// Returns whether the shell keeps running.
    pub fn interrupt(&mut self) -> Result<bool> {
        if let Some(watched) = self.state.watched.as_ref() {
            info!(symbol = %watched.ticker, "watch: cancelled");
            self.state.reset_watching();
            writeln!(self.out, "\nCancelled watching.\n")?;
            self.out.flush()?;
            return Ok(true);
        }

        info!("interrupted while idle");
        self.state.running = false;
        writeln!(self.out, "Goodbye!")?;
        self.out.flush()?;
        Ok(false)
    }

    async fn report(&mut self) -> Result<()> {
        let mut ctx = self.context();
        command::report(&mut ctx).await
    }

    fn context(&mut self) -> Context<'_> {
        Context {
            data: &self.data,
            state: &mut self.state,
            out: &mut *self.out,
        }
    }
}
