use tracing::info;

use crate::{Context, Error};

pub fn quit(ctx: &mut Context<'_>) -> Result<(), Error> {
    info!("quit: requested");
    ctx.state.running = false;
    ctx.say("Goodbye!")?;
    Ok(())
}
