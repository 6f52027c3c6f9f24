use tracing::info;

use crate::{Context, Error, state::LogStyle};

pub fn watchlog(ctx: &mut Context<'_>) -> Result<(), Error> {
    ctx.state.log_style = ctx.state.log_style.toggled();
    info!(style = ?ctx.state.log_style, "watchlog: toggled");

    match ctx.state.log_style {
        LogStyle::Overwrite => ctx.say("Toggled logging style to a single line.")?,
        LogStyle::Append => ctx.say("Toggled logging style to multiple lines.")?,
    }

    Ok(())
}
