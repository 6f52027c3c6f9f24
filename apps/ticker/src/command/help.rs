use crate::{Context, Error};

const COMMANDS: &[(&str, &str)] = &[
    ("help", "View this list of commands."),
    ("info <ticker>", "View the information about a certain stock."),
    ("watch <ticker>", "Watch a stock's price. Ctrl-C stops watching."),
    (
        "graph <ticker> <period> [save]",
        "Generate a graph for a ticker. Periods: day, week, month, halfyear, year.",
    ),
    ("watchlog", "Toggles the logging style of the watch feature."),
    ("stop,quit,exit", "Stop the program."),
];

pub fn help(ctx: &mut Context<'_>) -> Result<(), Error> {
    ctx.say("\nAvailable commands:")?;
    for (usage, what) in COMMANDS {
        ctx.say(format!("- {usage} | {what}"))?;
    }
    ctx.say("<...>: required, [...]: optional\n")?;
    Ok(())
}
