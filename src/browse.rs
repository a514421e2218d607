use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

use crate::grid::{Event, Grid};
use crate::modal::CloseRequest;
use crate::render;
use crate::state::State;

#[derive(Debug, PartialEq)]
enum Command {
    Event(Event),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();

    let command = match line {
        "q" | "quit" => Command::Quit,
        "r" | "reload" => Command::Event(Event::Reload),
        "x" | "close" => Command::Event(Event::Close(CloseRequest::Button)),
        "esc" => Command::Event(Event::Close(CloseRequest::Escape)),
        "bg" => Command::Event(Event::Close(CloseRequest::Backdrop { on_backdrop: true })),
        "dialog" => Command::Event(Event::Close(CloseRequest::Backdrop { on_backdrop: false })),

        _ => {
            let position = line.parse::<usize>().ok().filter(|&n| n > 0)?;

            Command::Event(Event::Select(position - 1))
        }
    };

    Some(command)
}

const HELP: &str = "Commands: <n> open card n, x close, esc dismiss, bg click the backdrop, \
    r reload, q quit";

/// Runs the news grid in the terminal until the input ends, `q` is entered or `cancel` fires.
pub async fn run(state: State, cancel: CancellationToken) -> Result<()> {
    async move {
        let (mut grid, mut events) =
            Grid::new(state.client.clone(), state.cfg.news_limit, &state.cfg.modal);
        let scale = state.cfg.rating;
        let mut lines = BufReader::new(io::stdin()).lines();

        grid.mount();
        println!("{}\n{HELP}", render::grid(&grid, &scale));

        loop {
            let changed = select! {
                _ = cancel.cancelled() => break,

                line = lines.next_line() => {
                    let Some(line) = line.context("could not read from stdin")? else {
                        break;
                    };

                    match parse_command(&line) {
                        Some(Command::Quit) => break,
                        Some(Command::Event(event)) => grid.handle(event),

                        None => {
                            println!("{HELP}");

                            false
                        }
                    }
                }

                Some(event) = events.recv() => grid.handle(event),
            };

            if changed {
                println!("{}", render::grid(&grid, &scale));
            }
        }

        grid.unmount();
        debug!("Leaving the news grid");

        Ok(())
    }
    .instrument(info_span!("browse"))
    .await
}
