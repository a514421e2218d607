mod browse;
mod cli;
mod client;
mod config;
mod fallback;
mod grid;
mod modal;
mod news;
mod rating;
mod render;
mod server;
mod state;
mod template;

use std::process::ExitCode;

use anyhow::Result;
use cli::{Args, Command};
use server::Server;
use state::State;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn set_up_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_regex(false)
                .with_default_directive(Level::INFO.into())
                .with_env_var("NEWSGRID_LOG")
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    set_up_logging();

    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();

        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("could not listen for Ctrl-C: {e:#}");
            }

            cancel.cancel();
        }
    });

    let mut tasks = match start(cancel.clone()).await {
        Ok(tasks) => tasks,

        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut exit_code = ExitCode::SUCCESS;

    while let Some(task_result) = tasks.join_next().await {
        cancel.cancel();

        match task_result {
            Ok(Ok(())) => {}

            Ok(Err(e)) => {
                error!("{e:#}");
                exit_code = ExitCode::FAILURE;
            }

            Err(e) => {
                error!("{e:#}");
                exit_code = ExitCode::FAILURE;
            }
        }
    }

    exit_code
}

async fn start(cancel: CancellationToken) -> Result<JoinSet<Result<()>>> {
    let mut args = Args::parse();
    let config_paths = args
        .config_path
        .take()
        .into_iter()
        .chain(["./newsgrid.toml".into(), "/etc/newsgrid.toml".into()])
        .collect::<Vec<_>>();
    let mut config = config::load(&config_paths)?;
    config.update(&args);
    let state = State::new(config)?;

    let mut tasks = JoinSet::new();

    match args.command {
        Command::Serve => {
            let server = Server::new(state).await?;
            tasks.spawn(server.serve(cancel));
        }

        Command::Browse => {
            tasks.spawn(browse::run(state, cancel));
        }

        Command::List => {
            tasks.spawn(list(state));
        }

        Command::Show { id } => {
            tasks.spawn(show(state, id));
        }

        Command::Status => {
            tasks.spawn(status(state));
        }
    }

    Ok(tasks)
}

async fn list(state: State) -> Result<()> {
    let (news, status) = tokio::join!(
        state.client.fetch_news(state.cfg.news_limit),
        state.client.api_status(),
    );

    println!("{}\n", render::status(&status));

    if !news.success {
        anyhow::bail!("the news service reported a failure");
    }

    if news.data.is_empty() {
        println!("No news found");
    }

    for (idx, item) in news.data.iter().enumerate() {
        println!("{}", render::card(idx + 1, item, &state.cfg.rating));
    }

    Ok(())
}

async fn show(state: State, id: i64) -> Result<()> {
    let news = state.client.fetch_news_by_id(id).await?;
    let item = news
        .data
        .iter()
        .find(|item| item.id == id)
        .ok_or(client::FetchError::NotFound(id))?;

    println!("{}", render::detail(item, &state.cfg.rating));

    Ok(())
}

async fn status(state: State) -> Result<()> {
    let status = state.client.api_status().await;
    println!("{}", render::status(&status));

    Ok(())
}
