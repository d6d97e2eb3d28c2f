use kindling::core::dispatcher::ActionDispatcher;
use kindling::core::poller::Poller;
use kindling::core::r#loop::{input_loop, render_loop};
use kindling::core::state::{AppState, CliArgs, Credentials, KindlingConfig};
use kindling::core::bus::redraw_channel;
use kindling::io::input::spawn_input_reader;
use kindling::io::terminal::TerminalFrontend;
use kindling::logging;
use kindling::remote::{HttpRemote, RemoteClient};

use anyhow::{Context, Result};
use colored::*;
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => fatal("Error", e),
    };
    if cli.init {
        return init_config(&cli.config_path());
    }

    // 1. Configuration & credentials
    let config = KindlingConfig::load(&cli.config_path())?;
    let credentials = match Credentials::resolve(&cli, |key| env::var(key).ok()) {
        Ok(c) => c,
        Err(e) => fatal("Error", e),
    };
    logging::init(&config.log_file)?;

    // 2. Authenticate before anything runs concurrently
    let remote = Arc::new(HttpRemote::new(
        &config.api_base_url,
        credentials,
        config.remote_timeout(),
    )?);
    println!("{} Authenticating against {}...", "🔑".cyan(), config.api_base_url);
    if let Err(e) = remote.authenticate().await {
        fatal("Could not authenticate", e);
    }

    let (redraw, listener) = redraw_channel();
    let state = AppState::new(config, remote, redraw);
    let keys = state.config.keys.clone();

    // 3. Terminal, then the three tasks
    let (frontend, guard) = TerminalFrontend::enter(keys.clone())?;
    info!("session started");

    let poller = tokio::spawn(Poller::from_state(&state).run());
    let renderer = tokio::spawn(render_loop(
        state.store.clone(),
        listener,
        frontend,
        state.config.match_list_limit,
    ));

    let (command_tx, command_rx) = mpsc::channel(16);
    let _reader = spawn_input_reader(keys, command_tx).context("Failed to start input reader")?;
    input_loop(command_rx, ActionDispatcher::from_state(&state), state.redraw.clone()).await;

    // 4. Shutdown: no draining of in-flight remote calls
    poller.abort();
    renderer.abort();
    let _ = poller.await;
    let _ = renderer.await;
    drop(guard);

    info!("session ended");
    println!("{}", "👋 Bye.".green());
    Ok(())
}

fn fatal(what: &str, err: impl Display) -> ! {
    eprintln!("{} {}: {}", "❌".red(), what.red().bold(), err);
    std::process::exit(1);
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("{} {} already exists.", "✅".green(), path.display());
        return Ok(());
    }
    let toml = toml::to_string_pretty(&KindlingConfig::default())?;
    fs::write(path, toml).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Wrote default config to {}", "🧬".green(), path.display());
    Ok(())
}
