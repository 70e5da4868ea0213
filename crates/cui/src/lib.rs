mod actions;
mod app;
mod input;
mod telemetry;
mod view;

use anyhow::{Context, Result};
use app::{channel_observer, App};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use deckdraw_core::{DrawMode, SessionConfig};
use deckdraw_session::{DeckSession, HttpDeckService};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub mode: Option<DrawMode>,
    pub api_url: Option<String>,
    pub log_path: Option<PathBuf>,
}

pub fn run(options: LaunchOptions) -> Result<()> {
    telemetry::init_tracing(options.log_path.as_deref())?;

    let mut config = SessionConfig::from_vars(|key| std::env::var(key).ok());
    if let Some(mode) = options.mode {
        config.mode = mode;
    }
    if let Some(url) = options.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    info!(mode = config.mode.label(), api = %config.api_base_url, "starting deckdraw-cui");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("build async runtime")?;
    let service = HttpDeckService::new(&config)
        .map_err(|err| anyhow::anyhow!(err))
        .context("create deck service client")?;
    let (observer, events) = channel_observer();
    let mode = config.mode;
    let session = Arc::new(DeckSession::new(
        Arc::new(service),
        observer,
        config,
        runtime.handle().clone(),
    ));
    let mut app = App::new(mode, session, runtime.handle().clone(), events);

    ensure_interactive_terminal()?;
    app.begin_loading();

    enable_raw_mode().map_err(|err| {
        anyhow::anyhow!(
            "failed to enable raw mode; ensure the process owns an interactive terminal: {err}"
        )
    })?;
    let mut stdout = stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let run_result = run_loop(&mut terminal, &mut app);
    app.shutdown();
    restore_terminal(&mut terminal)?;
    runtime.shutdown_timeout(Duration::from_secs(1));
    run_result
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    let options = parse_options(args);
    run(options)
}

fn parse_options(args: &[String]) -> LaunchOptions {
    let mut mode = None;
    let mut api_url = None;
    let mut log_path = std::env::var_os("DECKDRAW_LOG").map(PathBuf::from);
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--mode" | "-m" => {
                if let Some(value) = args.get(idx + 1) {
                    mode = DrawMode::parse(value);
                    idx += 1;
                }
            }
            "--auto" => mode = Some(DrawMode::Auto),
            "--api" => {
                if let Some(value) = args.get(idx + 1) {
                    api_url = Some(value.clone());
                    idx += 1;
                }
            }
            "--log" => {
                if let Some(value) = args.get(idx + 1) {
                    log_path = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    LaunchOptions {
        mode,
        api_url,
        log_path,
    }
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    while !app.should_quit {
        app.pump_events();
        terminal.draw(|frame| view::draw(frame, app))?;
        if event::poll(tick_rate)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = input::map_key(key);
                actions::dispatch(app, action);
            }
        } else {
            app.on_tick();
        }
    }
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn ensure_interactive_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        return Ok(());
    }
    anyhow::bail!(
        "deckdraw-cui requires an interactive TTY (run directly in a terminal, not a piped/headless shell)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_mode_api_and_log_flags() {
        let options = parse_options(&args(&[
            "--mode",
            "auto",
            "--api",
            "http://localhost:9000/api/deck",
            "--log",
            "/tmp/deckdraw.log",
        ]));
        assert_eq!(options.mode, Some(DrawMode::Auto));
        assert_eq!(
            options.api_url.as_deref(),
            Some("http://localhost:9000/api/deck")
        );
        assert_eq!(options.log_path, Some(PathBuf::from("/tmp/deckdraw.log")));
    }

    #[test]
    fn unknown_mode_falls_back_to_config() {
        let options = parse_options(&args(&["-m", "sideways", "--unknown"]));
        assert_eq!(options.mode, None);
        let options = parse_options(&args(&["--auto"]));
        assert_eq!(options.mode, Some(DrawMode::Auto));
    }
}
