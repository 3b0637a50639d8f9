use clap::Parser;
use cockpit_cli::Args;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use roi_cockpit::{logging, App, AppConfig, AppEvent, ConfigManager, Tab, APP_NAME};
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{error, info};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(
    mut terminal: DefaultTerminal,
    args: &Args,
    config: &AppConfig,
    path: PathBuf,
) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), config)?;
    if args.debug {
        app.enable_debug();
    }
    if let Some(tab) = args.tab.and_then(|t| Tab::from_name(t.as_str())) {
        app.tab = tab;
    }

    let filters = args.filter_pairs().map_err(|e| eyre!(e))?;
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(path))?;
    if let Some(search) = &args.search {
        tx.send(AppEvent::Search(search.clone()))?;
    }
    for event in app.filter_events(&filters) {
        tx.send(event)?;
    }

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_generate_config(args: &Args) -> Result<()> {
    let config_manager = ConfigManager::new(APP_NAME)?;
    let config_path = config_manager.write_default_config(args.force)?;
    println!("Configuration file written to: {}", config_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.generate_config {
        if let Err(e) = handle_generate_config(&args) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    color_eyre::install()?;

    let config = match AppConfig::load(APP_NAME, args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    let log_file = args.log_file.clone().or_else(|| config.logging.file.clone());
    logging::init(&config.logging.level, log_file.as_deref())?;

    let Some(path) = args.path.clone() else {
        return Err(eyre!("A dataset path is required"));
    };
    info!("Starting {} with {}", APP_NAME, path.display());

    let terminal = ratatui::init();
    let result = run(terminal, &args, &config, path);
    ratatui::restore();
    if let Err(e) = result {
        error!("Exiting with error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
