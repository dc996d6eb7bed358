use deconz_setup::app::{source_from_env, App};
use deconz_setup::{logging, Config};
use deconz_setup_flow::{DeconzGateway, FlowSource};
use directories::ProjectDirs;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "deconz-setup", "deconz-setup")
}

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config/default.toml")
    }
}

fn get_log_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.data_local_dir().join("deconz-setup.log")
    } else {
        PathBuf::from("deconz-setup.log")
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = Config::load_or_default(&get_config_path());
    if let Err(e) = logging::init(&get_log_path()) {
        eprintln!("Logging disabled: {e}");
    }

    let rt = tokio::runtime::Runtime::new()?;
    let gateway = Arc::new(DeconzGateway::new(config.client_config()));
    let source = source_from_env(config.bridge.default_port);
    tracing::info!(import = matches!(source, FlowSource::Import(_)), "Starting deCONZ setup");
    let mut app = App::new(config, gateway, source);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &rt, &mut app);
    ratatui::restore();
    result?;

    if let Some(entry) = app.exported_entry() {
        println!("{}", toml::to_string_pretty(&entry)?);
    }

    Ok(())
}

fn run(
    terminal: &mut ratatui::DefaultTerminal,
    rt: &tokio::runtime::Runtime,
    app: &mut App,
) -> color_eyre::Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if app.pending.is_some() {
            rt.block_on(app.run_pending());
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            let event = event::read()?;

            if let Event::Key(key) = &event {
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
            }

            match app.handle_event(event) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => tracing::warn!("Input handling failed: {e}"),
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
