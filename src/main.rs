//! Binary entry point: resolve the data directory, route logs to a file, and
//! drive the Ratatui event loop over an empty session store. The saved session
//! is only read when the user asks to resume it.
use team_roster_manager::{init_logging, run_app, App, Config, SessionStore};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::resolve()?;
    init_logging(&config.log_file)?;
    info!(data_dir = %config.data_dir.display(), "starting team roster manager");

    let store = SessionStore::new(&config.session_file, &config.export_dir);
    let mut app = App::new(store);
    run_app(&mut app)
}
