mod app;
mod config;
mod game;

use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    let config = config::load_or_create(Path::new(config::CONFIG_PATH));
    log::set_max_level(config.log_level.as_level_filter());

    let scores = match game::scores::HighScoreStore::default_path() {
        Some(path) => game::scores::HighScoreStore::open(path),
        None => {
            // The game can run without a data directory; records just won't
            // survive restarts.
            log::warn!("No platform data directory available; records will not persist");
            game::scores::HighScoreStore::in_memory()
        }
    };

    app::run(config, scores)
}
