use rocket::launch;
use std::sync::Arc;

use lp_position_planner::{bootstrap, config, web};

#[launch]
fn rocket() -> _ {
    env_logger::init();

    // Load configuration
    let config = config::Config::from_env()
        .expect("Failed to load configuration");

    // Build application state
    let app_state = Arc::new(
        bootstrap::AppState::new(&config)
            .expect("Failed to initialize application state")
    );

    log::info!("position planner listening on port {}", config.port);
    web::build_rocket(app_state, config.port)
}
