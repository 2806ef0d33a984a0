pub mod dto;
pub mod routes;

use rocket::{routes, Build, Rocket};
use std::sync::Arc;

use crate::bootstrap::AppState;
use crate::web::routes::{health, prepare_position, resolve_ticks};

pub fn build_rocket(app_state: Arc<AppState>, port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .manage(app_state)
        .mount("/", routes![prepare_position, resolve_ticks, health])
}
