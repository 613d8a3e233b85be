#[macro_use]
extern crate rocket;

use log::info;
use rocket::fairing::AdHoc;
use std::env;

use minimax_snake::bot::Bot;
use minimax_snake::config::Config;
use minimax_snake::debug_logger::DebugLogger;

mod handler;

#[launch]
async fn rocket() -> _ {
    // Hosts hand out the port as PORT, Rocket reads ROCKET_PORT
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Minimax Snake Server...");

    let config = Config::load_or_default();
    let debug_logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let bot = Bot::with_debug_logger(config, debug_logger);

    rocket::build()
        .manage(bot)
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "battlesnake/github/minimax-snake");
            })
        }))
        .mount(
            "/",
            routes![handler::index, handler::start, handler::get_move, handler::end],
        )
}
