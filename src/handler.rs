// Rocket routes for the four Battlesnake endpoints
//
// Each route unpacks the request body and hands it to the managed Bot.
// Sessions, the search and its time budget all live in the Bot.

use rocket::http::Status;
use rocket::serde::json::Json;
use serde_json::Value;

use minimax_snake::bot::Bot;
use minimax_snake::types::GameState;

/// GET /
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start opens the game's session
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &rocket::State<Bot>, start_req: Json<GameState>) -> Status {
    let req = start_req.into_inner();
    bot.start(&req.game, &req.turn, &req.board, &req.you);

    Status::Ok
}

/// POST /move answers within the game's timeout
#[post("/move", format = "json", data = "<move_req>")]
pub async fn get_move(bot: &rocket::State<Bot>, move_req: Json<GameState>) -> Json<Value> {
    let req = move_req.into_inner();
    Json(bot.get_move(&req.game, &req.turn, &req.board, &req.you).await)
}

/// POST /end closes the game's session
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Json<GameState>) -> Status {
    let req = end_req.into_inner();
    bot.end(&req.game, &req.turn, &req.board, &req.you);

    Status::Ok
}
