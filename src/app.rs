use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/days/:date", get(handlers::day_page))
        .route("/days/:date/entries", post(handlers::add_entry_form))
        .route("/days/:date/entries/:ts/delete", post(handlers::delete_entry_form))
        .route("/days/:date/metrics", post(handlers::metrics_form))
        .route("/days/:date/clear", post(handlers::clear_day_form))
        .route("/confirm/:id", post(handlers::confirm_form))
        .route("/history", get(handlers::history_page))
        .route("/goals", get(handlers::goals_page).post(handlers::goals_form))
        .route("/colors", post(handlers::colors_form))
        .route("/theme/toggle", post(handlers::toggle_theme_form))
        .route("/api/document", get(handlers::get_document))
        .route("/api/today", get(handlers::get_today))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/days/:date/entries", post(handlers::post_entry))
        .route("/api/days/:date/entries/:ts/delete", post(handlers::request_delete_entry))
        .route("/api/days/:date/metrics", put(handlers::put_metrics))
        .route("/api/days/:date/clear", post(handlers::request_clear_day))
        .route("/api/confirm/:id", post(handlers::confirm))
        .route("/api/history", get(handlers::get_history))
        .route("/api/goals", get(handlers::get_goals).put(handlers::put_goals))
        .route("/api/colors", get(handlers::get_colors).put(handlers::put_colors))
        .route("/api/theme", get(handlers::get_theme).put(handlers::put_theme))
        .route("/api/theme/toggle", post(handlers::post_toggle_theme))
        .with_state(state)
}
