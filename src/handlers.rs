use crate::confirm::{ConfirmRequest, DestructiveAction, Resolution};
use crate::errors::AppError;
use crate::format::{format_number, lenient::round_goal, parse_number, sanitize_decimal, sanitize_integer};
use crate::ledger::{self, resolve_date_key, today_key};
use crate::models::{
    ColorsUpdate, ConfirmAnswer, ConfirmOutcome, DayView, Document, GoalSet, HistoryDay,
    MacroColors, MetricsRequest, NewEntryRequest, Outcome, PendingConfirmation, Theme, ThemeBody,
};
use crate::state::AppState;
use crate::stats::{build_day_view, build_history};
use crate::ui::{self, PageContext};
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub cals: String,
    #[serde(default)]
    pub p: String,
    #[serde(default)]
    pub c: String,
    #[serde(default)]
    pub f: String,
}

#[derive(Debug, Deserialize)]
pub struct MetricsForm {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub water: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalsForm {
    #[serde(default)]
    pub cals: String,
    #[serde(default)]
    pub p: String,
    #[serde(default)]
    pub c: String,
    #[serde(default)]
    pub f: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub accept: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    #[serde(default)]
    pub back: String,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    render_day_page(&state, &today_key()).await
}

pub async fn day_page(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Html<String>, AppError> {
    let date = date_param(&date)?;
    Ok(render_day_page(&state, &date).await)
}

pub async fn history_page(State(state): State<AppState>) -> Html<String> {
    let doc = state.store.load_document().await;
    let theme = state.store.load_theme().await;
    let ctx = PageContext::new(theme, &doc.colors);
    Html(ui::render_history(&ctx, &build_history(&doc)))
}

pub async fn goals_page(State(state): State<AppState>) -> Html<String> {
    let doc = state.store.load_document().await;
    let theme = state.store.load_theme().await;
    let ctx = PageContext::new(theme, &doc.colors);
    Html(ui::render_goals(&ctx, &doc.goals))
}

pub async fn add_entry_form(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Form(form): Form<EntryForm>,
) -> Result<Redirect, AppError> {
    let date = date_param(&date)?;
    let field = |raw: &str| parse_number(&sanitize_decimal(raw));
    let macros = [field(&form.cals), field(&form.p), field(&form.c), field(&form.f)];
    log_entry(&state, &date, &form.note, macros).await?;
    Ok(Redirect::to(&day_path(&date)))
}

pub async fn metrics_form(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Form(form): Form<MetricsForm>,
) -> Result<Redirect, AppError> {
    let date = date_param(&date)?;
    let metrics = MetricsRequest {
        weight: form.weight,
        water: form.water,
    };
    record_metrics(&state, &date, &metrics).await?;
    Ok(Redirect::to(&day_path(&date)))
}

pub async fn delete_entry_form(
    State(state): State<AppState>,
    Path((date, timestamp)): Path<(String, i64)>,
) -> Result<Html<String>, AppError> {
    let date = date_param(&date)?;
    let request = ask_delete_entry(&state, &date, timestamp).await?;
    Ok(render_confirm_page(&state, &request).await)
}

pub async fn clear_day_form(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Html<String>, AppError> {
    let date = date_param(&date)?;
    let request = ask_clear_day(&state, &date).await;
    Ok(render_confirm_page(&state, &request).await)
}

pub async fn confirm_form(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<ConfirmForm>,
) -> Result<Redirect, AppError> {
    let accepted = matches!(form.accept.trim(), "true" | "yes" | "1");
    let (_, date) = answer_confirmation(&state, id, accepted).await?;
    Ok(Redirect::to(&date.map_or_else(|| "/".to_string(), |date| day_path(&date))))
}

pub async fn goals_form(
    State(state): State<AppState>,
    Form(form): Form<GoalsForm>,
) -> Result<Redirect, AppError> {
    let field = |raw: &str| round_goal(parse_number(&sanitize_integer(raw)));
    let goals = GoalSet {
        cals: field(&form.cals),
        p: field(&form.p),
        c: field(&form.c),
        f: field(&form.f),
    };
    update_goals(&state, goals).await?;
    Ok(Redirect::to("/goals"))
}

pub async fn colors_form(
    State(state): State<AppState>,
    Form(form): Form<ColorsUpdate>,
) -> Result<Redirect, AppError> {
    update_colors(&state, form).await?;
    Ok(Redirect::to("/goals"))
}

pub async fn toggle_theme_form(
    State(state): State<AppState>,
    Form(form): Form<ThemeForm>,
) -> Result<Redirect, AppError> {
    toggle_theme(&state).await?;
    Ok(Redirect::to(local_path(&form.back)))
}

pub async fn get_document(State(state): State<AppState>) -> Json<Document> {
    Json(state.store.load_document().await)
}

pub async fn get_today(State(state): State<AppState>) -> Json<DayView> {
    let doc = state.store.load_document().await;
    Json(build_day_view(&doc, &today_key()))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayView>, AppError> {
    let date = date_param(&date)?;
    let doc = state.store.load_document().await;
    Ok(Json(build_day_view(&doc, &date)))
}

pub async fn post_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<NewEntryRequest>,
) -> Result<Json<DayView>, AppError> {
    let date = date_param(&date)?;
    let macros = [payload.cals, payload.p, payload.c, payload.f];
    let doc = log_entry(&state, &date, &payload.note, macros).await?;
    Ok(Json(build_day_view(&doc, &date)))
}

pub async fn put_metrics(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<MetricsRequest>,
) -> Result<Json<DayView>, AppError> {
    let date = date_param(&date)?;
    let doc = record_metrics(&state, &date, &payload).await?;
    Ok(Json(build_day_view(&doc, &date)))
}

pub async fn request_delete_entry(
    State(state): State<AppState>,
    Path((date, timestamp)): Path<(String, i64)>,
) -> Result<Json<PendingConfirmation>, AppError> {
    let date = date_param(&date)?;
    let request = ask_delete_entry(&state, &date, timestamp).await?;
    Ok(Json(to_pending(request)))
}

pub async fn request_clear_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<PendingConfirmation>, AppError> {
    let date = date_param(&date)?;
    Ok(Json(to_pending(ask_clear_day(&state, &date).await)))
}

pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<ConfirmAnswer>,
) -> Result<Json<ConfirmOutcome>, AppError> {
    let (outcome, date) = answer_confirmation(&state, id, payload.accept).await?;
    let day = match date {
        Some(date) => {
            let doc = state.store.load_document().await;
            Some(build_day_view(&doc, &date))
        }
        None => None,
    };
    Ok(Json(ConfirmOutcome { outcome, day }))
}

pub async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryDay>> {
    let doc = state.store.load_document().await;
    Json(build_history(&doc))
}

pub async fn get_goals(State(state): State<AppState>) -> Json<GoalSet> {
    Json(state.store.load_document().await.goals)
}

/// Goal values may be numbers or text; they are rounded to whole numbers.
pub async fn put_goals(
    State(state): State<AppState>,
    Json(goals): Json<GoalSet>,
) -> Result<Json<GoalSet>, AppError> {
    Ok(Json(update_goals(&state, goals).await?))
}

pub async fn get_colors(State(state): State<AppState>) -> Json<MacroColors> {
    Json(state.store.load_document().await.colors)
}

pub async fn put_colors(
    State(state): State<AppState>,
    Json(update): Json<ColorsUpdate>,
) -> Result<Json<MacroColors>, AppError> {
    Ok(Json(update_colors(&state, update).await?))
}

pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    Json(theme_body(state.store.load_theme().await))
}

pub async fn put_theme(
    State(state): State<AppState>,
    Json(payload): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, AppError> {
    let theme = Theme::parse(&payload.theme);
    let _writer = state.writer.lock().await;
    state.store.save_theme(theme).await?;
    info!(%theme, "theme set");
    Ok(Json(theme_body(theme)))
}

pub async fn post_toggle_theme(State(state): State<AppState>) -> Result<Json<ThemeBody>, AppError> {
    Ok(Json(theme_body(toggle_theme(&state).await?)))
}

/// Runs one load, mutate, save cycle against the store.
async fn mutate<T>(
    state: &AppState,
    change: impl FnOnce(&mut Document) -> T,
) -> Result<(Document, T), AppError> {
    let _writer = state.writer.lock().await;
    let mut doc = state.store.load_document().await;
    let out = change(&mut doc);
    state.store.save_document(&doc).await?;
    Ok((doc, out))
}

async fn log_entry(
    state: &AppState,
    date: &str,
    note: &str,
    macros: [f64; 4],
) -> Result<Document, AppError> {
    let now_ms = Utc::now().timestamp_millis();
    let (doc, entry) = mutate(state, |doc| ledger::add_entry(doc, date, now_ms, note, macros)).await?;
    info!(
        date,
        ts = entry.timestamp,
        cals = entry.cals,
        p = entry.p,
        c = entry.c,
        f = entry.f,
        "logged entry"
    );
    Ok(doc)
}

async fn record_metrics(
    state: &AppState,
    date: &str,
    metrics: &MetricsRequest,
) -> Result<Document, AppError> {
    let (doc, ()) = mutate(state, |doc| {
        ledger::set_metrics(doc, date, &metrics.weight, &metrics.water)
    })
    .await?;
    info!(date, "updated weight and water");
    Ok(doc)
}

async fn ask_delete_entry(
    state: &AppState,
    date: &str,
    timestamp: i64,
) -> Result<ConfirmRequest, AppError> {
    let doc = state.store.load_document().await;
    let entry = ledger::find_entry(&doc, date, timestamp)
        .ok_or_else(|| AppError::not_found(format!("no entry {timestamp} on {date}")))?;

    let label = if entry.note.is_empty() {
        "this entry".to_string()
    } else {
        format!("\"{}\"", entry.note)
    };
    let body = format!(
        "Remove {label} ({} kcal) from {date}?",
        format_number(entry.cals)
    );

    let mut gate = state.confirm.lock().await;
    Ok(gate.request(
        "Delete entry?",
        body,
        DestructiveAction::DeleteEntry {
            date: date.to_string(),
            timestamp,
        },
    ))
}

async fn ask_clear_day(state: &AppState, date: &str) -> ConfirmRequest {
    let mut gate = state.confirm.lock().await;
    gate.request(
        "Clear day?",
        format!("Remove every entry, weight and water logged for {date}?"),
        DestructiveAction::ClearDay {
            date: date.to_string(),
        },
    )
}

/// Applies the pending action only when the user accepted it. Returns the
/// outcome and the date the action concerned.
async fn answer_confirmation(
    state: &AppState,
    id: u64,
    accepted: bool,
) -> Result<(Outcome, Option<String>), AppError> {
    let resolution = state.confirm.lock().await.resolve(id, accepted);

    match resolution {
        Resolution::Accepted(action) => {
            let date = action.date().to_string();
            match &action {
                DestructiveAction::DeleteEntry { date, timestamp } => {
                    let (_, removed) =
                        mutate(state, |doc| ledger::remove_entry(doc, date, *timestamp)).await?;
                    info!(date = %date, ts = *timestamp, removed, "deleted entry");
                }
                DestructiveAction::ClearDay { date } => {
                    mutate(state, |doc| ledger::clear_day(doc, date)).await?;
                    info!(date = %date, "cleared day");
                }
            }
            Ok((Outcome::Applied, Some(date)))
        }
        Resolution::Declined(action) => Ok((Outcome::Declined, Some(action.date().to_string()))),
        Resolution::Expired => Ok((Outcome::Expired, None)),
    }
}

async fn update_goals(state: &AppState, goals: GoalSet) -> Result<GoalSet, AppError> {
    let (doc, ()) = mutate(state, |doc| doc.goals = goals).await?;
    info!(
        cals = goals.cals,
        p = goals.p,
        c = goals.c,
        f = goals.f,
        configured = goals.is_configured(),
        "goals saved"
    );
    Ok(doc.goals)
}

async fn update_colors(state: &AppState, update: ColorsUpdate) -> Result<MacroColors, AppError> {
    let (doc, ()) = mutate(state, |doc| {
        let slots = [
            (&mut doc.colors.cal, update.cal),
            (&mut doc.colors.p, update.p),
            (&mut doc.colors.c, update.c),
            (&mut doc.colors.f, update.f),
        ];
        for (slot, value) in slots {
            if let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }
    })
    .await?;
    info!("macro colors saved");
    Ok(doc.colors)
}

async fn toggle_theme(state: &AppState) -> Result<Theme, AppError> {
    let _writer = state.writer.lock().await;
    let theme = state.store.load_theme().await.toggled();
    state.store.save_theme(theme).await?;
    info!(%theme, "theme toggled");
    Ok(theme)
}

async fn render_day_page(state: &AppState, date: &str) -> Html<String> {
    let doc = state.store.load_document().await;
    let theme = state.store.load_theme().await;
    let ctx = PageContext::new(theme, &doc.colors);
    let view = build_day_view(&doc, date);
    Html(ui::render_day(&ctx, &view, date == today_key()))
}

async fn render_confirm_page(state: &AppState, request: &ConfirmRequest) -> Html<String> {
    let doc = state.store.load_document().await;
    let theme = state.store.load_theme().await;
    let ctx = PageContext::new(theme, &doc.colors);
    Html(ui::render_confirm(&ctx, request, &day_path(request.action.date())))
}

fn date_param(raw: &str) -> Result<String, AppError> {
    resolve_date_key(raw)
        .ok_or_else(|| AppError::bad_request(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

/// Same-site path to return to, or `/`. Browsers read `\\` as `/`, so a
/// backslash anywhere could turn the path into another host.
fn local_path(back: &str) -> &str {
    let safe = back.starts_with('/')
        && !back.starts_with("//")
        && !back.chars().any(|ch| ch == '\\' || ch.is_control());
    if safe { back } else { "/" }
}

fn day_path(date: &str) -> String {
    if date == today_key() {
        "/".to_string()
    } else {
        format!("/days/{date}")
    }
}

fn to_pending(request: ConfirmRequest) -> PendingConfirmation {
    PendingConfirmation {
        id: request.id,
        title: request.title,
        body: request.body,
    }
}

fn theme_body(theme: Theme) -> ThemeBody {
    ThemeBody {
        theme: theme.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_path_keeps_same_site_paths_only() {
        assert_eq!(local_path("/history"), "/history");
        assert_eq!(local_path("/days/2026-01-05"), "/days/2026-01-05");
        assert_eq!(local_path(""), "/");
        assert_eq!(local_path("https://evil.com"), "/");
        assert_eq!(local_path("//evil.com"), "/");
        assert_eq!(local_path("/\\evil.com"), "/");
        assert_eq!(local_path("/\\/evil.com"), "/");
        assert_eq!(local_path("/goals\nLocation: x"), "/");
    }
}
