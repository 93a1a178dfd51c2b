use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use time::Date;
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

use super::dto::{
    CalorieGoalRequest, DaysResponse, MacroGoalsRequest, NewEntryRequest, SetDateRequest,
};
use super::journal::{DayLog, FoodEntry};
use super::service;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/days", get(list_days))
        .route("/days/current", get(current_day))
        .route("/days/:date", get(get_day))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/days/current", put(set_current_date))
        .route("/entries", post(add_entry))
        .route("/entries/:id", delete(remove_entry))
        .route("/goals/calories", put(set_calorie_goal))
        .route("/goals/macros", put(set_macro_goals))
}

#[instrument(skip(state))]
async fn list_days(State(state): State<AppState>) -> Json<DaysResponse> {
    let tracker = state.tracker.read().await;
    Json(DaysResponse {
        is_loading: tracker.is_loading,
        days: tracker.journal.days().to_vec(),
    })
}

#[instrument(skip(state))]
async fn current_day(State(state): State<AppState>) -> Json<DayLog> {
    let tracker = state.tracker.read().await;
    Json(tracker.journal.current())
}

#[instrument(skip(state))]
async fn get_day(State(state): State<AppState>, Path(date): Path<Date>) -> Json<DayLog> {
    let tracker = state.tracker.read().await;
    Json(tracker.journal.day(date))
}

#[instrument(skip(state, body))]
async fn set_current_date(
    State(state): State<AppState>,
    Json(body): Json<SetDateRequest>,
) -> Json<DayLog> {
    Json(service::set_current_date(&state, body.date).await)
}

#[instrument(skip(state, body))]
async fn add_entry(
    State(state): State<AppState>,
    Json(body): Json<NewEntryRequest>,
) -> Result<(StatusCode, Json<FoodEntry>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::InvalidEntry("food name must not be empty".into()));
    }
    if body.amount <= 0.0 {
        return Err(AppError::InvalidEntry("amount must be positive".into()));
    }
    if body.calories < 0.0 {
        return Err(AppError::InvalidEntry(
            "calories must not be negative".into(),
        ));
    }

    let entry = service::add_entry(&state, body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
async fn remove_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::remove_entry(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
async fn set_calorie_goal(
    State(state): State<AppState>,
    Json(body): Json<CalorieGoalRequest>,
) -> Result<Json<DayLog>, AppError> {
    Ok(Json(service::set_calorie_goal(&state, body.goal).await?))
}

#[instrument(skip(state, body))]
async fn set_macro_goals(
    State(state): State<AppState>,
    Json(body): Json<MacroGoalsRequest>,
) -> Result<Json<DayLog>, AppError> {
    Ok(Json(
        service::set_macro_goals(&state, body.protein, body.carbs, body.fat).await?,
    ))
}
