use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use stichtag_sdk::objects::sweep::{RunSweepRequest, SweepReportResponse};

use crate::api::extractors::AdminUser;
use crate::state::AppState;

use super::AdminApiError;

/// `POST /sweep` – run the deadline sweep now, for the given date or for
/// today (UTC). Shares the sweeper's pass lock with the background loop,
/// so a concurrently running pass finishes first instead of doubling up.
pub async fn run_sweep(
    state: State<AppState>,
    _admin: AdminUser,
    Json(request): Json<RunSweepRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let date = request
        .date
        .unwrap_or_else(|| time::OffsetDateTime::now_utc().date());

    tracing::info!(%date, "Manual sweep triggered");
    let report = state.sweeper.run_sweep(date).await?;

    Ok(Json(SweepReportResponse {
        events_processed: report.events_processed,
        events_failed: report.events_failed,
        seats_filled: report.seats_filled,
        notifications_sent: report.notifications_sent,
        notifications_failed: report.notifications_failed,
    }))
}
