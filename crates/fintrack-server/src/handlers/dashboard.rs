//! Dashboard handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::expenses::ExpenseQuery;
use crate::{AppError, AppState, CurrentUser};
use fintrack_core::dashboard::DashboardView;

/// GET /api/dashboard - Totals, chart series and next-month prediction
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let filter = params.filter()?;
    let view = state.dashboard.build(current.id, &filter)?;
    Ok(Json(view))
}
