use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppResult,
    lending,
    middleware::CurrentUser,
    models::today,
    state::AppState,
    types::{BorrowRequest, BorrowResponse, ReturnResponse},
};

pub async fn borrow_book(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(req): Json<BorrowRequest>,
) -> AppResult<impl IntoResponse> {
    let today = today();
    let due_date = lending::resolve_due_date(req.due_date, today, state.config.lending.default_loan_days);
    let borrow = lending::borrow_book(&state.db, caller.id(), req.book, due_date, today).await?;
    state.metrics.inc_borrows_created();

    let resp = BorrowResponse { id: borrow.id, book: borrow.book_id, due_date: borrow.due_date };
    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn return_book(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let borrow = lending::return_book(&state.db, caller.id(), id, today()).await?;
    state.metrics.record_return(borrow.fine);

    Ok(Json(ReturnResponse { message: lending::RETURN_OK_MESSAGE.to_string(), fine: borrow.fine }))
}

pub async fn borrow_history(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let items = lending::borrow_history(&state.db, caller.id()).await?;
    Ok(Json(items))
}
