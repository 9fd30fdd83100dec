use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    catalog,
    error::AppResult,
    middleware::CatalogAdmin,
    models::BookFields,
    state::AppState,
    types::{BookRequest, BookResponse, PatchBookRequest},
};

// Reads are open to anonymous callers
pub async fn list_books(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let books: Vec<BookResponse> = catalog::list_books(&state.db).await?.into_iter().map(Into::into).collect();
    Ok(Json(books))
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<impl IntoResponse> {
    let book = catalog::get_book(&state.db, id).await?;
    Ok(Json(BookResponse::from(book)))
}

pub async fn create_book(
    State(state): State<AppState>,
    CatalogAdmin(admin): CatalogAdmin,
    Json(req): Json<BookRequest>,
) -> AppResult<impl IntoResponse> {
    let book = catalog::create_book(&state.db, BookFields::from(req)).await?;
    state.metrics.inc_books_created();
    tracing::debug!(admin.id = admin.id(), book.id = book.id, "catalog insert");
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

pub async fn update_book(
    State(state): State<AppState>,
    CatalogAdmin(_admin): CatalogAdmin,
    Path(id): Path<i64>,
    Json(req): Json<BookRequest>,
) -> AppResult<impl IntoResponse> {
    let book = catalog::update_book(&state.db, id, |fields| req.apply_to(fields)).await?;
    Ok(Json(BookResponse::from(book)))
}

pub async fn patch_book(
    State(state): State<AppState>,
    CatalogAdmin(_admin): CatalogAdmin,
    Path(id): Path<i64>,
    Json(req): Json<PatchBookRequest>,
) -> AppResult<impl IntoResponse> {
    let book = catalog::update_book(&state.db, id, |fields| req.apply_to(fields)).await?;
    Ok(Json(BookResponse::from(book)))
}

pub async fn delete_book(
    State(state): State<AppState>,
    CatalogAdmin(_admin): CatalogAdmin,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    catalog::delete_book(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
