//! HTTP handlers for `/api/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::{AppError, Envelope};

use super::models::{Book, BookInput};
use super::service::CatalogService;

type ApiResult<T> = Result<T, AppError>;

/// Route table for the books module, with the service bound as state.
pub fn router(service: CatalogService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(service): State<CatalogService>) -> ApiResult<Json<Envelope<Vec<Book>>>> {
    let books = service.list().await?;
    Ok(Json(Envelope::list(books)))
}

async fn get_book(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Book>>> {
    let book = service.get(&id).await?;
    Ok(Json(Envelope::ok(book)))
}

async fn create_book(
    State(service): State<CatalogService>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Book>>)> {
    let Json(input) = payload?;
    let book = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(book))))
}

async fn update_book(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<Json<Envelope<Book>>> {
    let Json(changes) = payload?;
    let book = service.update(&id, changes).await?;
    Ok(Json(Envelope::ok(book)))
}

async fn delete_book(
    State(service): State<CatalogService>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Book>>> {
    let book = service.delete(&id).await?;
    Ok(Json(Envelope::ok(book)))
}
