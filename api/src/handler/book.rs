use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use kernel::model::id::BookId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::book::{
    BookAvailabilityResponse, BookResponse, CreateBookRequest, CreatedBookResponse,
    UpdateBookRequest, UpdateBookRequestWithId,
};

pub async fn register_book(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookRequest>,
) -> AppResult<impl IntoResponse> {
    registry
        .book_repository()
        .create(req.into())
        .await
        .map(|id| (StatusCode::CREATED, Json(CreatedBookResponse { id })))
}

pub async fn show_book_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<BookResponse>>> {
    registry
        .book_repository()
        .find_all()
        .await
        .map(|books| Json(books.into_iter().map(BookResponse::from).collect()))
}

pub async fn show_book(
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
) -> AppResult<Json<BookResponse>> {
    registry
        .book_repository()
        .find_by_id(book_id)
        .await
        .and_then(|book| match book {
            Some(book) => Ok(Json(book.into())),
            None => Err(AppError::EntityNotFound(format!(
                "book ({book_id}) not found"
            ))),
        })
}

pub async fn update_book(
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
    Json(req): Json<UpdateBookRequest>,
) -> AppResult<StatusCode> {
    registry
        .book_repository()
        .update(UpdateBookRequestWithId(book_id, req).into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_book(
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
) -> AppResult<StatusCode> {
    registry
        .book_repository()
        .delete(book_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

// 貸出可能な書籍の一覧。順序は保証の対象外だが、安定のためid順で返している
pub async fn show_available_book_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<BookResponse>>> {
    registry
        .loan_repository()
        .find_available_books()
        .await
        .map(|books| Json(books.into_iter().map(BookResponse::from).collect()))
}

pub async fn show_book_availability(
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
) -> AppResult<Json<BookAvailabilityResponse>> {
    registry
        .loan_repository()
        .is_available(book_id)
        .await
        .map(|available| Json(BookAvailabilityResponse { available }))
}
