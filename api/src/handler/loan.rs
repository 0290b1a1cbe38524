use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use kernel::model::{
    id::{BookId, LoanId},
    loan::event::{BorrowBook, ReturnBook},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::ResolvedUser,
    model::loan::{BorrowedResponse, LoanResponse, ReturnedResponse},
};

pub async fn borrow_book(
    user: ResolvedUser,
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
) -> AppResult<impl IntoResponse> {
    // タイムスタンプはAPI境界で確定させ、台帳はイベントの値をそのまま記録する
    let event = BorrowBook {
        book_id,
        borrowed_by: user.0,
        borrowed_at: Utc::now(),
    };
    registry
        .loan_repository()
        .borrow(event)
        .await
        .map(|loan_id| (StatusCode::CREATED, Json(BorrowedResponse { loan_id })))
}

pub async fn return_book(
    user: ResolvedUser,
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
) -> AppResult<impl IntoResponse> {
    let event = ReturnBook {
        book_id,
        returned_by: user.0,
        returned_at: Utc::now(),
    };
    registry
        .loan_repository()
        .return_book(event)
        .await
        .map(|loan_id| (StatusCode::OK, Json(ReturnedResponse { loan_id })))
}

pub async fn show_loan_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<LoanResponse>>> {
    registry
        .loan_repository()
        .find_all()
        .await
        .map(|loans| Json(loans.into_iter().map(LoanResponse::from).collect()))
}

pub async fn show_loan(
    State(registry): State<AppRegistry>,
    Path(loan_id): Path<LoanId>,
) -> AppResult<Json<LoanResponse>> {
    registry
        .loan_repository()
        .find_by_id(loan_id)
        .await
        .and_then(|loan| match loan {
            Some(loan) => Ok(Json(loan.into())),
            None => Err(AppError::EntityNotFound(format!(
                "loan ({loan_id}) not found"
            ))),
        })
}

pub async fn show_book_loan_history(
    State(registry): State<AppRegistry>,
    Path(book_id): Path<BookId>,
) -> AppResult<Json<Vec<LoanResponse>>> {
    registry
        .loan_repository()
        .find_history_by_book_id(book_id)
        .await
        .map(|loans| Json(loans.into_iter().map(LoanResponse::from).collect()))
}
