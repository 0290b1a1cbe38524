use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use rstest::rstest;
use tower::ServiceExt;

use crate::{
    deserialize_json,
    helper::{fixture, make_router, v1, TestRequestExt},
};
use api::model::{
    book::{BookAvailabilityResponse, BookResponse},
    loan::{BorrowedResponse, LoanResponse, ReturnedResponse},
};
use kernel::{
    model::{
        book::Book,
        id::{BookId, LoanId, UserId},
        loan::Loan,
    },
    repository::loan::MockLoanRepository,
};
use shared::error::AppError;

#[rstest]
#[tokio::test]
async fn borrow_book_returns_created(
    mut fixture: registry::MockAppRegistryExt,
) -> anyhow::Result<()> {
    let book_id = BookId::new();
    let user_id = UserId::new();
    let loan_id = LoanId::new();

    fixture.expect_loan_repository().returning(move || {
        let mut mock = MockLoanRepository::new();
        mock.expect_borrow()
            .withf(move |event| event.book_id == book_id && event.borrowed_by == user_id)
            .returning(move |_| Ok(loan_id));
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::post(v1(&format!("/loans/{book_id}/borrow")))
        .user(user_id)
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let result = deserialize_json!(resp, BorrowedResponse);
    assert_eq!(result.loan_id, loan_id);

    Ok(())
}

// 失敗系のステータスマッピング：
// - 貸出中の書籍              -> 400
// - 存在しない書籍            -> 404
// - 直列化競合のリトライ超過  -> 503
#[rstest]
#[case::not_available("not_available", StatusCode::BAD_REQUEST)]
#[case::missing_book("missing", StatusCode::NOT_FOUND)]
#[case::conflict_exhausted("conflict", StatusCode::SERVICE_UNAVAILABLE)]
#[tokio::test]
async fn borrow_book_failure_mapping(
    mut fixture: registry::MockAppRegistryExt,
    #[case] outcome: &'static str,
    #[case] status_code: StatusCode,
) -> anyhow::Result<()> {
    fixture.expect_loan_repository().returning(move || {
        let mut mock = MockLoanRepository::new();
        mock.expect_borrow().returning(move |event| match outcome {
            "not_available" => Err(AppError::BookNotAvailable(format!(
                "book ({}) already has an open loan",
                event.book_id
            ))),
            "missing" => Err(AppError::EntityNotFound(format!(
                "book ({}) not found",
                event.book_id
            ))),
            _ => Err(AppError::ServiceUnavailable(format!(
                "borrow of book ({}) kept conflicting, try again later",
                event.book_id
            ))),
        });
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::post(v1(&format!("/loans/{}/borrow", BookId::new())))
        .user(UserId::new())
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), status_code);

    Ok(())
}

// 呼び出し元IDが解決できないリクエストは台帳に到達する前に403で弾く
#[rstest]
#[case::missing_header(None)]
#[case::malformed_header(Some("not-a-uuid"))]
#[tokio::test]
async fn borrow_book_without_resolved_user_is_forbidden(
    fixture: registry::MockAppRegistryExt,
    #[case] header: Option<&'static str>,
) -> anyhow::Result<()> {
    let app = make_router(fixture);

    let mut builder = Request::post(v1(&format!("/loans/{}/borrow", BookId::new())));
    if let Some(value) = header {
        builder = builder.header("x-user-id", value);
    }
    let resp = app.oneshot(builder.body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn return_book_returns_ok(mut fixture: registry::MockAppRegistryExt) -> anyhow::Result<()> {
    let book_id = BookId::new();
    let user_id = UserId::new();
    let loan_id = LoanId::new();

    fixture.expect_loan_repository().returning(move || {
        let mut mock = MockLoanRepository::new();
        mock.expect_return_book()
            .withf(move |event| event.book_id == book_id && event.returned_by == user_id)
            .returning(move |_| Ok(loan_id));
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::post(v1(&format!("/loans/{book_id}/return")))
        .user(user_id)
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let result = deserialize_json!(resp, ReturnedResponse);
    assert_eq!(result.loan_id, loan_id);

    Ok(())
}

// 「貸出がない」「他人の貸出」「返却済み」は区別せず同じ400が返る
#[rstest]
#[tokio::test]
async fn return_book_without_active_loan_is_bad_request(
    mut fixture: registry::MockAppRegistryExt,
) -> anyhow::Result<()> {
    fixture.expect_loan_repository().returning(|| {
        let mut mock = MockLoanRepository::new();
        mock.expect_return_book().returning(|event| {
            Err(AppError::NoActiveLoan(format!(
                "no active loan for book ({})",
                event.book_id
            )))
        });
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::post(v1(&format!("/loans/{}/return", BookId::new())))
        .user(UserId::new())
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn return_book_without_resolved_user_is_forbidden(
    fixture: registry::MockAppRegistryExt,
) -> anyhow::Result<()> {
    let app = make_router(fixture);

    let req = Request::post(v1(&format!("/loans/{}/return", BookId::new()))).body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn show_available_book_list_returns_books(
    mut fixture: registry::MockAppRegistryExt,
) -> anyhow::Result<()> {
    fixture.expect_loan_repository().returning(|| {
        let mut mock = MockLoanRepository::new();
        mock.expect_find_available_books().returning(|| {
            Ok(vec![
                Book {
                    id: BookId::new(),
                    title: "book1".to_string(),
                    author: "author1".to_string(),
                },
                Book {
                    id: BookId::new(),
                    title: "book3".to_string(),
                    author: "author3".to_string(),
                },
            ])
        });
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::get(v1("/available-books")).body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let result = deserialize_json!(resp, Vec<BookResponse>);
    assert_eq!(result.len(), 2);

    Ok(())
}

#[rstest]
#[case::available(true)]
#[case::not_available(false)]
#[tokio::test]
async fn show_book_availability_reports_derived_state(
    mut fixture: registry::MockAppRegistryExt,
    #[case] available: bool,
) -> anyhow::Result<()> {
    fixture.expect_loan_repository().returning(move || {
        let mut mock = MockLoanRepository::new();
        mock.expect_is_available().returning(move |_| Ok(available));
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::get(v1(&format!("/books/{}/availability", BookId::new())))
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let result = deserialize_json!(resp, BookAvailabilityResponse);
    assert_eq!(result.available, available);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn show_book_availability_of_missing_book_is_not_found(
    mut fixture: registry::MockAppRegistryExt,
) -> anyhow::Result<()> {
    fixture.expect_loan_repository().returning(|| {
        let mut mock = MockLoanRepository::new();
        mock.expect_is_available().returning(|book_id| {
            Err(AppError::EntityNotFound(format!(
                "book ({book_id}) not found"
            )))
        });
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::get(v1(&format!("/books/{}/availability", BookId::new())))
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn show_book_loan_history_returns_loans_newest_first(
    mut fixture: registry::MockAppRegistryExt,
) -> anyhow::Result<()> {
    let book_id = BookId::new();

    fixture.expect_loan_repository().returning(move || {
        let mut mock = MockLoanRepository::new();
        mock.expect_find_history_by_book_id().returning(|book_id| {
            let open = Loan {
                id: LoanId::new(),
                book_id,
                user_id: UserId::new(),
                borrowed_at: Utc::now(),
                returned_at: None,
            };
            let closed = Loan {
                id: LoanId::new(),
                book_id,
                user_id: UserId::new(),
                borrowed_at: Utc::now() - chrono::Duration::days(7),
                returned_at: Some(Utc::now() - chrono::Duration::days(6)),
            };
            Ok(vec![open, closed])
        });
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::get(v1(&format!("/books/{book_id}/loans"))).body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let result = deserialize_json!(resp, Vec<LoanResponse>);
    assert_eq!(result.len(), 2);
    assert!(result[0].returned_at.is_none());
    assert!(result[1].returned_at.is_some());

    Ok(())
}

#[rstest]
#[case::found(true, StatusCode::OK)]
#[case::missing(false, StatusCode::NOT_FOUND)]
#[tokio::test]
async fn show_loan_maps_missing_loan_to_not_found(
    mut fixture: registry::MockAppRegistryExt,
    #[case] found: bool,
    #[case] status_code: StatusCode,
) -> anyhow::Result<()> {
    let loan_id = LoanId::new();

    fixture.expect_loan_repository().returning(move || {
        let mut mock = MockLoanRepository::new();
        mock.expect_find_by_id().returning(move |id| {
            Ok(found.then(|| Loan {
                id,
                book_id: BookId::new(),
                user_id: UserId::new(),
                borrowed_at: Utc::now(),
                returned_at: None,
            }))
        });
        Arc::new(mock)
    });

    let app = make_router(fixture);

    let req = Request::get(v1(&format!("/loans/{loan_id}"))).body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert_eq!(resp.status(), status_code);

    if status_code == StatusCode::OK {
        let result = deserialize_json!(resp, LoanResponse);
        assert_eq!(result.id, loan_id);
    }

    Ok(())
}
