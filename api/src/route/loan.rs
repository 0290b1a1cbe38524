use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::loan::{borrow_book, return_book, show_loan, show_loan_list};

pub fn build_loan_routes() -> Router<AppRegistry> {
    // 同じ位置のパスパラメータ名はルーター側の制約で揃える必要があるため
    // :idで統一する（/loans/:id は貸出ID、/loans/:id/borrow の:idは書籍ID）
    let loans_routers = Router::new()
        .route("/", get(show_loan_list))
        .route("/:id", get(show_loan))
        .route("/:id/borrow", post(borrow_book))
        .route("/:id/return", post(return_book));

    Router::new().nest("/loans", loans_routers)
}
