use super::{book::build_book_routes, health::build_health_check_routes, loan::build_loan_routes};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_book_routes())
        .merge(build_health_check_routes())
        .merge(build_loan_routes());
    Router::new().nest("/api/v1", router)
}
