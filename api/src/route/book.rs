use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::book::{
    delete_book, register_book, show_available_book_list, show_book, show_book_availability,
    show_book_list, update_book,
};
use crate::handler::loan::show_book_loan_history;

pub fn build_book_routes() -> Router<AppRegistry> {
    let books_routers = Router::new()
        .route("/", post(register_book).get(show_book_list))
        .route(
            "/:book_id",
            get(show_book).put(update_book).delete(delete_book),
        )
        .route("/:book_id/availability", get(show_book_availability))
        .route("/:book_id/loans", get(show_book_loan_history));

    Router::new()
        .nest("/books", books_routers)
        .route("/available-books", get(show_available_book_list))
}
