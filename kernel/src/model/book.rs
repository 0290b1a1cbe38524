use crate::model::id::BookId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
}

pub mod event {
    use crate::model::id::BookId;

    #[derive(Debug, Clone)]
    pub struct CreateBook {
        pub title: String,
        pub author: String,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateBook {
        pub book_id: BookId,
        pub title: String,
        pub author: String,
    }
}
