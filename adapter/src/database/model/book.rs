use kernel::model::{book::Book, id::BookId};

#[derive(Debug, sqlx::FromRow)]
pub struct BookRow {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        let BookRow {
            book_id,
            title,
            author,
        } = value;
        Self {
            id: book_id,
            title,
            author,
        }
    }
}
