use kernel::model::{book::event::CreateBook, book::event::UpdateBook, book::Book, id::BookId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
}

impl From<CreateBookRequest> for CreateBook {
    fn from(value: CreateBookRequest) -> Self {
        let CreateBookRequest { title, author } = value;
        Self { title, author }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct UpdateBookRequestWithId(pub BookId, pub UpdateBookRequest);

impl From<UpdateBookRequestWithId> for UpdateBook {
    fn from(value: UpdateBookRequestWithId) -> Self {
        let UpdateBookRequestWithId(book_id, UpdateBookRequest { title, author }) = value;
        Self {
            book_id,
            title,
            author,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
}

impl From<Book> for BookResponse {
    fn from(value: Book) -> Self {
        let Book { id, title, author } = value;
        Self { id, title, author }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBookResponse {
    pub id: BookId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAvailabilityResponse {
    pub available: bool,
}
