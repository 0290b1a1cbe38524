use crate::model::{
    book::{
        event::{CreateBook, UpdateBook},
        Book,
    },
    id::BookId,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[mockall::automock]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn create(&self, event: CreateBook) -> AppResult<BookId>;
    async fn find_all(&self) -> AppResult<Vec<Book>>;
    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>>;
    async fn update(&self, event: UpdateBook) -> AppResult<()>;
    // 貸出記録が残っている書籍の削除は拒否する（参照整合性）
    async fn delete(&self, book_id: BookId) -> AppResult<()>;
}
