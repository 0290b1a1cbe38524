use crate::database::{model::book::BookRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    book::{
        event::{CreateBook, UpdateBook},
        Book,
    },
    id::BookId,
};
use kernel::repository::book::BookRepository;
use shared::error::{AppError, AppResult};
use sqlx::Postgres;

// 外部キー制約違反（loansから参照されている書籍のDELETEなど）
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(new)]
pub struct BookRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookRepository for BookRepositoryImpl {
    async fn create(&self, event: CreateBook) -> AppResult<BookId> {
        let book_id = BookId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO books (book_id, title, author)
                VALUES ($1, $2, $3)
            "#,
        )
        .bind(book_id)
        .bind(&event.title)
        .bind(&event.author)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no book record has been created".into(),
            ));
        }

        Ok(book_id)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        sqlx::query_as::<Postgres, BookRow>(
            r#"
                SELECT book_id, title, author
                FROM books
                ORDER BY book_id ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Book::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>> {
        sqlx::query_as::<Postgres, BookRow>(
            r#"
                SELECT book_id, title, author
                FROM books
                WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map(|row| row.map(Book::from))
        .map_err(AppError::SpecificOperationError)
    }

    async fn update(&self, event: UpdateBook) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE books
                SET title = $2, author = $3
                WHERE book_id = $1
            "#,
        )
        .bind(event.book_id)
        .bind(&event.title)
        .bind(&event.author)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "book ({}) not found",
                event.book_id
            )));
        }

        Ok(())
    }

    // 貸出記録（未返却・返却済みを問わず）が残っている書籍は削除できない
    async fn delete(&self, book_id: BookId) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                DELETE FROM books WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .execute(self.db.inner_ref())
        .await;

        let res = match res {
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                return Err(AppError::ReferentialIntegrityViolation(format!(
                    "book ({book_id}) still has loan records and cannot be deleted"
                )))
            }
            other => other.map_err(AppError::SpecificOperationError)?,
        };

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "book ({book_id}) not found"
            )));
        }

        Ok(())
    }
}
