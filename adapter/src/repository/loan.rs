use crate::database::{
    model::{
        book::BookRow,
        loan::{LoanRow, LoanStateRow},
    },
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::book::Book;
use kernel::model::id::{BookId, LoanId};
use kernel::model::loan::{
    event::{BorrowBook, ReturnBook},
    Loan,
};
use kernel::repository::loan::LoanRepository;
use shared::error::{AppError, AppResult};
use sqlx::Postgres;

// 直列化競合（SQLSTATE 40001）で中断されたトランザクションの再試行上限。
// 超えたらServiceUnavailableとして呼び出し元に返す。
const MAX_SERIALIZATION_RETRIES: u32 = 3;

// 書籍と、その書籍の最新の貸出（borrowed_atが最大、同時刻ならloan_idが最大）を
// 1行にまとめて取得する。loan_idがNULLなら貸出記録なし。
const LOAN_STATE_QUERY: &str = r#"
    SELECT
    b.book_id,
    l.loan_id,
    l.user_id,
    l.returned_at
    FROM books AS b
    LEFT OUTER JOIN LATERAL (
        SELECT loan_id, user_id, returned_at
        FROM loans
        WHERE book_id = b.book_id
        ORDER BY borrowed_at DESC, loan_id DESC
        LIMIT 1
    ) AS l ON TRUE
    WHERE b.book_id = $1
"#;

#[derive(new)]
pub struct LoanRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl LoanRepository for LoanRepositoryImpl {
    // 貸出可否の問い合わせ。ロックは取らない（時点読み取りで十分）
    async fn is_available(&self, book_id: BookId) -> AppResult<bool> {
        let state = self.fetch_loan_state(self.db.inner_ref(), book_id).await?;
        match state {
            None => Err(AppError::EntityNotFound(format!(
                "book ({book_id}) not found"
            ))),
            Some(state) => Ok(state.is_available()),
        }
    }

    // 貸出可能な書籍の一覧：
    // {貸出記録が一度もない書籍} ∪ {最新の貸出が返却済みの書籍}
    async fn find_available_books(&self) -> AppResult<Vec<Book>> {
        sqlx::query_as::<Postgres, BookRow>(
            r#"
                SELECT b.book_id, b.title, b.author
                FROM books AS b
                LEFT OUTER JOIN LATERAL (
                    SELECT loan_id, returned_at
                    FROM loans
                    WHERE book_id = b.book_id
                    ORDER BY borrowed_at DESC, loan_id DESC
                    LIMIT 1
                ) AS latest ON TRUE
                WHERE latest.loan_id IS NULL OR latest.returned_at IS NOT NULL
                ORDER BY b.book_id ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Book::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    // 貸出。可否チェックと挿入をSERIALIZABLEトランザクションで行い、
    // 同一書籍への同時リクエストが両方成功することを防ぐ
    async fn borrow(&self, event: BorrowBook) -> AppResult<LoanId> {
        let mut attempts = 0;
        loop {
            match self.try_borrow(&event).await {
                Err(e) if e.is_serialization_conflict() => {
                    attempts += 1;
                    if attempts > MAX_SERIALIZATION_RETRIES {
                        return Err(AppError::ServiceUnavailable(format!(
                            "borrow of book ({}) kept conflicting, try again later",
                            event.book_id
                        )));
                    }
                }
                other => return other,
            }
        }
    }

    // 返却。借りた本人のみ返却できる
    async fn return_book(&self, event: ReturnBook) -> AppResult<LoanId> {
        let mut attempts = 0;
        loop {
            match self.try_return(&event).await {
                Err(e) if e.is_serialization_conflict() => {
                    attempts += 1;
                    if attempts > MAX_SERIALIZATION_RETRIES {
                        return Err(AppError::ServiceUnavailable(format!(
                            "return of book ({}) kept conflicting, try again later",
                            event.book_id
                        )));
                    }
                }
                other => return other,
            }
        }
    }

    // すべての貸出記録を取得
    async fn find_all(&self) -> AppResult<Vec<Loan>> {
        sqlx::query_as::<Postgres, LoanRow>(
            r#"
                SELECT loan_id, book_id, user_id, borrowed_at, returned_at
                FROM loans
                ORDER BY borrowed_at ASC, loan_id ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Loan::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    // 特定の貸出記録を取得
    async fn find_by_id(&self, loan_id: LoanId) -> AppResult<Option<Loan>> {
        sqlx::query_as::<Postgres, LoanRow>(
            r#"
                SELECT loan_id, book_id, user_id, borrowed_at, returned_at
                FROM loans
                WHERE loan_id = $1
            "#,
        )
        .bind(loan_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map(|row| row.map(Loan::from))
        .map_err(AppError::SpecificOperationError)
    }

    // 特定の書籍の貸出履歴を取得（新しい順）
    async fn find_history_by_book_id(&self, book_id: BookId) -> AppResult<Vec<Loan>> {
        sqlx::query_as::<Postgres, LoanRow>(
            r#"
                SELECT loan_id, book_id, user_id, borrowed_at, returned_at
                FROM loans
                WHERE book_id = $1
                ORDER BY borrowed_at DESC, loan_id DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Loan::from).collect())
        .map_err(AppError::SpecificOperationError)
    }
}

impl LoanRepositoryImpl {
    async fn try_borrow(&self, event: &BorrowBook) -> AppResult<LoanId> {
        let mut tx = self.db.begin().await?;

        // トランザクション分離レベルをSERIALIZABLEに設定
        self.set_transaction_serializable(&mut tx).await?;

        // 条件：
        // - 指定の書籍が存在する
        // - その書籍の最新の貸出が未返却でない
        {
            let res = self.fetch_loan_state(&mut *tx, event.book_id).await?;
            match res {
                // 条件を満たさなければエラーを返す
                // （コミットせずに抜けるのでトランザクションはロールバックされる）
                None => {
                    return Err(AppError::EntityNotFound(format!(
                        "book ({}) not found",
                        event.book_id
                    )))
                }
                Some(state) if !state.is_available() => {
                    return Err(AppError::BookNotAvailable(format!(
                        "book ({}) already has an open loan",
                        event.book_id
                    )))
                }
                // それ以外は処理続行
                _ => {}
            }
        }

        // create record
        let loan_id = LoanId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO loans
                (loan_id, book_id, user_id, borrowed_at, returned_at)
                VALUES ($1, $2, $3, $4, NULL)
            "#,
        )
        .bind(loan_id)
        .bind(event.book_id)
        .bind(event.borrowed_by)
        .bind(event.borrowed_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no loan record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(loan_id)
    }

    async fn try_return(&self, event: &ReturnBook) -> AppResult<LoanId> {
        let mut tx = self.db.begin().await?;

        // トランザクション分離レベルをSERIALIZABLEに設定
        self.set_transaction_serializable(&mut tx).await?;

        // 条件：
        // - 指定の書籍が存在する
        // - その書籍の最新の貸出が未返却である
        // - その貸出のユーザーが指定のユーザーと同じである
        // 失敗理由は区別せずNoActiveLoanに畳む（他ユーザーの貸出状態を漏らさない）
        let res = self.fetch_loan_state(&mut *tx, event.book_id).await?;
        let loan_id = match res {
            Some(LoanStateRow {
                loan_id: Some(loan_id),
                user_id: Some(user_id),
                returned_at: None,
                ..
            }) if user_id == event.returned_by => loan_id,
            _ => {
                return Err(AppError::NoActiveLoan(format!(
                    "no active loan for book ({})",
                    event.book_id
                )))
            }
        };

        // 返却は「一度だけ設定」：未返却の行に限ってreturned_atを更新する
        let res = sqlx::query(
            r#"
                UPDATE loans
                SET returned_at = $2
                WHERE loan_id = $1 AND returned_at IS NULL
            "#,
        )
        .bind(loan_id)
        .bind(event.returned_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no loan record has been returned".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(loan_id)
    }

    // トランザクション分離レベルをSERIALIZABLEにするために内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // 書籍の存在確認と最新の貸出の取得を1クエリで行う内部メソッド。
    // プール直読みとトランザクション内の両方から呼ぶ
    async fn fetch_loan_state<'e, E>(
        &self,
        executor: E,
        book_id: BookId,
    ) -> AppResult<Option<LoanStateRow>>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<Postgres, LoanStateRow>(LOAN_STATE_QUERY)
            .bind(book_id)
            .fetch_optional(executor)
            .await
            .map_err(AppError::SpecificOperationError)
    }
}
