use crate::model::{
    book::Book,
    id::{BookId, LoanId},
    loan::{
        event::{BorrowBook, ReturnBook},
        Loan,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

/// 貸出台帳。貸出・返却の状態遷移と貸出可否の問い合わせを担う。
#[mockall::automock]
#[async_trait]
pub trait LoanRepository: Send + Sync {
    // 書籍が貸出可能か（最新の貸出から導出）
    async fn is_available(&self, book_id: BookId) -> AppResult<bool>;
    // 貸出可能な書籍の一覧
    async fn find_available_books(&self) -> AppResult<Vec<Book>>;
    // 貸出。同一書籍への同時リクエストは片方だけ成功する
    async fn borrow(&self, event: BorrowBook) -> AppResult<LoanId>;
    // 返却。借りた本人のみ返却できる
    async fn return_book(&self, event: ReturnBook) -> AppResult<LoanId>;
    // すべての貸出記録を取得
    async fn find_all(&self) -> AppResult<Vec<Loan>>;
    // 特定の貸出記録を取得
    async fn find_by_id(&self, loan_id: LoanId) -> AppResult<Option<Loan>>;
    // 特定の書籍の貸出履歴を取得（新しい順）
    async fn find_history_by_book_id(&self, book_id: BookId) -> AppResult<Vec<Loan>>;
}
