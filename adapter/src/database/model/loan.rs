use chrono::{DateTime, Utc};
use kernel::model::{
    id::{BookId, LoanId, UserId},
    loan::Loan,
};

#[derive(Debug, sqlx::FromRow)]
pub struct LoanRow {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<LoanRow> for Loan {
    fn from(value: LoanRow) -> Self {
        let LoanRow {
            loan_id,
            book_id,
            user_id,
            borrowed_at,
            returned_at,
        } = value;
        Self {
            id: loan_id,
            book_id,
            user_id,
            borrowed_at,
            returned_at,
        }
    }
}

/// 書籍と「その書籍の最新の貸出」をLEFT JOINした結果の行。
/// loan_idがNULLなら貸出記録なし。
#[derive(Debug, sqlx::FromRow)]
pub struct LoanStateRow {
    pub book_id: BookId,
    pub loan_id: Option<LoanId>,
    pub user_id: Option<UserId>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl LoanStateRow {
    /// 貸出記録が一度もない、または最新の貸出が返却済みならtrue
    pub fn is_available(&self) -> bool {
        self.loan_id.is_none() || self.returned_at.is_some()
    }
}
