use crate::model::id::{BookId, LoanId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 貸出記録。Borrowで作成され、Returnでreturned_atが一度だけ設定される。
/// それ以外の経路で更新・削除されることはない（履歴として保存し続ける）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// 「最新の貸出」の定義：borrowed_atが最大のもの。
/// borrowed_atが同時刻の場合は作成順（= LoanIdの昇順、UUID v7）で決める。
pub fn latest_loan<'a, I>(loans: I) -> Option<&'a Loan>
where
    I: IntoIterator<Item = &'a Loan>,
{
    loans.into_iter().max_by_key(|loan| (loan.borrowed_at, loan.id))
}

/// 書籍が貸出可能かどうかの導出。保存せず常に最新の貸出から計算する。
/// 条件：一度も借りられていない、または最新の貸出が返却済み。
pub fn is_available(latest_loan: Option<&Loan>) -> bool {
    latest_loan.map_or(true, |loan| loan.returned_at.is_some())
}

pub mod event {
    use crate::model::id::{BookId, UserId};
    use chrono::{DateTime, Utc};

    #[derive(Debug, Clone)]
    pub struct BorrowBook {
        pub book_id: BookId,
        pub borrowed_by: UserId,
        pub borrowed_at: DateTime<Utc>,
    }

    #[derive(Debug, Clone)]
    pub struct ReturnBook {
        pub book_id: BookId,
        pub returned_by: UserId,
        pub returned_at: DateTime<Utc>,
    }
}
