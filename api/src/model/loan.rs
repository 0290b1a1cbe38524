use chrono::{DateTime, Utc};
use kernel::model::{
    id::{BookId, LoanId, UserId},
    loan::Loan,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<Loan> for LoanResponse {
    fn from(value: Loan) -> Self {
        let Loan {
            id,
            book_id,
            user_id,
            borrowed_at,
            returned_at,
        } = value;
        Self {
            id,
            book_id,
            user_id,
            borrowed_at,
            returned_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedResponse {
    pub loan_id: LoanId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnedResponse {
    pub loan_id: LoanId,
}
