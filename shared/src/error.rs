use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // 借りようとした書籍に貸出中のレコードが存在する
    #[error("{0}")]
    BookNotAvailable(String),
    // 返却対象となる貸出レコードが存在しない（存在・所有者の別は外部に出さない）
    #[error("{0}")]
    NoActiveLoan(String),
    #[error("missing or invalid caller identity")]
    UserUnresolved,
    #[error("{0}")]
    EntityNotFound(String),
    // 貸出履歴が残っている書籍の削除など、参照整合性に反する操作
    #[error("{0}")]
    ReferentialIntegrityViolation(String),
    #[error("transaction error")]
    TransactionError(#[source] sqlx::Error),
    #[error("{0}")]
    NoRowsAffectedError(String),
    #[error(transparent)]
    SpecificOperationError(sqlx::Error),
    // 直列化競合のリトライ上限超過など、一時的に処理できない状態
    #[error("{0}")]
    ServiceUnavailable(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::BookNotAvailable(_) | AppError::NoActiveLoan(_) => StatusCode::BAD_REQUEST,
            AppError::UserUnresolved => StatusCode::FORBIDDEN,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ReferentialIntegrityViolation(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TransactionError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::SpecificOperationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code.is_server_error() {
            tracing::error!(
                error.message = %self,
                error.cause_chain = ?self,
                "unexpected error happened"
            );
        }

        status_code.into_response()
    }
}

impl AppError {
    /// PostgreSQLの直列化競合（SQLSTATE 40001）ならtrue。
    /// この場合のみトランザクション全体を再試行する。
    pub fn is_serialization_conflict(&self) -> bool {
        let source = match self {
            AppError::TransactionError(e) | AppError::SpecificOperationError(e) => e,
            _ => return false,
        };
        source
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| code == "40001")
    }
}
