use axum::{extract::FromRequestParts, http::request::Parts};
use kernel::model::id::UserId;
use shared::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// 呼び出し元の利用者ID。信頼できる前段（ゲートウェイ等）が解決済みの
/// IDをx-user-idヘッダーで渡してくる前提で、ここでは認証は行わない。
/// ヘッダーがない・UUIDとして不正ならUserUnresolved（403）。
#[derive(Debug, Clone, Copy)]
pub struct ResolvedUser(pub UserId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ResolvedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<UserId>().ok())
            .map(ResolvedUser)
            .ok_or(AppError::UserUnresolved)
    }
}
