//! # 사용자 조회 핸들러
//!
//! 어댑터의 조회 연산을 읽기 전용 HTTP 엔드포인트로 노출합니다.
//! 모든 응답 본문은 [`UserAdapter::serialize`] 로 투영된 뷰이므로
//! 제외 필드(`hash`, `salt` 등)는 설정에 따라 응답에서 빠집니다.
//!
//! ```bash
//! curl http://localhost:8080/api/v1/users/by-username/alice
//! ```

use actix_web::{get, web, HttpResponse};
use log::debug;

use crate::core::errors::AppError;
use crate::domain::entities::users::UserDocument;
use crate::services::users::UserAdapter;
use crate::utils::string_utils::validate_required_string;

/// 조회 결과를 응답으로 변환합니다. 결과가 없으면 404 입니다.
fn respond(
    adapter: &UserAdapter,
    found: Option<UserDocument>,
    lookup: &str,
) -> Result<HttpResponse, AppError> {
    match found {
        Some(user) => Ok(HttpResponse::Ok().json(adapter.serialize(&user))),
        None => {
            debug!("사용자 없음: {}", lookup);
            Err(AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", lookup)))
        }
    }
}

/// ID 로 사용자 조회
///
/// `GET /api/v1/users/{user_id}`
///
/// ObjectId 형식이 아니면 400 을 반환합니다.
#[get("/{user_id}")]
pub async fn get_user(
    adapter: web::Data<UserAdapter>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = validate_required_string(&user_id, "user_id")?;
    let found = adapter.find_by_id(&user_id).await?;

    respond(&adapter, found, &user_id)
}

/// 사용자명으로 조회
///
/// `GET /api/v1/users/by-username/{username}`
///
/// 대소문자 정규화는 어댑터가 처리합니다.
#[get("/by-username/{username}")]
pub async fn get_user_by_username(
    adapter: web::Data<UserAdapter>,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = validate_required_string(&username, "username")?;
    let found = adapter.find_by_username(&username).await?;

    respond(&adapter, found, &username)
}

/// 이메일로 조회
///
/// `GET /api/v1/users/by-email/{email}`
#[get("/by-email/{email}")]
pub async fn get_user_by_email(
    adapter: web::Data<UserAdapter>,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = validate_required_string(&email, "email")?;
    let found = adapter.find_by_email(&email).await?;

    respond(&adapter, found, &email)
}
