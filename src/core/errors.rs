//! # Adapter Error Handling System
//!
//! 사용자 어댑터 전역에서 사용하는 통합 에러 타입입니다.
//! 설정/스키마 구성 단계의 에러는 호출 즉시 반환되고(fail-fast),
//! 저장소 연산 중 발생한 에러는 해당 연산의 호출자에게 그대로 전달됩니다.
//!
//! ## 에러 분류
//!
//! | 분류 | 변형 | 발생 시점 |
//! |------|------|-----------|
//! | 설정 | `MissingConnectionUri`, `ValidationError` | 옵션 해석 / connect |
//! | 스키마 | `MissingSchema`, `MissingUserProfile`, `MissingUsernameInProfile`, `MissingEmailInProfile` | 필드 계획 수립 |
//! | 구성 | `PlanNotRegistered` | 어댑터 첫 사용 |
//! | 변경 | `UnknownChangeField` | strict 모드 변경 라우팅 |
//! | 저장소 | `DatabaseError`, `StoreError`, `NotConnected`, `ConflictError` | 조회 / 저장 |
//!
//! ## HTTP 응답 매핑
//!
//! | AppError | HTTP Status |
//! |----------|-------------|
//! | `ValidationError`, `UnknownChangeField` | 400 Bad Request |
//! | `NotFound` | 404 Not Found |
//! | `ConflictError` | 409 Conflict |
//! | `NotConnected` | 503 Service Unavailable |
//! | 나머지 | 500 Internal Server Error |
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::core::errors::{AppError, AppResult};
//!
//! fn require_uri(uri: Option<&str>) -> AppResult<&str> {
//!     uri.ok_or(AppError::MissingConnectionUri)
//! }
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 스키마 구성 에러는 문서가 하나도 존재하기 전에 발생하므로
/// 호출자가 설정을 고치기 전까지는 재시도해도 같은 결과가 나옵니다.
/// 저장소 에러는 드라이버 에러를 감싸지 않고 원본 그대로 보존합니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 연결 URI 없이 connect 가 요청됨
    #[error("MissingConnectionURIError: no connection URI configured")]
    MissingConnectionUri,

    /// 필드 계획 대상 스키마가 없음
    #[error("MissingSchemaError: no schema to plan against")]
    MissingSchema,

    /// 프로필 모드인데 프로필 컨테이너를 확보할 수 없음
    #[error("MissingUserProfileError: profile field '{0}' is not a declared sub-document")]
    MissingUserProfile(String),

    /// 프로필 컨테이너에 사용자명 경로가 없음
    #[error("MissingUsernameInProfileError: '{profile}.{field}' is not declared")]
    MissingUsernameInProfile { profile: String, field: String },

    /// 프로필 컨테이너에 이메일 경로가 없음
    #[error("MissingEmailInProfileError: '{profile}.{field}' is not declared")]
    MissingEmailInProfile { profile: String, field: String },

    /// 필드 계획이 라이브 스키마에 적용되지 않은 상태에서 어댑터를 사용함
    #[error("PlanNotRegisteredError: live schema does not declare '{0}'")]
    PlanNotRegistered(String),

    /// strict 모드에서 스키마에 없는 변경 키가 들어옴
    #[error("UnknownChangeFieldError: '{0}' does not map to a declared field")]
    UnknownChangeField(String),

    /// 입력값 / 설정값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 유니크 제약 위반 등 충돌 에러 (409 Conflict)
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 저장소에 연결되지 않은 상태에서 연산을 시도함
    #[error("Store is not connected")]
    NotConnected,

    /// MongoDB 드라이버 에러 (원본 보존)
    #[error("Database error: {0}")]
    DatabaseError(#[from] mongodb::error::Error),

    /// MongoDB 이외 저장소 구현의 에러
    #[error("Store error: {0}")]
    StoreError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 설정/스키마 구성 단계에서 발생하는 에러인지 확인합니다.
    ///
    /// 이 분류의 에러는 런타임 데이터가 아니라 호스트 애플리케이션의
    /// 배선 문제를 뜻하므로 로그 레벨을 구분할 때 사용합니다.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingConnectionUri
                | AppError::MissingSchema
                | AppError::MissingUserProfile(_)
                | AppError::MissingUsernameInProfile { .. }
                | AppError::MissingEmailInProfile { .. }
                | AppError::PlanNotRegistered(_)
        )
    }
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 모든 에러 응답은 `{ "error": "..." }` 형식의 JSON 입니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::ValidationError(_) | AppError::UnknownChangeField(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::HttpResponse::build(status)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
///
/// ```rust,ignore
/// let raw = std::fs::read_to_string(path).context("Failed to read options file")?;
/// ```
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("usernameField must not be empty".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_change_field_is_bad_request() {
        let error = AppError::UnknownChangeField("nickname".to_string());

        assert_eq!(error.error_response().status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_connected_is_service_unavailable() {
        let response = AppError::NotConnected.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_schema_errors_are_internal() {
        let error = AppError::MissingEmailInProfile {
            profile: "profile".to_string(),
            field: "email".to_string(),
        };

        assert_eq!(error.error_response().status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().starts_with("MissingEmailInProfileError"));
        assert!(error.to_string().contains("profile.email"));
    }

    #[test]
    fn test_configuration_error_classification() {
        assert!(AppError::MissingSchema.is_configuration_error());
        assert!(AppError::PlanNotRegistered("hash".to_string()).is_configuration_error());
        assert!(!AppError::NotConnected.is_configuration_error());
        assert!(!AppError::ConflictError("dup".to_string()).is_configuration_error());
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("original error");
        let app_result = result.context("Additional context");

        if let Err(AppError::InternalError(msg)) = app_result {
            assert!(msg.contains("Additional context"));
            assert!(msg.contains("original error"));
        } else {
            panic!("Expected InternalError");
        }
    }
}
