//! # HTTP Request Handlers Module
//!
//! 사용자 어댑터를 HTTP 로 노출하는 핸들러 함수들입니다.
//!
//! ## 아키텍처 위치
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   Handlers (이 모듈) - HTTP 엔드포인트 처리         ← Web Layer
//! ├─────────────────────────────────────────────┤
//!   UserAdapter - 라우팅 / 투영                    ← Service Layer
//! ├─────────────────────────────────────────────┤
//!   UserStore - MongoDB / 메모리 저장소             ← Repository Layer
//! └─────────────────────────────────────────────┘
//! ```
//!
//! 어댑터는 `main.rs` 에서 한 번 구성되어 `web::Data<UserAdapter>` 로
//! 모든 워커에 공유됩니다.
//!
//! ```rust,ignore
//! #[get("/{user_id}")]
//! pub async fn get_user(
//!     adapter: web::Data<UserAdapter>,
//!     user_id: web::Path<String>,
//! ) -> Result<HttpResponse, AppError> {
//!     let found = adapter.find_by_id(&user_id).await?;
//!     // ...
//! }
//! ```

pub mod users;
