//! 사용자 어댑터 서비스 모듈
//!
//! 옵션 기반 사용자 문서 연산을 구성하는 엔진들을 제공합니다.
//!
//! # Features
//!
//! - [`change_router`] - 의미 키 변경 객체 → 최상위 / 프로필 패치
//! - [`field_projector`] - 원본 문서 → 포함/제외 목록이 적용된 평문 뷰
//! - [`user_adapter`] - 생성, 수정, 조회, 직렬화, 필드 getter
//!
//! # Security
//!
//! - 외부로 나가는 데이터는 `serialize` 를 거쳐 해시 / 솔트를 제외할 수 있습니다.
//! - 사용자명 조회 값은 저장 시점과 같은 규칙으로 정규화됩니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::users::UserAdapter;
//!
//! let adapter = UserAdapter::new(store, plan);
//! let user = adapter.find_by_username("Alice").await?;
//! let view = user.map(|u| adapter.serialize(&u));
//! ```

pub mod change_router;
pub mod field_projector;
pub mod user_adapter;

pub use change_router::ChangeRouter;
pub use field_projector::FieldProjector;
pub use user_adapter::UserAdapter;
