//! # Data Transfer Objects (DTO) Module
//!
//! 어댑터 경계를 넘나드는 데이터 구조를 정의합니다.
//!
//! ## 모듈 구조
//!
//! ```text
//! dto/
//! └── users/
//!     ├── patch.rs      # 변경 라우팅 결과 (최상위 / 프로필 분리)
//!     └── user_view.rs  # 호출자에게 노출되는 평문 값 뷰
//! ```
//!
//! ## 보안 고려사항
//!
//! 원본 문서에는 해시와 솔트가 들어 있습니다. 외부로 나가는 모든 데이터는
//! 포함/제외 목록이 적용된 뷰를 거치도록 합니다.

pub mod users;

pub use users::*;
