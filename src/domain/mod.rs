//! # Domain Layer Module
//!
//! 사용자 어댑터의 도메인 타입을 정의합니다.
//!
//! ## 아키텍처 개요
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── schema    - 라이브 스키마 모델, 필드 선언, 필드 계획 서술자
//! ├── entities  - 저장소에 보관되는 원본 사용자 문서
//! └── dto       - 변경 패치, 호출자에게 노출되는 평문 뷰
//!      │
//!      ▼
//! Service Layer (planner / router / projector / adapter)
//!      │
//!      ▼
//! Repository Layer (UserStore 구현체)
//! ```
//!
//! 사용자 문서는 고정된 구조체가 아니라 호스트 애플리케이션의 스키마와
//! 어댑터 설정에 따라 모양이 결정되므로, 엔티티는 BSON 문서를 감싼
//! 형태로 표현합니다.

pub mod dto;
pub mod entities;
pub mod schema;

pub use dto::*;
pub use entities::*;
pub use schema::*;
