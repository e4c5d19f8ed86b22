//! # Domain Entities Module
//!
//! 저장소에 영속되는 사용자 문서 엔티티입니다.
//!
//! ## 특징
//!
//! - **스키마 주도**: 필드 구성은 호스트 스키마와 필드 계획이 결정합니다.
//! - **ObjectId 식별**: `_id` 는 저장소가 최초 저장 시 부여합니다.
//! - **프로필 하위 문서**: 프로필 모드에서는 사용자명 / 이메일이 하위 문서에 위치합니다.

pub mod users;

pub use users::*;
