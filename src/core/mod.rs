//! # Core Module
//!
//! 어댑터 전역에서 공유하는 핵심 타입을 제공합니다.
//!
//! ## 모듈 구성
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError**: 설정, 스키마, 라우팅, 저장소 에러를 하나의 열거형으로 표현
//! - **HTTP 통합**: Actix-Web `ResponseError` 구현
//! - **자동 변환**: `thiserror` 기반 에러 체인, MongoDB 드라이버 에러는 원본 보존
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use crate::core::errors::{AppError, AppResult};
//!
//! fn plan(schema: Option<&Schema>) -> AppResult<()> {
//!     let _schema = schema.ok_or(AppError::MissingSchema)?;
//!     Ok(())
//! }
//! ```

pub mod errors;

pub use errors::*;
