//! # Schema Services
//!
//! 어댑터 설정으로부터 사용자 스키마 확장 계획을 세우고 라이브 스키마에 등록합니다.
//!
//! ```rust,ignore
//! use crate::services::schema::SchemaFieldPlanner;
//!
//! let plan = SchemaFieldPlanner::register(store.as_ref(), options.clone()).await?;
//! let adapter = UserAdapter::new(store, plan);
//! ```

pub mod field_planner;

pub use field_planner::*;
