//! # Service Layer
//!
//! 어댑터의 핵심 엔진을 제공하는 서비스 계층입니다.
//!
//! ```text
//! OptionsResolver ──► SchemaFieldPlanner ──► RegisteredPlan
//!                                                 │
//!                                                 ▼
//!                 ChangeRouter / FieldProjector ◄── UserAdapter ──► UserStore
//! ```
//!
//! - [`schema`] - 필드 계획 수립과 등록
//! - [`users`] - 변경 라우팅, 필드 투영, 어댑터
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::{schema::SchemaFieldPlanner, users::UserAdapter};
//!
//! let plan = SchemaFieldPlanner::register(store.as_ref(), options).await?;
//! let adapter = UserAdapter::new(store, plan);
//! ```

pub mod schema;
pub mod users;
