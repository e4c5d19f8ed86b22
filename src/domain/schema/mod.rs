//! # Schema Model
//!
//! 사용자 문서의 타입 선언 계층입니다.
//!
//! - [`field_spec`] - 단일 필드 선언과 값 캐스팅 규칙
//! - [`model`] - 라이브 스키마 (점 경로 조회, 확장)
//! - [`descriptor`] - 필드 계획 결과물
//!
//! ```text
//! Schema
//! ├── username : String (trim, unique, lowercase)
//! ├── hash     : String
//! ├── loginAttempts : Number (default 0)
//! └── profile  : Nested
//!     ├── username : String
//!     └── email    : String
//! ```

pub mod descriptor;
pub mod field_spec;
pub mod model;

pub use descriptor::{ProfileDescriptor, SchemaFieldDescriptor};
pub use field_spec::{FieldDefault, FieldKind, FieldSpec};
pub use model::Schema;
