//! 사용자 DTO 모듈
//!
//! - [`patch`] - 라우팅이 끝난 변경 패치
//! - [`user_view`] - BSON 값을 평문 JSON 값으로 바꾸는 뷰 변환

pub mod patch;
pub mod user_view;

pub use patch::*;
pub use user_view::*;
