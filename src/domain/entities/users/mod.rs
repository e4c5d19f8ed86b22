//! Users Entity Module
//!
//! 원본(raw) 사용자 문서 래퍼를 제공합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use crate::domain::entities::users::UserDocument;
//!
//! let mut user = UserDocument::new();
//! user.set("hash", "abc");
//! user.set_in_profile("profile", "username", "alice");
//!
//! assert_eq!(user.get_str("hash"), Some("abc"));
//! ```

pub mod user;

pub use user::*;
