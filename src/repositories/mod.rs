//! # Repository Layer
//!
//! 사용자 문서의 영속화를 담당하는 저장소 계층입니다.
//!
//! 어댑터는 구체적인 저장소가 아니라 [`users::UserStore`] trait 에만 의존하므로
//! MongoDB 외의 저장소로 교체하거나 테스트에서 메모리 저장소를 주입할 수 있습니다.
//!
//! # Features
//!
//! - **MongoUserStore**: MongoDB 컬렉션 기반 구현, 유니크 인덱스 생성
//! - **InMemoryUserStore**: 프로세스 내 구현, 유니크 제약 검사 포함
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::users::{InMemoryUserStore, UserStore};
//!
//! let store = InMemoryUserStore::new(schema);
//! let saved = store.save(UserDocument::new()).await?;
//! ```

pub mod users;

pub use users::*;
