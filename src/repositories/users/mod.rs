//! 사용자 저장소 모듈
//!
//! - [`user_store`] - 어댑터가 요구하는 저장소 계약
//! - [`user_repo`] - MongoDB 구현
//! - [`memory_store`] - 메모리 구현
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::users::MongoUserStore;
//!
//! let store = MongoUserStore::new(Arc::new(Database::new()), "users", schema);
//! store.connect(uri, &options.connection).await?;
//! ```

pub mod memory_store;
pub mod user_repo;
pub mod user_store;

pub use memory_store::*;
pub use user_repo::*;
pub use user_store::*;
