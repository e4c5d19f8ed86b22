//! # Configuration Module
//!
//! 어댑터 설정과 실행 환경 설정을 담당하는 모듈입니다.
//!
//! ## 모듈 구성
//!
//! - [`adapter_options`] - 사용자 어댑터 옵션 (필드 이름 매핑, 플래그, 투영 목록) 해석 및 검증
//! - [`data_config`] - 실행 환경, 저장소 연결, 서버 바인딩 설정
//!
//! ## 설정 흐름
//!
//! ```text
//! USERBASE_OPTIONS / USERBASE_OPTIONS_FILE (JSON)
//!          │            MONGODB_URI, DATABASE_NAME, USER_COLLECTION
//!          ▼                      │
//!     UserOptions  ◄──────────────┘
//!          │
//!          ▼  OptionsResolver::resolve (기본값 병합 + 검증)
//!   AdapterOptions (불변, Arc 로 공유)
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{Environment, OptionsResolver, ResolveOptions, ServerConfig, UserOptions};
//!
//! let env = Environment::current();
//! let options = OptionsResolver::resolve(
//!     &UserOptions::from_env()?,
//!     ResolveOptions::enforcing_connection_uri(),
//! )?;
//!
//! println!("{}:{} ({:?})", ServerConfig::host(), ServerConfig::port(), env);
//! ```
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 저장소
//! export MONGODB_URI="mongodb://localhost:27017"
//! export DATABASE_NAME="userbase"
//! export USER_COLLECTION="users"
//!
//! # 어댑터 옵션 (JSON)
//! export USERBASE_OPTIONS='{"useProfile": true, "excludedFields": ["hash", "salt"]}'
//!
//! # 서버
//! export HOST="0.0.0.0"
//! export PORT="8080"
//! export ENVIRONMENT="development"
//! ```

pub mod adapter_options;
pub mod data_config;

pub use adapter_options::*;
pub use data_config::*;
