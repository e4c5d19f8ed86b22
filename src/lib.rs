//! 문서 저장소 기반 사용자 어댑터
//!
//! 호스트 애플리케이션의 사용자 스키마를 인증에 필요한 필드로 확장하고,
//! 의미 필드 이름(`username`, `loginAttempts` 등)을 설정 가능한 물리 필드
//! 이름으로 매핑하여 사용자 문서를 생성, 조회, 변경, 투영합니다.
//!
//! # Features
//!
//! - **옵션 해석**: 희소한 호출자 설정을 검증된 완전한 설정으로 병합
//! - **스키마 계획**: 호스트 스키마에 없는 필드만 추가, 프로필 모드 지원
//! - **변경 라우팅**: 의미 키 변경 객체를 최상위 / 프로필 할당으로 분리
//! - **필드 투영**: 포함 / 제외 목록과 프로필 훅으로 평문 뷰 생성
//! - **MongoDB**: 유니크 인덱스를 갖춘 사용자 컬렉션 저장소
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← 읽기 전용 REST 엔드포인트
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   UserAdapter   │ ← ChangeRouter / FieldProjector 조합
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    UserStore    │ ← MongoDB 또는 메모리 저장소
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use userbase_mongo_adapter::config::{OptionsResolver, ResolveOptions, UserOptions};
//! use userbase_mongo_adapter::services::schema::SchemaFieldPlanner;
//! use userbase_mongo_adapter::services::users::UserAdapter;
//!
//! let options = Arc::new(OptionsResolver::resolve(&user_options, ResolveOptions::default())?);
//! let plan = SchemaFieldPlanner::register(store.as_ref(), options).await?;
//! let adapter = UserAdapter::new(store, plan);
//!
//! adapter.connect().await?;
//! let user = adapter.find_by_username("alice").await?;
//! ```

pub mod core;
pub mod config;
pub mod db;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
