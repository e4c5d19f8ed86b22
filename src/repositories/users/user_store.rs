//! # 사용자 저장소 계약
//!
//! 어댑터가 저장소에 요구하는 최소 연산 집합입니다.
//!
//! | 연산 | 설명 |
//! |------|------|
//! | `connect` | 연결 수립 (한 번만 전이) |
//! | `find_one` | 쿼리에 맞는 문서 하나 조회 |
//! | `save` | `_id` 가 없으면 삽입, 있으면 교체 |
//! | `schema` / `extend_schema` | 사용 전에 확장 가능한 타입 스키마 |
//!
//! 저장소 에러는 변환 없이 호출자에게 전달됩니다.

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::config::adapter_options::ConnectOptions;
use crate::core::errors::AppResult;
use crate::domain::entities::users::UserDocument;
use crate::domain::schema::{Schema, SchemaFieldDescriptor};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// 저장소에 연결합니다.
    async fn connect(&self, uri: &str, options: &ConnectOptions) -> AppResult<()>;

    /// 쿼리에 맞는 첫 문서를 반환합니다. 없으면 `None` 입니다.
    async fn find_one(&self, query: Document) -> AppResult<Option<UserDocument>>;

    /// 문서를 저장하고 저장된 문서(`_id` 포함)를 반환합니다.
    async fn save(&self, user: UserDocument) -> AppResult<UserDocument>;

    /// 현재 라이브 스키마의 스냅샷
    ///
    /// 스키마를 읽을 수 없으면 빈 스키마 대신 `StoreError` 를 반환합니다.
    fn schema(&self) -> AppResult<Schema>;

    /// 필드 계획을 라이브 스키마에 적용합니다.
    ///
    /// 이미 선언된 경로는 건드리지 않으며, 새로 추가된 필드 수를 반환합니다.
    async fn extend_schema(&self, descriptor: &SchemaFieldDescriptor) -> AppResult<usize>;
}
