//! # 메모리 사용자 저장소
//!
//! 프로세스 메모리에 문서를 보관하는 [`UserStore`] 구현입니다.
//! 개발, 테스트, 소규모 배포에 사용합니다.
//!
//! ## 특징
//!
//! - **스레드 안전**: `RwLock` 으로 동시 읽기/쓰기를 보호합니다.
//! - **쿼리 지원**: 점 경로 동등 비교와 `$or` 만 지원합니다. 어댑터가 만드는 쿼리는 이 두 형태뿐입니다.
//! - **유니크 제약**: 스키마에서 `unique` 로 선언된 경로는 저장 시 중복을 거부합니다.
//! - **쓰기 계측**: `write_count` 로 저장 호출 횟수를 확인할 수 있습니다.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use log::{debug, error, info};
use mongodb::bson::{oid::ObjectId, Bson, Document};

use crate::config::adapter_options::ConnectOptions;
use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::users::UserDocument;
use crate::domain::schema::{Schema, SchemaFieldDescriptor};
use crate::repositories::users::user_store::UserStore;

/// 메모리 기반 사용자 저장소
pub struct InMemoryUserStore {
    schema: RwLock<Schema>,
    documents: RwLock<Vec<Document>>,
    connected: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryUserStore {
    /// 호스트 스키마로 저장소를 생성합니다.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: RwLock::new(schema),
            documents: RwLock::new(Vec::new()),
            connected: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// 지금까지 성공한 `save` 호출 수
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 스키마 잠금을 손상시킵니다. 잠금 에러 전파를 검증하는 테스트에서만 사용합니다.
    #[cfg(test)]
    pub(crate) fn poison_schema_lock(self: &std::sync::Arc<Self>) {
        let store = std::sync::Arc::clone(self);
        let _ = std::thread::spawn(move || {
            let _guard = store.schema.write();
            panic!("schema lock poisoned on purpose");
        })
        .join();
    }

    fn poisoned() -> AppError {
        AppError::StoreError("in-memory store lock poisoned".to_string())
    }

    /// 스키마에서 유니크로 선언된 모든 경로 (`profile.username` 형태 포함)
    fn unique_paths(schema: &Schema) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, spec) in schema.fields() {
            if spec.unique {
                paths.push(name.clone());
            }
            if let Some(inner) = spec.as_nested() {
                paths.extend(
                    Self::unique_paths(inner)
                        .into_iter()
                        .map(|child| format!("{}.{}", name, child)),
                );
            }
        }
        paths
    }

    fn check_unique(&self, candidate: &Document, id: &ObjectId, documents: &[Document]) -> AppResult<()> {
        let schema = self.schema.read().map_err(|_| Self::poisoned())?;

        for path in Self::unique_paths(&schema) {
            let Some(value) = value_at(candidate, &path) else {
                continue;
            };
            if matches!(value, Bson::Null) {
                continue;
            }

            let duplicate = documents.iter().any(|existing| {
                existing.get_object_id("_id").ok().as_ref() != Some(id)
                    && value_at(existing, &path) == Some(value)
            });

            if duplicate {
                return Err(AppError::ConflictError(format!(
                    "duplicate value for unique field '{}'",
                    path
                )));
            }
        }

        Ok(())
    }
}

/// 점 경로로 문서 안의 값을 찾습니다.
fn value_at<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        None => doc.get(path),
        Some((head, rest)) => match doc.get(head)? {
            Bson::Document(inner) => value_at(inner, rest),
            _ => None,
        },
    }
}

/// 동등 비교와 `$or` 로 구성된 쿼리를 평가합니다.
fn matches(doc: &Document, query: &Document) -> bool {
    query.iter().all(|(key, expected)| match key.as_str() {
        "$or" => match expected {
            Bson::Array(branches) => branches.iter().any(|branch| match branch {
                Bson::Document(branch) => matches(doc, branch),
                _ => false,
            }),
            _ => false,
        },
        path => value_at(doc, path) == Some(expected),
    })
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn connect(&self, uri: &str, options: &ConnectOptions) -> AppResult<()> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            info!(
                "✅ 메모리 저장소 연결: {} (collection: {})",
                uri, options.collection_name
            );
        }
        Ok(())
    }

    async fn find_one(&self, query: Document) -> AppResult<Option<UserDocument>> {
        let documents = self.documents.read().map_err(|_| Self::poisoned())?;

        Ok(documents
            .iter()
            .find(|doc| matches(doc, &query))
            .cloned()
            .map(UserDocument::from_document))
    }

    async fn save(&self, user: UserDocument) -> AppResult<UserDocument> {
        let mut document = user.into_document();
        let id = match document.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        let mut documents = self.documents.write().map_err(|_| Self::poisoned())?;
        self.check_unique(&document, &id, &documents)?;

        match documents
            .iter_mut()
            .find(|existing| existing.get_object_id("_id").ok() == Some(id))
        {
            Some(existing) => *existing = document.clone(),
            None => documents.push(document.clone()),
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!("메모리 저장소 저장: {}", id.to_hex());

        Ok(UserDocument::from_document(document))
    }

    fn schema(&self) -> AppResult<Schema> {
        self.schema
            .read()
            .map(|schema| schema.clone())
            .map_err(|_| {
                error!("메모리 저장소 스키마 잠금 손상");
                Self::poisoned()
            })
    }

    async fn extend_schema(&self, descriptor: &SchemaFieldDescriptor) -> AppResult<usize> {
        let mut schema = self.schema.write().map_err(|_| Self::poisoned())?;
        Ok(schema.extend(descriptor))
    }
}
