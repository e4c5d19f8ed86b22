//! # MongoDB 사용자 저장소 구현
//!
//! MongoDB 컬렉션을 사용하는 [`UserStore`] 구현입니다.
//!
//! ## 특징
//!
//! - **스키마 스냅샷**: 호스트 스키마를 메모리에 보관하고 필드 계획으로 확장합니다.
//! - **유니크 인덱스**: 스키마 확장 시 `unique` 로 선언된 경로마다 인덱스를 생성합니다.
//! - **에러 보존**: 드라이버 에러는 `AppError::DatabaseError` 로 원본 그대로 전달합니다.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, error, info};
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::config::adapter_options::ConnectOptions;
use crate::core::errors::{AppError, AppResult};
use crate::db::Database;
use crate::domain::entities::users::UserDocument;
use crate::domain::schema::{Schema, SchemaFieldDescriptor};
use crate::repositories::users::user_store::UserStore;

/// MongoDB 기반 사용자 저장소
///
/// ## 사용 예제
///
/// ```rust,ignore
/// let store = MongoUserStore::new(Arc::new(Database::new()), "users", host_schema);
/// let plan = SchemaFieldPlanner::register(&store, &options).await?;
/// store.connect(uri, &options.connection).await?;
///
/// let adapter = UserAdapter::new(Arc::new(store), plan);
/// ```
pub struct MongoUserStore {
    db: Arc<Database>,
    collection_name: String,
    schema: RwLock<Schema>,
}

impl MongoUserStore {
    pub fn new(db: Arc<Database>, collection_name: impl Into<String>, schema: Schema) -> Self {
        Self {
            db,
            collection_name: collection_name.into(),
            schema: RwLock::new(schema),
        }
    }

    fn collection(&self) -> AppResult<Collection<Document>> {
        Ok(self.db.handle()?.collection::<Document>(&self.collection_name))
    }

    fn unique_paths(schema: &Schema, prefix: Option<&str>) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, spec) in schema.fields() {
            let path = match prefix {
                Some(prefix) => format!("{}.{}", prefix, name),
                None => name.clone(),
            };
            if spec.unique {
                paths.push(path.clone());
            }
            if let Some(inner) = spec.as_nested() {
                paths.extend(Self::unique_paths(inner, Some(&path)));
            }
        }
        paths
    }

    /// 스키마에서 유니크로 선언된 경로마다 인덱스를 생성합니다.
    ///
    /// 인덱스 이름은 `{path}_unique` 이며, 값이 없는 문서는 제외(sparse)합니다.
    /// 연결되지 않은 상태면 `connect` 시점으로 미룹니다.
    pub async fn create_indexes(&self) -> AppResult<()> {
        let collection = match self.collection() {
            Ok(collection) => collection,
            Err(AppError::NotConnected) => return Ok(()),
            Err(e) => return Err(e),
        };

        let paths = Self::unique_paths(&self.schema()?, None);
        if paths.is_empty() {
            return Ok(());
        }

        let indexes = paths.iter().map(|path| {
            let mut keys = Document::new();
            keys.insert(path.clone(), 1);
            IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name(format!("{}_unique", path))
                        .build(),
                )
                .build()
        });

        collection.create_indexes(indexes).await.map_err(|e| {
            error!("유니크 인덱스 생성 실패: {}", e);
            AppError::DatabaseError(e)
        })?;

        debug!("유니크 인덱스 생성 완료: {:?}", paths);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn connect(&self, uri: &str, options: &ConnectOptions) -> AppResult<()> {
        self.db
            .connect(uri, &options.database_name, &options.app_name)
            .await?;
        self.create_indexes().await
    }

    async fn find_one(&self, query: Document) -> AppResult<Option<UserDocument>> {
        let found = self.collection()?.find_one(query).await.map_err(|e| {
            error!("사용자 조회 실패: {}", e);
            AppError::DatabaseError(e)
        })?;

        Ok(found.map(UserDocument::from_document))
    }

    async fn save(&self, user: UserDocument) -> AppResult<UserDocument> {
        let collection = self.collection()?;
        let mut document = user.into_document();

        match document.get_object_id("_id") {
            Ok(id) => {
                let options = ReplaceOptions::builder().upsert(true).build();
                collection
                    .replace_one(doc! { "_id": id }, &document)
                    .with_options(options)
                    .await
                    .map_err(|e| {
                        error!("사용자 저장 실패 ({}): {}", id.to_hex(), e);
                        AppError::DatabaseError(e)
                    })?;
            }
            Err(_) => {
                let result = collection.insert_one(&document).await.map_err(|e| {
                    error!("사용자 생성 실패: {}", e);
                    AppError::DatabaseError(e)
                })?;
                document.insert("_id", result.inserted_id);
            }
        }

        Ok(UserDocument::from_document(document))
    }

    fn schema(&self) -> AppResult<Schema> {
        self.schema.read().map(|schema| schema.clone()).map_err(|_| {
            error!("사용자 스키마 잠금 손상");
            AppError::StoreError("schema lock poisoned".to_string())
        })
    }

    async fn extend_schema(&self, descriptor: &SchemaFieldDescriptor) -> AppResult<usize> {
        let added = {
            let mut schema = self
                .schema
                .write()
                .map_err(|_| AppError::StoreError("schema lock poisoned".to_string()))?;
            schema.extend(descriptor)
        };

        info!("📐 사용자 스키마 확장: {} 필드 추가", added);
        self.create_indexes().await?;

        Ok(added)
    }
}
