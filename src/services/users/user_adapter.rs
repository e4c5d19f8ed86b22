//! # User Adapter
//!
//! 옵션 해석, 변경 라우팅, 필드 투영을 조합해 사용자 저장소 연산을 제공하는 어댑터입니다.
//!
//! ## 연산 흐름
//!
//! ```text
//! create / update ──► ChangeRouter ──► Patch ──► UserStore::save
//! find_by_*       ──► 쿼리 정규화  ──► UserStore::find_one
//! serialize       ──► FieldProjector ──► UserView
//! ```
//!
//! ## 구성 순서
//!
//! ```rust,ignore
//! let options = Arc::new(OptionsResolver::resolve(&user_options, ResolveOptions::default())?);
//! let store = Arc::new(MongoUserStore::new(db, &options.connection.collection_name, host_schema));
//!
//! // 계획 등록 없이 어댑터를 만들 수 없습니다.
//! let plan = SchemaFieldPlanner::register(store.as_ref(), options).await?;
//! let adapter = UserAdapter::new(store, plan);
//!
//! adapter.connect().await?;
//! let user = adapter.create(Some(&doc! { "username": "Alice", "hash": h, "salt": s })).await?;
//! let same = adapter.find_by_username("ALICE").await?;
//! ```
//!
//! 어댑터는 문서를 캐시하지 않으며, 모든 연산은 저장소에 대한 단발성 비동기 요청입니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info};
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde_json::Value;

use crate::config::adapter_options::{AdapterOptions, SemanticField};
use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::users::UserView;
use crate::domain::entities::users::{as_i64, UserDocument};
use crate::domain::schema::{FieldSpec, Schema};
use crate::repositories::users::UserStore;
use crate::services::schema::RegisteredPlan;
use crate::services::users::change_router::ChangeRouter;
use crate::services::users::field_projector::FieldProjector;

/// 사용자 어댑터
///
/// 저장소 구현에 대해 제네릭입니다. 기본 타입 인자는 `dyn UserStore` 이며,
/// 핸들러에서는 `web::Data<UserAdapter>` 로 공유합니다.
pub struct UserAdapter<S: UserStore + ?Sized = dyn UserStore> {
    store: Arc<S>,
    plan: RegisteredPlan,
    options: Arc<AdapterOptions>,
    verified: AtomicBool,
}

impl<S: UserStore + ?Sized> UserAdapter<S> {
    /// 등록된 필드 계획으로 어댑터를 생성합니다.
    pub fn new(store: Arc<S>, plan: RegisteredPlan) -> Self {
        let options = plan.options().clone();
        Self {
            store,
            plan,
            options,
            verified: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// 라이브 스키마가 계획된 모든 경로를 선언하는지 첫 사용 시 한 번 확인합니다.
    fn ensure_registered(&self) -> AppResult<Schema> {
        let schema = self.store.schema()?;
        if self.verified.load(Ordering::Acquire) {
            return Ok(schema);
        }

        if let Some(missing) = self
            .plan
            .required_paths()
            .iter()
            .find(|path| !schema.declares(path))
        {
            error!("필드 계획이 등록되지 않은 스키마: '{}' 없음", missing);
            return Err(AppError::PlanNotRegistered(missing.clone()));
        }

        self.verified.store(true, Ordering::Release);
        Ok(schema)
    }

    /// 설정된 URI 로 저장소에 연결합니다.
    ///
    /// # 에러
    ///
    /// * `MissingConnectionUri` - 연결 URI 가 설정되지 않음
    /// * 저장소 연결 에러 (변환 없이 전달)
    pub async fn connect(&self) -> AppResult<()> {
        let uri = self
            .options
            .connection
            .mongo_uri
            .as_deref()
            .ok_or(AppError::MissingConnectionUri)?;

        info!("📡 사용자 저장소 연결 시도 (collection: {})", self.options.connection.collection_name);

        match self.store.connect(uri, &self.options.connection).await {
            Ok(()) => {
                info!("✅ 사용자 저장소 연결 완료");
                Ok(())
            }
            Err(e) => {
                error!("❌ 사용자 저장소 연결 실패: {}", e);
                Err(e)
            }
        }
    }

    /// 새 사용자 문서를 생성합니다.
    ///
    /// 초기 속성은 변경 객체와 같은 규칙으로 라우팅되고, 스키마 기본값
    /// (`loginAttempts = 0`, `signupDate = now` 등)이 먼저 채워집니다.
    pub async fn create(&self, props: Option<&Document>) -> AppResult<UserDocument> {
        let schema = self.ensure_registered()?;
        let patch = ChangeRouter::route(props, &schema, &self.options)?;

        let mut user = UserDocument::new();
        self.apply_defaults(&schema, &mut user);
        patch.apply_to(&mut user, &self.options.fields.profile);

        self.store.save(user).await
    }

    fn apply_defaults(&self, schema: &Schema, user: &mut UserDocument) {
        let container = self.options.fields.profile.as_str();

        for (name, spec) in schema.fields() {
            if let Some(value) = spec.default_value() {
                user.set(name.clone(), value);
            }
        }

        if let Some(profile) = schema.nested(container) {
            for (name, spec) in profile.fields() {
                if let Some(value) = spec.default_value() {
                    user.set_in_profile(container, name.clone(), value);
                }
            }
        }
    }

    /// 변경 객체를 적용하고 저장합니다.
    ///
    /// 변경 객체가 없거나 비어 있으면 저장 없이 문서를 그대로 반환합니다.
    pub async fn update(&self, user: UserDocument, changes: Option<&Document>) -> AppResult<UserDocument> {
        let schema = self.ensure_registered()?;
        let patch = ChangeRouter::route(changes, &schema, &self.options)?;

        if patch.is_empty() {
            return Ok(user);
        }

        let mut user = user;
        patch.apply_to(&mut user, &self.options.fields.profile);
        self.store.save(user).await
    }

    /// [`UserAdapter::update`] 와 같습니다.
    pub async fn update_profile(&self, user: UserDocument, changes: Option<&Document>) -> AppResult<UserDocument> {
        self.update(user, changes).await
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<UserDocument>> {
        self.ensure_registered()?;
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError(format!("유효하지 않은 ID 형식입니다: {}", id)))?;

        let mut query = Document::new();
        query.insert("_id", object_id);
        self.store.find_one(query).await
    }

    /// 사용자명으로 조회합니다.
    ///
    /// 조회 값은 저장 시점과 같은 규칙으로 정규화되므로, `usernameLowerCase` 가
    /// 켜져 있으면 `"ALICE"` 로 `"Alice"` 로 생성된 사용자를 찾을 수 있습니다.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserDocument>> {
        self.find_by_identity(SemanticField::Username, username).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<UserDocument>> {
        self.find_by_identity(SemanticField::Email, email).await
    }

    async fn find_by_identity(&self, field: SemanticField, value: &str) -> AppResult<Option<UserDocument>> {
        let schema = self.ensure_registered()?;
        let physical = self.options.field(field).to_string();
        let (path, normalized) = self.normalized_query(&schema, &physical, value)?;

        let mut query = Document::new();
        query.insert(path, normalized);
        self.store.find_one(query).await
    }

    /// 외부 인증 프로바이더 ID 로 조회합니다.
    ///
    /// `field` 는 `externalIdFields` 에 설정된 이름이어야 합니다.
    pub async fn find_by_external_id(&self, field: &str, id: &str) -> AppResult<Option<UserDocument>> {
        let mut ids = Document::new();
        ids.insert(field, id);
        self.find_by_external_ids(&ids).await
    }

    /// 여러 외부 ID 중 하나라도 일치하는 사용자를 조회합니다.
    ///
    /// 빈 문서는 조회 없이 `None` 을 반환합니다.
    pub async fn find_by_external_ids(&self, ids: &Document) -> AppResult<Option<UserDocument>> {
        let schema = self.ensure_registered()?;
        let mut branches = Vec::with_capacity(ids.len());

        for (field, value) in ids {
            if !self.options.external_id_fields.iter().any(|configured| configured == field) {
                return Err(AppError::ValidationError(format!(
                    "'{}' is not a configured external id field",
                    field
                )));
            }
            let path = self.options.path_of(field);
            let normalized = match schema.path(&path) {
                Some(spec) => spec.cast(&path, value.clone())?,
                None => value.clone(),
            };

            let mut branch = Document::new();
            branch.insert(path, normalized);
            branches.push(Bson::Document(branch));
        }

        if branches.is_empty() {
            return Ok(None);
        }

        let mut query = Document::new();
        query.insert("$or", branches);
        self.store.find_one(query).await
    }

    pub async fn find_by_reset_password_hash(&self, hash: &str) -> AppResult<Option<UserDocument>> {
        self.ensure_registered()?;
        let mut query = Document::new();
        query.insert(self.options.field(SemanticField::ResetPasswordHash), hash);
        self.store.find_one(query).await
    }

    fn normalized_query(&self, schema: &Schema, physical: &str, value: &str) -> AppResult<(String, Bson)> {
        let path = self.options.path_of(physical);
        let fallback = FieldSpec::string();
        let spec = schema.path(&path).unwrap_or(&fallback);
        let normalized =
            ChangeRouter::normalize_value(&self.options, physical, spec, &path, Bson::String(value.to_string()))?;
        Ok((path, normalized))
    }

    /// 호출자에게 노출할 뷰
    pub fn serialize(&self, user: &UserDocument) -> UserView {
        FieldProjector::project(&self.options, user.as_document())
    }

    /// 프로필 뷰
    pub fn get_profile(&self, user: &UserDocument) -> Value {
        FieldProjector::project_profile(&self.options, user.as_document())
    }

    pub fn get_id(&self, user: &UserDocument) -> Option<String> {
        user.id_hex()
    }

    pub fn get_username(&self, user: &UserDocument) -> Option<String> {
        self.identity_string(user, SemanticField::Username)
    }

    pub fn get_email(&self, user: &UserDocument) -> Option<String> {
        self.identity_string(user, SemanticField::Email)
    }

    fn identity_string(&self, user: &UserDocument, field: SemanticField) -> Option<String> {
        match user.lookup(self.options.profile_container(), self.options.field(field))? {
            Bson::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn get_salt(&self, user: &UserDocument) -> Option<String> {
        user.get_str(self.options.field(SemanticField::Salt)).map(str::to_string)
    }

    pub fn get_hash(&self, user: &UserDocument) -> Option<String> {
        user.get_str(self.options.field(SemanticField::Hash)).map(str::to_string)
    }

    pub fn get_login_attempts(&self, user: &UserDocument) -> Option<i64> {
        user.get_i64(self.options.field(SemanticField::LoginAttempts))
    }

    pub fn get_login_attempt_lock_time(&self, user: &UserDocument) -> Option<DateTime<Utc>> {
        self.timestamp(user, SemanticField::LoginAttemptLockTime)
    }

    pub fn get_last_login(&self, user: &UserDocument) -> Option<DateTime<Utc>> {
        self.timestamp(user, SemanticField::LastLogin)
    }

    pub fn get_last_logout(&self, user: &UserDocument) -> Option<DateTime<Utc>> {
        self.timestamp(user, SemanticField::LastLogout)
    }

    pub fn get_reset_password_expiration(&self, user: &UserDocument) -> Option<DateTime<Utc>> {
        self.timestamp(user, SemanticField::ResetPasswordExpiration)
    }

    pub fn get_signup_date(&self, user: &UserDocument) -> Option<DateTime<Utc>> {
        self.timestamp(user, SemanticField::SignupDate)
    }

    /// epoch 밀리초 숫자 또는 BSON 날짜 필드를 UTC 시각으로 변환합니다.
    fn timestamp(&self, user: &UserDocument, field: SemanticField) -> Option<DateTime<Utc>> {
        let raw = user.get(self.options.field(field))?;
        DateTime::from_timestamp_millis(as_i64(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::adapter_options::{OptionsResolver, ResolveOptions, UserOptions};
    use crate::repositories::users::InMemoryUserStore;
    use crate::services::schema::SchemaFieldPlanner;
    use mongodb::bson::doc;
    use serde_json::json;

    fn resolve(value: serde_json::Value) -> Arc<AdapterOptions> {
        let user: UserOptions = serde_json::from_value(value).unwrap();
        Arc::new(OptionsResolver::resolve(&user, ResolveOptions::default()).unwrap())
    }

    async fn adapter_with(value: serde_json::Value, schema: Schema) -> UserAdapter<InMemoryUserStore> {
        let options = resolve(value);
        let store = Arc::new(InMemoryUserStore::new(schema));
        let plan = SchemaFieldPlanner::register(store.as_ref(), options).await.unwrap();
        UserAdapter::new(store, plan)
    }

    async fn flat_adapter(value: serde_json::Value) -> UserAdapter<InMemoryUserStore> {
        adapter_with(value, Schema::new().with_field("bio", FieldSpec::string())).await
    }

    async fn profile_adapter() -> UserAdapter<InMemoryUserStore> {
        adapter_with(
            json!({ "useProfile": true, "externalIdFields": ["googleId"] }),
            Schema::new().with_field(
                "profile",
                FieldSpec::nested(
                    Schema::new()
                        .with_field("username", FieldSpec::string().trim(true))
                        .with_field("email", FieldSpec::string().trim(true).lowercase(true))
                        .with_field("bio", FieldSpec::string()),
                ),
            ),
        )
        .await
    }

    #[actix_web::test]
    async fn test_case_normalization_round_trip() {
        let adapter = flat_adapter(json!({ "usernameLowerCase": true })).await;

        let created = adapter.create(Some(&doc! { "username": "Alice" })).await.unwrap();
        let found = adapter.find_by_username("ALICE").await.unwrap().unwrap();

        assert_eq!(found.id(), created.id());
        assert_eq!(adapter.get_username(&found), Some("alice".to_string()));
    }

    #[actix_web::test]
    async fn test_create_applies_schema_defaults() {
        let adapter = flat_adapter(json!({})).await;

        let user = adapter.create(Some(&doc! { "username": "bob", "hash": "h", "salt": "s" })).await.unwrap();

        assert_eq!(adapter.get_login_attempts(&user), Some(0));
        assert!(adapter.get_signup_date(&user).is_some());
        assert_eq!(adapter.get_hash(&user), Some("h".to_string()));
        assert_eq!(adapter.get_salt(&user), Some("s".to_string()));
        assert!(adapter.get_id(&user).is_some());
    }

    #[actix_web::test]
    async fn test_empty_update_performs_no_write() {
        let adapter = flat_adapter(json!({})).await;
        let user = adapter.create(Some(&doc! { "username": "carol" })).await.unwrap();
        let writes = adapter.store().write_count();

        let unchanged = adapter.update(user.clone(), None).await.unwrap();
        let unchanged_again = adapter.update(user.clone(), Some(&doc! {})).await.unwrap();
        let only_unknown = adapter.update(user.clone(), Some(&doc! { "nickname": "c" })).await.unwrap();

        assert_eq!(unchanged, user);
        assert_eq!(unchanged_again, user);
        assert_eq!(only_unknown, user);
        assert_eq!(adapter.store().write_count(), writes);
    }

    #[actix_web::test]
    async fn test_update_writes_semantic_fields() {
        let adapter = flat_adapter(json!({ "loginAttemptsField": "failures" })).await;
        let user = adapter.create(Some(&doc! { "username": "dave" })).await.unwrap();

        let updated = adapter
            .update(user, Some(&doc! { "loginAttempts": 3, "lastLogin": 1_700_000_000_000_i64 }))
            .await
            .unwrap();

        assert_eq!(updated.get_i64("failures"), Some(3));
        assert_eq!(adapter.get_login_attempts(&updated), Some(3));
        assert_eq!(
            adapter.get_last_login(&updated).map(|at| at.timestamp_millis()),
            Some(1_700_000_000_000)
        );

        let reloaded = adapter.find_by_id(&updated.id_hex().unwrap()).await.unwrap().unwrap();
        assert_eq!(reloaded, updated);
    }

    #[actix_web::test]
    async fn test_profile_mode_routing_and_lookup() {
        let adapter = profile_adapter().await;

        let user = adapter
            .create(Some(&doc! {
                "username": "Erin",
                "email": "Erin@Example.com",
                "bio": "hello",
                "googleId": "g-1"
            }))
            .await
            .unwrap();

        let profile = user.as_document().get_document("profile").unwrap();
        assert_eq!(profile.get_str("username").unwrap(), "erin");
        assert_eq!(profile.get_str("email").unwrap(), "erin@example.com");
        assert!(!user.contains("username"));

        assert!(adapter.find_by_username("ERIN").await.unwrap().is_some());
        assert!(adapter.find_by_email("erin@EXAMPLE.com").await.unwrap().is_some());
        assert!(adapter.find_by_external_id("googleId", "g-1").await.unwrap().is_some());

        let updated = adapter.update_profile(user, Some(&doc! { "username": "frank" })).await.unwrap();
        let profile = updated.as_document().get_document("profile").unwrap();
        assert_eq!(profile.get_str("username").unwrap(), "frank");
        assert_eq!(profile.get_str("bio").unwrap(), "hello");
    }

    #[actix_web::test]
    async fn test_external_id_lookups() {
        let adapter = profile_adapter().await;
        adapter
            .create(Some(&doc! { "username": "gina", "email": "g@x.io", "googleId": "g-2" }))
            .await
            .unwrap();

        let found = adapter
            .find_by_external_ids(&doc! { "googleId": "g-2" })
            .await
            .unwrap();
        assert!(found.is_some());

        assert!(adapter.find_by_external_ids(&doc! {}).await.unwrap().is_none());
        assert!(matches!(
            adapter.find_by_external_id("facebookId", "f").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[actix_web::test]
    async fn test_find_by_reset_password_hash() {
        let adapter = flat_adapter(json!({})).await;
        adapter
            .create(Some(&doc! { "username": "hank", "resetPasswordHash": "r-1", "resetPasswordExpiration": 42 }))
            .await
            .unwrap();

        let found = adapter.find_by_reset_password_hash("r-1").await.unwrap().unwrap();

        assert_eq!(
            adapter.get_reset_password_expiration(&found).map(|at| at.timestamp_millis()),
            Some(42)
        );
        assert!(adapter.find_by_reset_password_hash("r-2").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_serialize_hides_excluded_fields() {
        let adapter = flat_adapter(json!({ "excludedFields": ["hash", "salt"] })).await;
        let user = adapter
            .create(Some(&doc! { "username": "ivy", "hash": "h", "salt": "s" }))
            .await
            .unwrap();

        let view = adapter.serialize(&user);

        assert_eq!(view.get("id"), Some(&json!(user.id_hex().unwrap())));
        assert_eq!(view.get("username"), Some(&json!("ivy")));
        assert!(!view.contains_key("hash"));
        assert!(!view.contains_key("salt"));
        assert_eq!(adapter.get_profile(&user), Value::Null);
    }

    #[actix_web::test]
    async fn test_unique_username_conflict_is_passed_through() {
        let adapter = flat_adapter(json!({})).await;
        adapter.create(Some(&doc! { "username": "jack" })).await.unwrap();

        let duplicate = adapter.create(Some(&doc! { "username": "JACK" })).await;

        assert!(matches!(duplicate, Err(AppError::ConflictError(_))));
    }

    #[actix_web::test]
    async fn test_invalid_id_is_rejected() {
        let adapter = flat_adapter(json!({})).await;

        assert!(matches!(adapter.find_by_id("nope").await, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_unregistered_plan_fails_on_first_use() {
        let options = resolve(json!({}));
        let store = Arc::new(InMemoryUserStore::new(Schema::new()));
        let adapter = UserAdapter::new(store, RegisteredPlan::unregistered(options));

        let result = adapter.create(Some(&doc! { "username": "kim" })).await;

        assert!(matches!(result, Err(AppError::PlanNotRegistered(_))));
        assert!(matches!(
            adapter.find_by_username("kim").await,
            Err(AppError::PlanNotRegistered(_))
        ));
        assert_eq!(adapter.store().write_count(), 0);
    }

    #[actix_web::test]
    async fn test_username_flags_off_keep_case_and_allow_duplicates() {
        let adapter = flat_adapter(json!({ "usernameLowerCase": false, "usernameUnique": false })).await;

        adapter.create(Some(&doc! { "username": " Alice " })).await.unwrap();
        let duplicate = adapter.create(Some(&doc! { "username": "Alice" })).await;

        assert!(duplicate.is_ok());
        let found = adapter.find_by_username("Alice").await.unwrap().unwrap();
        assert_eq!(adapter.get_username(&found), Some("Alice".to_string()));
        assert!(adapter.find_by_username("ALICE").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_username_stored_in_email_field() {
        let adapter = flat_adapter(json!({ "usernameField": "email" })).await;

        let created = adapter
            .create(Some(&doc! { "username": "Alice@Example.com " }))
            .await
            .unwrap();

        assert_eq!(created.get_str("email"), Some("alice@example.com"));
        assert!(created.get_str("username").is_none());
        let by_username = adapter.find_by_username("ALICE@example.com").await.unwrap().unwrap();
        let by_email = adapter.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_username.id(), created.id());
        assert_eq!(by_email.id(), created.id());
        assert_eq!(adapter.get_username(&created), adapter.get_email(&created));

        let duplicate = adapter.create(Some(&doc! { "email": "ALICE@example.com" })).await;
        assert!(matches!(duplicate, Err(AppError::ConflictError(_))));
    }

    #[actix_web::test]
    async fn test_poisoned_schema_lock_surfaces_store_error() {
        let adapter = flat_adapter(json!({})).await;

        adapter.store().poison_schema_lock();

        assert!(matches!(
            adapter.find_by_username("kim").await,
            Err(AppError::StoreError(_))
        ));
        assert!(matches!(
            adapter.create(Some(&doc! { "username": "kim" })).await,
            Err(AppError::StoreError(_))
        ));
    }

    #[actix_web::test]
    async fn test_connect_requires_uri() {
        let adapter = flat_adapter(json!({})).await;
        assert!(matches!(adapter.connect().await, Err(AppError::MissingConnectionUri)));

        let connected = flat_adapter(json!({ "mongoURI": "memory://local" })).await;
        connected.connect().await.unwrap();
        assert!(connected.store().is_connected());
    }
}
