//! # Adapter Options
//!
//! 호출자가 전달한 희소(sparse) 설정을 기본값 테이블 위에 병합하여
//! 완전하고 검증된 [`AdapterOptions`] 를 만듭니다.
//!
//! ## 의미 필드와 물리 필드
//!
//! 어댑터는 `username`, `loginAttempts` 같은 의미 이름으로 필드를 다루고,
//! 실제 저장 키는 `usernameField`, `loginAttemptsField` 설정으로 결정됩니다.
//! 의미 필드는 [`SemanticField`] 열거형으로 고정되어 있어 모든 매핑이
//! 옵션 해석 시점에 한 번에 검증됩니다.
//!
//! ## 기본값
//!
//! | 키 | 기본값 |
//! |----|--------|
//! | `usernameField`, `emailField`, ... | 의미 이름과 동일 (`"username"`, `"email"`, ...) |
//! | `profileField` | `"profile"` |
//! | `usernameUnique`, `usernameLowerCase`, `limitLoginAttempts` | `true` |
//! | `useProfile`, `strictChanges` | `false` |
//! | `includedFields`, `excludedFields`, `includedProfileFields`, `excludedProfileFields` | `[]` |
//! | `databaseName` / `collectionName` / `appName` | `"userbase"` / `"users"` / `"userbase_adapter"` |
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::adapter_options::{OptionsResolver, ResolveOptions, UserOptions};
//!
//! let user_options: UserOptions = serde_json::from_value(serde_json::json!({
//!     "mongoURI": "mongodb://localhost:27017",
//!     "usernameField": "login",
//!     "limitLoginAttempts": false
//! }))?;
//!
//! let options = OptionsResolver::resolve(&user_options, ResolveOptions::default())?;
//! assert_eq!(options.fields.username, "login");
//! ```

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::sync::Arc;

use mongodb::bson::Document;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::config::data_config::StoreConfig;
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::utils::string_utils::clean_optional_string;

/// 어댑터가 아는 의미 필드의 고정 목록
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticField {
    Username,
    Email,
    Hash,
    Salt,
    LastLogin,
    LastLogout,
    LoginAttempts,
    LoginAttemptLockTime,
    ResetPasswordHash,
    ResetPasswordExpiration,
    SignupDate,
    Profile,
}

impl SemanticField {
    pub const ALL: [SemanticField; 12] = [
        SemanticField::Username,
        SemanticField::Email,
        SemanticField::Hash,
        SemanticField::Salt,
        SemanticField::LastLogin,
        SemanticField::LastLogout,
        SemanticField::LoginAttempts,
        SemanticField::LoginAttemptLockTime,
        SemanticField::ResetPasswordHash,
        SemanticField::ResetPasswordExpiration,
        SemanticField::SignupDate,
        SemanticField::Profile,
    ];

    /// 변경 객체에서 사용하는 의미 키 (`"loginAttempts"`)
    pub fn key(self) -> &'static str {
        match self {
            SemanticField::Username => "username",
            SemanticField::Email => "email",
            SemanticField::Hash => "hash",
            SemanticField::Salt => "salt",
            SemanticField::LastLogin => "lastLogin",
            SemanticField::LastLogout => "lastLogout",
            SemanticField::LoginAttempts => "loginAttempts",
            SemanticField::LoginAttemptLockTime => "loginAttemptLockTime",
            SemanticField::ResetPasswordHash => "resetPasswordHash",
            SemanticField::ResetPasswordExpiration => "resetPasswordExpiration",
            SemanticField::SignupDate => "signupDate",
            SemanticField::Profile => "profile",
        }
    }

    /// 물리 이름을 지정하는 설정 키 (`"loginAttemptsField"`)
    pub fn option_key(self) -> &'static str {
        match self {
            SemanticField::Username => "usernameField",
            SemanticField::Email => "emailField",
            SemanticField::Hash => "hashField",
            SemanticField::Salt => "saltField",
            SemanticField::LastLogin => "lastLoginField",
            SemanticField::LastLogout => "lastLogoutField",
            SemanticField::LoginAttempts => "loginAttemptsField",
            SemanticField::LoginAttemptLockTime => "loginAttemptLockTimeField",
            SemanticField::ResetPasswordHash => "resetPasswordHashField",
            SemanticField::ResetPasswordExpiration => "resetPasswordExpirationField",
            SemanticField::SignupDate => "signupDateField",
            SemanticField::Profile => "profileField",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 의미 필드 → 물리 필드 이름 매핑 (해석 완료)
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_distinct_names"))]
pub struct FieldNames {
    #[validate(length(min = 1, message = "usernameField must not be empty"), custom(function = "validate_field_name"))]
    pub username: String,
    #[validate(length(min = 1, message = "emailField must not be empty"), custom(function = "validate_field_name"))]
    pub email: String,
    #[validate(length(min = 1, message = "hashField must not be empty"), custom(function = "validate_field_name"))]
    pub hash: String,
    #[validate(length(min = 1, message = "saltField must not be empty"), custom(function = "validate_field_name"))]
    pub salt: String,
    #[validate(length(min = 1, message = "lastLoginField must not be empty"), custom(function = "validate_field_name"))]
    pub last_login: String,
    #[validate(length(min = 1, message = "lastLogoutField must not be empty"), custom(function = "validate_field_name"))]
    pub last_logout: String,
    #[validate(length(min = 1, message = "loginAttemptsField must not be empty"), custom(function = "validate_field_name"))]
    pub login_attempts: String,
    #[validate(length(min = 1, message = "loginAttemptLockTimeField must not be empty"), custom(function = "validate_field_name"))]
    pub login_attempt_lock_time: String,
    #[validate(length(min = 1, message = "resetPasswordHashField must not be empty"), custom(function = "validate_field_name"))]
    pub reset_password_hash: String,
    #[validate(length(min = 1, message = "resetPasswordExpirationField must not be empty"), custom(function = "validate_field_name"))]
    pub reset_password_expiration: String,
    #[validate(length(min = 1, message = "signupDateField must not be empty"), custom(function = "validate_field_name"))]
    pub signup_date: String,
    #[validate(length(min = 1, message = "profileField must not be empty"), custom(function = "validate_field_name"))]
    pub profile: String,
}

impl FieldNames {
    /// 모든 의미 필드에 대해 `name_of` 를 호출하여 매핑을 만듭니다.
    pub fn build(mut name_of: impl FnMut(SemanticField) -> String) -> Self {
        Self {
            username: name_of(SemanticField::Username),
            email: name_of(SemanticField::Email),
            hash: name_of(SemanticField::Hash),
            salt: name_of(SemanticField::Salt),
            last_login: name_of(SemanticField::LastLogin),
            last_logout: name_of(SemanticField::LastLogout),
            login_attempts: name_of(SemanticField::LoginAttempts),
            login_attempt_lock_time: name_of(SemanticField::LoginAttemptLockTime),
            reset_password_hash: name_of(SemanticField::ResetPasswordHash),
            reset_password_expiration: name_of(SemanticField::ResetPasswordExpiration),
            signup_date: name_of(SemanticField::SignupDate),
            profile: name_of(SemanticField::Profile),
        }
    }

    pub fn get(&self, field: SemanticField) -> &str {
        match field {
            SemanticField::Username => &self.username,
            SemanticField::Email => &self.email,
            SemanticField::Hash => &self.hash,
            SemanticField::Salt => &self.salt,
            SemanticField::LastLogin => &self.last_login,
            SemanticField::LastLogout => &self.last_logout,
            SemanticField::LoginAttempts => &self.login_attempts,
            SemanticField::LoginAttemptLockTime => &self.login_attempt_lock_time,
            SemanticField::ResetPasswordHash => &self.reset_password_hash,
            SemanticField::ResetPasswordExpiration => &self.reset_password_expiration,
            SemanticField::SignupDate => &self.signup_date,
            SemanticField::Profile => &self.profile,
        }
    }

    /// `username` 과 `email` 이 같은 물리 필드에 저장되는지 여부
    pub fn shares_identity_field(&self) -> bool {
        self.username == self.email
    }

    /// 변경 키를 물리 필드 이름으로 해석합니다.
    ///
    /// 의미 키가 아니면 `None` 을 반환하며, 호출자는 키를 그대로 물리 이름으로 사용합니다.
    pub fn physical_for_key(&self, key: &str) -> Option<&str> {
        SemanticField::from_key(key).map(|field| self.get(field))
    }
}

/// 점(`.`)이나 `$` 로 시작하는 이름은 문서 경로 문법과 충돌하므로 거부합니다.
fn validate_field_name(name: &str) -> Result<(), ValidationError> {
    if name.contains('.') || name.starts_with('$') {
        return Err(ValidationError::new("invalid_field_name")
            .with_message(format!("'{}' is not a valid document field name", name).into()));
    }
    Ok(())
}

/// 두 의미 필드가 같은 물리 이름을 가리키면 라우팅이 모호해집니다.
///
/// `username` 과 `email` 만은 하나의 물리 필드를 공유할 수 있습니다
/// (이메일을 로그인 아이디로 쓰는 구성).
fn validate_distinct_names(names: &FieldNames) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for field in SemanticField::ALL {
        let name = names.get(field);
        if field == SemanticField::Email && names.shares_identity_field() {
            continue;
        }
        if !seen.insert(name) {
            return Err(ValidationError::new("duplicate_field_name")
                .with_message(format!("'{}' is mapped by more than one *Field option", name).into()));
        }
    }
    Ok(())
}

static DEFAULT_FIELD_NAMES: Lazy<FieldNames> =
    Lazy::new(|| FieldNames::build(|field| field.key().to_string()));

const DEFAULT_DATABASE_NAME: &str = "userbase";
const DEFAULT_COLLECTION_NAME: &str = "users";
const DEFAULT_APP_NAME: &str = "userbase_adapter";

/// 프로필 뷰 생성을 완전히 대체하는 사용자 정의 훅
///
/// 원본 사용자 문서 전체를 받아 프로필 뷰를 반환합니다.
/// 훅이 설정되면 프로필 포함/제외 목록은 적용되지 않습니다.
#[derive(Clone)]
pub struct ProfileProjection(Arc<dyn Fn(&Document) -> serde_json::Value + Send + Sync>);

impl ProfileProjection {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&Document) -> serde_json::Value + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn apply(&self, raw: &Document) -> serde_json::Value {
        (self.0)(raw)
    }
}

impl fmt::Debug for ProfileProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProfileProjection(..)")
    }
}

/// 불리언 플래그는 명시적인 `true`/`false` 만 그대로 받아들입니다.
///
/// 그 외 값(문자열, 숫자, null)은 `None` 이 되어 기본값으로 해석됩니다.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}

/// 호출자가 전달하는 희소 설정
///
/// 모든 항목이 선택 사항이며, 키 이름은 camelCase 입니다.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOptions {
    #[serde(rename = "mongoURI", alias = "mongoUri")]
    pub mongo_uri: Option<String>,
    pub database_name: Option<String>,
    pub collection_name: Option<String>,
    pub app_name: Option<String>,

    pub included_fields: Option<Vec<String>>,
    pub excluded_fields: Option<Vec<String>>,
    pub included_profile_fields: Option<Vec<String>>,
    pub excluded_profile_fields: Option<Vec<String>>,

    #[serde(deserialize_with = "lenient_flag")]
    pub username_unique: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub username_lower_case: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub limit_login_attempts: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub use_profile: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub strict_changes: Option<bool>,

    pub username_field: Option<String>,
    pub email_field: Option<String>,
    pub hash_field: Option<String>,
    pub salt_field: Option<String>,
    pub last_login_field: Option<String>,
    pub last_logout_field: Option<String>,
    pub login_attempts_field: Option<String>,
    pub login_attempt_lock_time_field: Option<String>,
    pub reset_password_hash_field: Option<String>,
    pub reset_password_expiration_field: Option<String>,
    pub signup_date_field: Option<String>,
    pub profile_field: Option<String>,

    /// 외부 인증 프로바이더 ID 필드 (예: `["googleId", "facebookId"]`)
    pub external_id_fields: Option<Vec<String>>,

    #[serde(skip)]
    pub profile_projection: Option<ProfileProjection>,
}

impl UserOptions {
    /// 의미 필드에 대해 호출자가 지정한 물리 이름
    pub fn field_name(&self, field: SemanticField) -> Option<&String> {
        match field {
            SemanticField::Username => self.username_field.as_ref(),
            SemanticField::Email => self.email_field.as_ref(),
            SemanticField::Hash => self.hash_field.as_ref(),
            SemanticField::Salt => self.salt_field.as_ref(),
            SemanticField::LastLogin => self.last_login_field.as_ref(),
            SemanticField::LastLogout => self.last_logout_field.as_ref(),
            SemanticField::LoginAttempts => self.login_attempts_field.as_ref(),
            SemanticField::LoginAttemptLockTime => self.login_attempt_lock_time_field.as_ref(),
            SemanticField::ResetPasswordHash => self.reset_password_hash_field.as_ref(),
            SemanticField::ResetPasswordExpiration => self.reset_password_expiration_field.as_ref(),
            SemanticField::SignupDate => self.signup_date_field.as_ref(),
            SemanticField::Profile => self.profile_field.as_ref(),
        }
    }

    pub fn with_profile_projection<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Document) -> serde_json::Value + Send + Sync + 'static,
    {
        self.profile_projection = Some(ProfileProjection::new(hook));
        self
    }

    /// 환경 변수에서 설정을 읽어옵니다.
    ///
    /// ## 환경 변수
    ///
    /// - `USERBASE_OPTIONS`: JSON 문자열 (우선)
    /// - `USERBASE_OPTIONS_FILE`: JSON 파일 경로
    /// - `MONGODB_URI`, `DATABASE_NAME`, `USER_COLLECTION`: JSON 에 값이 없을 때 사용
    pub fn from_env() -> AppResult<Self> {
        let mut options = if let Ok(raw) = env::var("USERBASE_OPTIONS") {
            Self::from_json(&raw)?
        } else if let Ok(path) = env::var("USERBASE_OPTIONS_FILE") {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read options file {}", path))?;
            Self::from_json(&raw)?
        } else {
            Self::default()
        };

        let store = StoreConfig::from_env();
        if options.mongo_uri.is_none() {
            options.mongo_uri = store.mongo_uri;
        }
        if options.database_name.is_none() {
            options.database_name = store.database_name;
        }
        if options.collection_name.is_none() {
            options.collection_name = store.collection_name;
        }

        Ok(options)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::ValidationError(format!("Invalid adapter options: {}", e)))
    }
}

/// 저장소 연결 설정 (해석 완료)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub mongo_uri: Option<String>,
    pub database_name: String,
    pub collection_name: String,
    pub app_name: String,
}

/// 해석 및 검증이 끝난 어댑터 설정
///
/// 한 번 만들어지면 변경되지 않으며 `Arc` 로 공유됩니다.
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub connection: ConnectOptions,
    pub fields: FieldNames,

    pub username_unique: bool,
    pub username_lower_case: bool,
    pub limit_login_attempts: bool,
    pub use_profile: bool,
    pub strict_changes: bool,

    pub included_fields: Vec<String>,
    pub excluded_fields: Vec<String>,
    pub included_profile_fields: Vec<String>,
    pub excluded_profile_fields: Vec<String>,

    pub external_id_fields: Vec<String>,
    pub profile_projection: Option<ProfileProjection>,
}

impl AdapterOptions {
    pub fn field(&self, field: SemanticField) -> &str {
        self.fields.get(field)
    }

    /// 프로필 모드일 때 프로필 컨테이너 이름
    pub fn profile_container(&self) -> Option<&str> {
        self.use_profile.then(|| self.fields.profile.as_str())
    }

    /// 사용자명 / 이메일 / 외부 ID 처럼 프로필 모드에서 프로필 안에 위치하는 필드인지 확인합니다.
    pub fn is_identity_field(&self, physical: &str) -> bool {
        physical == self.fields.username
            || physical == self.fields.email
            || self.external_id_fields.iter().any(|f| f == physical)
    }

    /// 필드의 문서 내 경로 (프로필 모드면 `profile.username` 형태)
    pub fn path_of(&self, physical: &str) -> String {
        match self.profile_container() {
            Some(container) if self.is_identity_field(physical) => format!("{}.{}", container, physical),
            _ => physical.to_string(),
        }
    }
}

/// 옵션 해석 동작 설정
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// `true` 면 연결 URI 가 없을 때 `MissingConnectionUri` 로 실패합니다.
    pub enforce_connection_uri: bool,
}

impl ResolveOptions {
    pub fn enforcing_connection_uri() -> Self {
        Self { enforce_connection_uri: true }
    }
}

/// 희소 설정 → 완전한 설정 변환기
pub struct OptionsResolver;

impl OptionsResolver {
    /// 호출자 설정을 기본값 위에 병합하고 검증합니다.
    ///
    /// 병합은 최상위 키 단위의 얕은 병합입니다. 목록 설정은 호출자 값이
    /// 기본 목록을 통째로 대체합니다.
    ///
    /// # 에러
    ///
    /// * `MissingConnectionUri` - `enforce_connection_uri` 인데 URI 가 없음
    /// * `ValidationError` - 잘못된 필드 이름, 중복 매핑
    ///
    /// 비어 있거나 공백뿐인 `*Field` 값은 설정되지 않은 것으로 보고 기본 이름을 씁니다.
    pub fn resolve(user_options: &UserOptions, resolve_options: ResolveOptions) -> AppResult<AdapterOptions> {
        let mongo_uri = user_options
            .mongo_uri
            .as_ref()
            .map(|uri| uri.trim().to_string())
            .filter(|uri| !uri.is_empty());

        if resolve_options.enforce_connection_uri && mongo_uri.is_none() {
            return Err(AppError::MissingConnectionUri);
        }

        let fields = FieldNames::build(|field| {
            clean_optional_string(user_options.field_name(field).cloned())
                .unwrap_or_else(|| DEFAULT_FIELD_NAMES.get(field).to_string())
        });

        fields
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let external_id_fields = user_options.external_id_fields.clone().unwrap_or_default();
        Self::validate_external_id_fields(&fields, &external_id_fields)?;

        Ok(AdapterOptions {
            connection: ConnectOptions {
                mongo_uri,
                database_name: pick(&user_options.database_name, DEFAULT_DATABASE_NAME),
                collection_name: pick(&user_options.collection_name, DEFAULT_COLLECTION_NAME),
                app_name: pick(&user_options.app_name, DEFAULT_APP_NAME),
            },
            fields,
            username_unique: user_options.username_unique.unwrap_or(true),
            username_lower_case: user_options.username_lower_case.unwrap_or(true),
            limit_login_attempts: user_options.limit_login_attempts.unwrap_or(true),
            use_profile: user_options.use_profile.unwrap_or(false),
            strict_changes: user_options.strict_changes.unwrap_or(false),
            included_fields: user_options.included_fields.clone().unwrap_or_default(),
            excluded_fields: user_options.excluded_fields.clone().unwrap_or_default(),
            included_profile_fields: user_options.included_profile_fields.clone().unwrap_or_default(),
            excluded_profile_fields: user_options.excluded_profile_fields.clone().unwrap_or_default(),
            external_id_fields,
            profile_projection: user_options.profile_projection.clone(),
        })
    }

    fn validate_external_id_fields(fields: &FieldNames, external: &[String]) -> AppResult<()> {
        let mut seen = HashSet::new();
        for name in external {
            validate_field_name(name)
                .map_err(|e| AppError::ValidationError(format!("externalIdFields: {}", e)))?;
            if name.is_empty() {
                return Err(AppError::ValidationError(
                    "externalIdFields must not contain empty names".to_string(),
                ));
            }
            let clashes = SemanticField::ALL.into_iter().any(|field| fields.get(field) == name);
            if clashes || !seen.insert(name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "externalIdFields: '{}' is already mapped",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn pick(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options_from(value: serde_json::Value) -> UserOptions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_are_semantic_names() {
        let options = OptionsResolver::resolve(&UserOptions::default(), ResolveOptions::default()).unwrap();

        for field in SemanticField::ALL {
            assert_eq!(options.field(field), field.key());
        }
        assert!(options.username_unique);
        assert!(options.username_lower_case);
        assert!(options.limit_login_attempts);
        assert!(!options.use_profile);
        assert!(!options.strict_changes);
        assert!(options.included_fields.is_empty());
        assert_eq!(options.connection.database_name, "userbase");
        assert_eq!(options.connection.collection_name, "users");
    }

    #[test]
    fn test_caller_values_win() {
        let user = options_from(json!({
            "usernameField": "login",
            "loginAttemptsField": "failures",
            "excludedFields": ["hash", "salt"],
            "collectionName": "accounts"
        }));

        let options = OptionsResolver::resolve(&user, ResolveOptions::default()).unwrap();

        assert_eq!(options.fields.username, "login");
        assert_eq!(options.fields.login_attempts, "failures");
        assert_eq!(options.fields.hash, "hash");
        assert_eq!(options.excluded_fields, vec!["hash".to_string(), "salt".to_string()]);
        assert_eq!(options.connection.collection_name, "accounts");
    }

    #[test]
    fn test_missing_uri_only_fails_when_enforced() {
        let user = UserOptions::default();

        assert!(OptionsResolver::resolve(&user, ResolveOptions::default()).is_ok());
        assert!(matches!(
            OptionsResolver::resolve(&user, ResolveOptions::enforcing_connection_uri()),
            Err(AppError::MissingConnectionUri)
        ));

        let blank = options_from(json!({ "mongoURI": "   " }));
        assert!(matches!(
            OptionsResolver::resolve(&blank, ResolveOptions::enforcing_connection_uri()),
            Err(AppError::MissingConnectionUri)
        ));
    }

    #[test]
    fn test_flags_are_false_only_when_explicitly_false() {
        let explicit = options_from(json!({
            "usernameLowerCase": false,
            "usernameUnique": false,
            "limitLoginAttempts": false
        }));
        let options = OptionsResolver::resolve(&explicit, ResolveOptions::default()).unwrap();
        assert!(!options.username_lower_case);
        assert!(!options.username_unique);
        assert!(!options.limit_login_attempts);

        let noisy = options_from(json!({
            "usernameLowerCase": "no",
            "usernameUnique": 0,
            "limitLoginAttempts": null,
            "useProfile": "yes"
        }));
        let options = OptionsResolver::resolve(&noisy, ResolveOptions::default()).unwrap();
        assert!(options.username_lower_case);
        assert!(options.username_unique);
        assert!(options.limit_login_attempts);
        assert!(!options.use_profile);
    }

    #[test]
    fn test_blank_field_name_falls_back_to_default() {
        let empty = options_from(json!({ "hashField": "" }));
        let blank = options_from(json!({ "saltField": "   ", "profileField": "" }));
        let padded = options_from(json!({ "emailField": "  mail  " }));

        let empty = OptionsResolver::resolve(&empty, ResolveOptions::default()).unwrap();
        let blank = OptionsResolver::resolve(&blank, ResolveOptions::default()).unwrap();
        let padded = OptionsResolver::resolve(&padded, ResolveOptions::default()).unwrap();

        assert_eq!(empty.fields.hash, "hash");
        assert_eq!(blank.fields.salt, "salt");
        assert_eq!(blank.fields.profile, "profile");
        assert_eq!(padded.fields.email, "mail");
    }

    #[test]
    fn test_username_may_share_email_field() {
        let user = options_from(json!({ "usernameField": "email" }));

        let options = OptionsResolver::resolve(&user, ResolveOptions::default()).unwrap();

        assert_eq!(options.fields.username, "email");
        assert_eq!(options.fields.email, "email");
        assert!(options.fields.shares_identity_field());
        assert_eq!(options.fields.physical_for_key("username"), Some("email"));
    }

    #[test]
    fn test_identity_sharing_does_not_allow_other_collisions() {
        let user = options_from(json!({ "usernameField": "email", "hashField": "email" }));
        assert!(matches!(
            OptionsResolver::resolve(&user, ResolveOptions::default()),
            Err(AppError::ValidationError(_))
        ));

        let external = options_from(json!({ "usernameField": "email", "externalIdFields": ["email"] }));
        assert!(OptionsResolver::resolve(&external, ResolveOptions::default()).is_err());
    }

    #[test]
    fn test_dotted_field_name_is_rejected() {
        let user = options_from(json!({ "saltField": "secret.salt" }));

        assert!(matches!(
            OptionsResolver::resolve(&user, ResolveOptions::default()),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_duplicate_physical_names_are_rejected() {
        let user = options_from(json!({ "hashField": "secret", "saltField": "secret" }));

        assert!(matches!(
            OptionsResolver::resolve(&user, ResolveOptions::default()),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_external_id_fields_must_not_clash() {
        let ok = options_from(json!({ "externalIdFields": ["googleId", "facebookId"] }));
        let options = OptionsResolver::resolve(&ok, ResolveOptions::default()).unwrap();
        assert_eq!(options.external_id_fields.len(), 2);

        let clash = options_from(json!({ "externalIdFields": ["email"] }));
        assert!(OptionsResolver::resolve(&clash, ResolveOptions::default()).is_err());

        let repeated = options_from(json!({ "externalIdFields": ["googleId", "googleId"] }));
        assert!(OptionsResolver::resolve(&repeated, ResolveOptions::default()).is_err());
    }

    #[test]
    fn test_semantic_key_lookup() {
        let options = OptionsResolver::resolve(
            &options_from(json!({ "loginAttemptsField": "attempts" })),
            ResolveOptions::default(),
        )
        .unwrap();

        assert_eq!(options.fields.physical_for_key("loginAttempts"), Some("attempts"));
        assert_eq!(options.fields.physical_for_key("nickname"), None);
        assert_eq!(SemanticField::from_key("signupDate"), Some(SemanticField::SignupDate));
        assert_eq!(SemanticField::LoginAttemptLockTime.option_key(), "loginAttemptLockTimeField");
    }

    #[test]
    fn test_identity_paths_in_profile_mode() {
        let user = options_from(json!({
            "useProfile": true,
            "profileField": "account",
            "externalIdFields": ["googleId"]
        }));
        let options = OptionsResolver::resolve(&user, ResolveOptions::default()).unwrap();

        assert_eq!(options.profile_container(), Some("account"));
        assert_eq!(options.path_of("username"), "account.username");
        assert_eq!(options.path_of("googleId"), "account.googleId");
        assert_eq!(options.path_of("hash"), "hash");
    }

    #[test]
    fn test_profile_projection_is_carried() {
        let user = UserOptions::default().with_profile_projection(|_| json!({ "custom": true }));

        let options = OptionsResolver::resolve(&user, ResolveOptions::default()).unwrap();

        let hook = options.profile_projection.expect("hook");
        assert_eq!(hook.apply(&Document::new()), json!({ "custom": true }));
    }
}
