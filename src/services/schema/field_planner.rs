//! # Schema Field Planner
//!
//! 해석된 어댑터 설정으로부터 라이브 스키마에 추가해야 할 필드 목록을 유도합니다.
//!
//! ## 계획 규칙
//!
//! | 조건 | 추가되는 필드 |
//! |------|---------------|
//! | 항상 | `hash`, `salt` (String), `lastLogin`, `lastLogout` (Number) |
//! | 항상 | `resetPasswordHash` (String), `resetPasswordExpiration` (Number), `signupDate` (Number, 생성 시각) |
//! | `limitLoginAttempts` | `loginAttempts` (Number, 기본값 0), `loginAttemptLockTime` (Number) |
//! | 일반 모드 | `username` (trim, unique/lowercase 는 설정값), `email` (trim, lowercase), 외부 ID 필드 |
//! | 프로필 모드 | 프로필 컨테이너 안의 `username`, `email`, 외부 ID 필드 |
//!
//! 모든 필드는 스키마에 아직 선언되지 않은 경우에만 계획에 포함되므로,
//! 이미 확장된 스키마에 다시 계획을 세워도 필드가 중복되지 않습니다.
//!
//! ## 프로필 모드 검증
//!
//! 프로필 컨테이너는 호스트 스키마가 하위 문서로 선언해야 합니다.
//!
//! - 컨테이너가 없거나 하위 문서가 아님 → `MissingUserProfile`
//! - 컨테이너가 비어 있음 → 사용자명 / 이메일을 컨테이너 안에 호스팅
//! - 사용자명과 이메일이 모두 없음 → `MissingUserProfile`
//! - 사용자명만 없음 → `MissingUsernameInProfile`
//! - 이메일만 없음 → `MissingEmailInProfile`
//!
//! ## 등록
//!
//! [`SchemaFieldPlanner::register`] 는 계획을 저장소 스키마에 적용하고
//! [`RegisteredPlan`] 을 반환합니다. 어댑터는 이 값 없이는 생성할 수 없습니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use mongodb::bson::Bson;

use crate::config::adapter_options::{AdapterOptions, SemanticField};
use crate::core::errors::{AppError, AppResult};
use crate::domain::schema::{
    FieldDefault, FieldSpec, ProfileDescriptor, Schema, SchemaFieldDescriptor,
};
use crate::repositories::users::UserStore;

/// 필드 계획 수립기
pub struct SchemaFieldPlanner;

impl SchemaFieldPlanner {
    /// 기존 스키마에 대한 필드 계획을 세웁니다.
    ///
    /// # 인자
    ///
    /// * `existing` - 호스트 애플리케이션이 선언한 스키마
    /// * `options` - 해석된 어댑터 설정
    ///
    /// # 반환값
    ///
    /// 스키마에 아직 없는 필드만 담은 [`SchemaFieldDescriptor`]
    ///
    /// # 에러
    ///
    /// * `MissingSchema` - `existing` 이 `None`
    /// * `MissingUserProfile` / `MissingUsernameInProfile` / `MissingEmailInProfile` - 프로필 모드 검증 실패
    pub fn plan(existing: Option<&Schema>, options: &AdapterOptions) -> AppResult<SchemaFieldDescriptor> {
        let schema = existing.ok_or(AppError::MissingSchema)?;
        let mut descriptor = SchemaFieldDescriptor::default();

        if options.use_profile {
            descriptor.profile = Self::plan_profile(schema, options)?;
        } else {
            Self::plan_flat_identity(schema, options, &mut descriptor.fields);
        }

        let fields = &mut descriptor.fields;
        let mut add = |field: SemanticField, spec: FieldSpec| {
            let name = options.field(field);
            if !schema.declares(name) {
                fields.insert(name.to_string(), spec);
            }
        };

        add(SemanticField::Hash, FieldSpec::string());
        add(SemanticField::Salt, FieldSpec::string());
        add(SemanticField::LastLogin, FieldSpec::number());
        add(SemanticField::LastLogout, FieldSpec::number());
        add(SemanticField::ResetPasswordHash, FieldSpec::string());
        add(SemanticField::ResetPasswordExpiration, FieldSpec::number());
        add(SemanticField::SignupDate, FieldSpec::number().with_default(FieldDefault::Now));

        if options.limit_login_attempts {
            add(
                SemanticField::LoginAttempts,
                FieldSpec::number().with_default(FieldDefault::Value(Bson::Int32(0))),
            );
            add(SemanticField::LoginAttemptLockTime, FieldSpec::number());
        }

        debug!("필드 계획 수립: {} 필드", descriptor.field_count());
        Ok(descriptor)
    }

    /// 계획을 세워 저장소 스키마에 적용하고 등록 증명을 반환합니다.
    ///
    /// 같은 저장소에 여러 번 호출해도 스키마가 중복 확장되지 않습니다.
    pub async fn register<S>(store: &S, options: Arc<AdapterOptions>) -> AppResult<RegisteredPlan>
    where
        S: UserStore + ?Sized,
    {
        let existing = store.schema()?;
        let descriptor = Self::plan(Some(&existing), &options)?;
        let added = store.extend_schema(&descriptor).await?;

        info!("✅ 사용자 필드 계획 등록 완료 ({} 필드 추가)", added);

        Ok(RegisteredPlan {
            required_paths: Self::required_paths(&options),
            descriptor,
            options,
        })
    }

    /// 어댑터가 동작하는 데 필요한 모든 스키마 경로
    pub fn required_paths(options: &AdapterOptions) -> Vec<String> {
        let mut paths: Vec<String> = [
            SemanticField::Username,
            SemanticField::Email,
            SemanticField::Hash,
            SemanticField::Salt,
            SemanticField::LastLogin,
            SemanticField::LastLogout,
            SemanticField::ResetPasswordHash,
            SemanticField::ResetPasswordExpiration,
            SemanticField::SignupDate,
        ]
        .into_iter()
        .map(|field| options.path_of(options.field(field)))
        .collect();

        if options.limit_login_attempts {
            paths.push(options.path_of(options.field(SemanticField::LoginAttempts)));
            paths.push(options.path_of(options.field(SemanticField::LoginAttemptLockTime)));
        }

        paths.extend(options.external_id_fields.iter().map(|field| options.path_of(field)));
        paths
    }

    fn plan_flat_identity(schema: &Schema, options: &AdapterOptions, fields: &mut BTreeMap<String, FieldSpec>) {
        let username = &options.fields.username;
        if !schema.declares(username) {
            fields.insert(username.clone(), Self::username_spec(options));
        }

        let email = &options.fields.email;
        if !options.fields.shares_identity_field() && !schema.declares(email) {
            fields.insert(email.clone(), Self::email_spec());
        }

        for external in &options.external_id_fields {
            if !schema.declares(external) {
                fields.insert(external.clone(), FieldSpec::string().trim(true));
            }
        }
    }

    fn plan_profile(schema: &Schema, options: &AdapterOptions) -> AppResult<Option<ProfileDescriptor>> {
        let container = &options.fields.profile;
        let profile = schema
            .nested(container)
            .ok_or_else(|| AppError::MissingUserProfile(container.clone()))?;

        let username = &options.fields.username;
        let email = &options.fields.email;
        let mut fields = BTreeMap::new();

        if profile.is_empty() {
            fields.insert(username.clone(), Self::username_spec(options));
            if !options.fields.shares_identity_field() {
                fields.insert(email.clone(), Self::email_spec());
            }
        } else {
            match (profile.declares(username), profile.declares(email)) {
                (true, true) => {}
                (false, false) => return Err(AppError::MissingUserProfile(container.clone())),
                (false, true) => {
                    return Err(AppError::MissingUsernameInProfile {
                        profile: container.clone(),
                        field: username.clone(),
                    });
                }
                (true, false) => {
                    return Err(AppError::MissingEmailInProfile {
                        profile: container.clone(),
                        field: email.clone(),
                    });
                }
            }
        }

        for external in &options.external_id_fields {
            if !profile.declares(external) {
                fields.insert(external.clone(), FieldSpec::string().trim(true));
            }
        }

        Ok(Some(ProfileDescriptor {
            container: container.clone(),
            fields,
        }))
    }

    fn username_spec(options: &AdapterOptions) -> FieldSpec {
        FieldSpec::string()
            .trim(true)
            .unique(options.username_unique)
            .lowercase(options.username_lower_case)
    }

    fn email_spec() -> FieldSpec {
        FieldSpec::string().trim(true).lowercase(true)
    }
}

/// 필드 계획이 라이브 스키마에 등록되었다는 증명
///
/// [`SchemaFieldPlanner::register`] 만 생성할 수 있으며, 어댑터 생성자에 전달됩니다.
#[derive(Debug, Clone)]
pub struct RegisteredPlan {
    descriptor: SchemaFieldDescriptor,
    required_paths: Vec<String>,
    options: Arc<AdapterOptions>,
}

impl RegisteredPlan {
    pub fn descriptor(&self) -> &SchemaFieldDescriptor {
        &self.descriptor
    }

    pub fn options(&self) -> &Arc<AdapterOptions> {
        &self.options
    }

    /// 라이브 스키마가 반드시 선언해야 하는 경로
    pub fn required_paths(&self) -> &[String] {
        &self.required_paths
    }

    /// 계획을 저장소에 적용하지 않은 증명을 만듭니다.
    ///
    /// 등록 단계를 건너뛴 배선을 재현하는 테스트에서만 사용합니다.
    #[cfg(test)]
    pub(crate) fn unregistered(options: Arc<AdapterOptions>) -> Self {
        Self {
            required_paths: SchemaFieldPlanner::required_paths(&options),
            descriptor: SchemaFieldDescriptor::default(),
            options,
        }
    }
}
