//! # Change Router
//!
//! 의미 키로 작성된 변경 객체를 물리 필드 할당으로 바꾸고,
//! 최상위 필드와 프로필 필드로 나눈 [`Patch`] 를 만듭니다.
//!
//! ## 라우팅 규칙
//!
//! 1. 키가 의미 필드(`loginAttempts` 등)면 설정된 물리 이름으로, 아니면 키 그대로 사용합니다.
//! 2. 물리 이름이 최상위 스키마에 선언되어 있으면 `top_level` 로 보냅니다.
//! 3. 아니면서 프로필 하위 스키마에 선언되어 있으면 `profile` 로 보냅니다 (접두사 없는 키).
//! 4. 어디에도 없으면 버립니다. `strictChanges` 가 켜져 있으면 `UnknownChangeField` 로 거부합니다.
//!
//! 프로필 컨테이너 자체에 하위 문서를 넘기면 내부 키 단위로 펼쳐서
//! `profile` 쪽에 넣습니다. 컨테이너를 통째로 교체하지 않기 위함입니다.
//!
//! 모든 값은 선언된 [`FieldSpec`] 으로 캐스팅되므로 저장 시점과 조회 시점의
//! 정규화(trim, lowercase)가 같습니다.

use log::debug;
use mongodb::bson::{Bson, Document};

use crate::config::adapter_options::AdapterOptions;
use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::users::Patch;
use crate::domain::schema::{FieldSpec, Schema};

/// 변경 객체 라우터
pub struct ChangeRouter;

impl ChangeRouter {
    /// 변경 객체를 패치로 변환합니다.
    ///
    /// `None` 이나 빈 문서는 빈 패치가 됩니다.
    ///
    /// # 에러
    ///
    /// * `UnknownChangeField` - strict 모드에서 선언되지 않은 키
    /// * `ValidationError` - 선언 타입으로 변환할 수 없는 값
    pub fn route(changes: Option<&Document>, schema: &Schema, options: &AdapterOptions) -> AppResult<Patch> {
        let mut patch = Patch::new();
        let Some(changes) = changes else {
            return Ok(patch);
        };

        let container = options.fields.profile.as_str();
        let profile_schema = schema.nested(container);

        for (key, value) in changes {
            let physical = options.fields.physical_for_key(key).unwrap_or(key.as_str());

            if physical == container {
                if let (Some(inner), Bson::Document(values)) = (profile_schema, value) {
                    Self::route_profile_values(&mut patch, inner, container, values, options)?;
                    continue;
                }
            }

            if let Some(spec) = Self::top_level_spec(schema, physical) {
                let normalized = Self::normalize_value(options, physical, spec, physical, value.clone())?;
                patch.top_level.insert(physical.to_string(), normalized);
            } else if let Some(spec) = profile_schema.and_then(|inner| Self::top_level_spec(inner, physical)) {
                let path = format!("{}.{}", container, physical);
                let normalized = Self::normalize_value(options, physical, spec, &path, value.clone())?;
                patch.profile.insert(physical.to_string(), normalized);
            } else {
                Self::reject_or_drop(key, options)?;
            }
        }

        Ok(patch)
    }

    fn route_profile_values(
        patch: &mut Patch,
        profile_schema: &Schema,
        container: &str,
        values: &Document,
        options: &AdapterOptions,
    ) -> AppResult<()> {
        for (key, value) in values {
            let physical = options.fields.physical_for_key(key).unwrap_or(key.as_str());
            match Self::top_level_spec(profile_schema, physical) {
                Some(spec) => {
                    let path = format!("{}.{}", container, physical);
                    let normalized = Self::normalize_value(options, physical, spec, &path, value.clone())?;
                    patch.profile.insert(physical.to_string(), normalized);
                }
                None => Self::reject_or_drop(&format!("{}.{}", container, key), options)?,
            }
        }
        Ok(())
    }

    /// 점 경로가 아닌, 해당 스키마 단계에 직접 선언된 필드만 찾습니다.
    fn top_level_spec<'a>(schema: &'a Schema, physical: &str) -> Option<&'a FieldSpec> {
        if physical.contains('.') {
            return None;
        }
        schema.path(physical)
    }

    fn reject_or_drop(key: &str, options: &AdapterOptions) -> AppResult<()> {
        if options.strict_changes {
            return Err(AppError::UnknownChangeField(key.to_string()));
        }
        debug!("선언되지 않은 변경 키 무시: {}", key);
        Ok(())
    }

    /// 값을 필드 선언으로 캐스팅하고, 사용자명이면 설정에 따라 소문자로 바꿉니다.
    ///
    /// 쓰기 경로와 사용자명 / 이메일 조회 경로가 함께 사용합니다.
    pub fn normalize_value(
        options: &AdapterOptions,
        physical: &str,
        spec: &FieldSpec,
        path: &str,
        value: Bson,
    ) -> AppResult<Bson> {
        let casted = spec.cast(path, value)?;

        if options.username_lower_case && physical == options.fields.username {
            if let Bson::String(s) = &casted {
                return Ok(Bson::String(s.to_lowercase()));
            }
        }

        Ok(casted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::adapter_options::{OptionsResolver, ResolveOptions, UserOptions};
    use crate::domain::schema::FieldDefault;
    use mongodb::bson::doc;
    use serde_json::json;

    fn resolve(value: serde_json::Value) -> AdapterOptions {
        let user: UserOptions = serde_json::from_value(value).unwrap();
        OptionsResolver::resolve(&user, ResolveOptions::default()).unwrap()
    }

    fn flat_schema() -> Schema {
        Schema::new()
            .with_field("username", FieldSpec::string().trim(true).lowercase(true).unique(true))
            .with_field("attempts", FieldSpec::number().with_default(FieldDefault::Value(Bson::Int32(0))))
            .with_field("hash", FieldSpec::string())
            .with_field("bio", FieldSpec::string())
    }

    fn profile_schema() -> Schema {
        Schema::new()
            .with_field("loginAttempts", FieldSpec::number())
            .with_field("hash", FieldSpec::string())
            .with_field(
                "profile",
                FieldSpec::nested(
                    Schema::new()
                        .with_field("username", FieldSpec::string().trim(true).lowercase(true))
                        .with_field("email", FieldSpec::string().lowercase(true))
                        .with_field("bio", FieldSpec::string()),
                ),
            )
    }

    #[test]
    fn test_absent_and_empty_changes_give_empty_patch() {
        let options = resolve(json!({}));

        let from_none = ChangeRouter::route(None, &flat_schema(), &options).unwrap();
        let from_empty = ChangeRouter::route(Some(&doc! {}), &flat_schema(), &options).unwrap();

        assert!(from_none.is_empty());
        assert!(from_empty.is_empty());
    }

    #[test]
    fn test_semantic_keys_use_physical_names() {
        let options = resolve(json!({ "loginAttemptsField": "attempts" }));

        let patch = ChangeRouter::route(Some(&doc! { "loginAttempts": 3 }), &flat_schema(), &options).unwrap();

        assert_eq!(patch.top_level, doc! { "attempts": 3 });
        assert!(patch.profile.is_empty());
    }

    #[test]
    fn test_login_attempts_stay_top_level_in_profile_mode() {
        let options = resolve(json!({ "useProfile": true }));

        let patch = ChangeRouter::route(Some(&doc! { "loginAttempts": 3 }), &profile_schema(), &options).unwrap();

        assert_eq!(patch.top_level.get("loginAttempts"), Some(&Bson::Int32(3)));
        assert!(patch.profile.is_empty());
    }

    #[test]
    fn test_username_routes_into_profile() {
        let options = resolve(json!({ "useProfile": true }));

        let patch = ChangeRouter::route(Some(&doc! { "username": "bob" }), &profile_schema(), &options).unwrap();

        assert_eq!(patch.profile, doc! { "username": "bob" });
        assert!(patch.top_level.is_empty());
    }

    #[test]
    fn test_username_is_normalized() {
        let options = resolve(json!({}));

        let patch = ChangeRouter::route(Some(&doc! { "username": "  Alice " }), &flat_schema(), &options).unwrap();

        assert_eq!(patch.top_level, doc! { "username": "alice" });
    }

    #[test]
    fn test_username_lowercased_even_without_schema_flag() {
        let options = resolve(json!({}));
        let schema = Schema::new().with_field("username", FieldSpec::string());

        let patch = ChangeRouter::route(Some(&doc! { "username": "ALICE" }), &schema, &options).unwrap();

        assert_eq!(patch.top_level, doc! { "username": "alice" });
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let options = resolve(json!({}));

        let patch = ChangeRouter::route(Some(&doc! { "nickname": "x", "bio": "hi" }), &flat_schema(), &options).unwrap();

        assert_eq!(patch.top_level, doc! { "bio": "hi" });
    }

    #[test]
    fn test_unknown_keys_are_rejected_in_strict_mode() {
        let options = resolve(json!({ "strictChanges": true }));

        let result = ChangeRouter::route(Some(&doc! { "nickname": "x" }), &flat_schema(), &options);

        assert!(matches!(result, Err(AppError::UnknownChangeField(key)) if key == "nickname"));
    }

    #[test]
    fn test_profile_container_values_are_spread() {
        let options = resolve(json!({ "useProfile": true }));

        let patch = ChangeRouter::route(
            Some(&doc! { "profile": { "bio": "hello", "email": "B@X.IO" } }),
            &profile_schema(),
            &options,
        )
        .unwrap();

        assert!(patch.top_level.is_empty());
        assert_eq!(patch.profile, doc! { "bio": "hello", "email": "b@x.io" });
    }

    #[test]
    fn test_uncastable_value_is_rejected() {
        let options = resolve(json!({ "loginAttemptsField": "attempts" }));

        let result = ChangeRouter::route(Some(&doc! { "loginAttempts": "many" }), &flat_schema(), &options);

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_dotted_keys_are_not_top_level() {
        let options = resolve(json!({}));

        let patch = ChangeRouter::route(Some(&doc! { "profile.bio": "x" }), &profile_schema(), &options).unwrap();

        assert!(patch.is_empty());
    }
}
