//! 라이브 스키마 모델
//!
//! 호스트 애플리케이션이 선언한 사용자 문서 스키마입니다. 필드 계획이
//! 이 스키마를 확장하며, 변경 라우팅과 조회 정규화가 이 스키마를 참조합니다.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::schema::descriptor::SchemaFieldDescriptor;
use crate::domain::schema::field_spec::{FieldKind, FieldSpec};

/// 물리 필드 이름 → 필드 선언 매핑
///
/// 점(`.`)으로 구분된 경로로 하위 문서의 필드에 접근할 수 있습니다.
///
/// ```rust,ignore
/// let schema = Schema::new()
///     .with_field("profile", FieldSpec::nested(
///         Schema::new().with_field("username", FieldSpec::string()),
///     ));
///
/// assert!(schema.declares("profile.username"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    fields: BTreeMap<String, FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// 빌더 스타일 필드 선언
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// 아직 선언되지 않은 경우에만 필드를 추가합니다.
    ///
    /// 추가되었으면 `true`, 이미 선언되어 있으면 `false` 를 반환합니다.
    pub fn add(&mut self, name: impl Into<String>, spec: FieldSpec) -> bool {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return false;
        }
        self.fields.insert(name, spec);
        true
    }

    /// 경로에 해당하는 필드 선언을 찾습니다.
    pub fn path(&self, path: &str) -> Option<&FieldSpec> {
        match path.split_once('.') {
            None => self.fields.get(path),
            Some((head, rest)) => self.fields.get(head)?.as_nested()?.path(rest),
        }
    }

    pub fn declares(&self, path: &str) -> bool {
        self.path(path).is_some()
    }

    /// 하위 문서로 선언된 필드의 내부 스키마를 반환합니다.
    pub fn nested(&self, name: &str) -> Option<&Schema> {
        self.fields.get(name)?.as_nested()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldSpec)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 필드 계획을 스키마에 적용합니다.
    ///
    /// 이미 선언된 경로는 덮어쓰지 않으므로 같은 계획을 여러 번 적용해도
    /// 결과가 같습니다. 프로필 컨테이너가 없거나 하위 문서가 아니면
    /// 계획된 필드를 담은 하위 문서로 선언합니다.
    ///
    /// # 반환값
    ///
    /// 새로 추가된 필드 수
    pub fn extend(&mut self, descriptor: &SchemaFieldDescriptor) -> usize {
        let mut added = 0;

        for (name, spec) in &descriptor.fields {
            if self.add(name.clone(), spec.clone()) {
                added += 1;
            }
        }

        if let Some(profile) = &descriptor.profile {
            let container = self
                .fields
                .entry(profile.container.clone())
                .or_insert_with(|| FieldSpec::nested(Schema::new()));

            if container.as_nested().is_none() {
                *container = FieldSpec::nested(Schema::new());
            }

            if let FieldKind::Nested(inner) = &mut container.kind {
                for (name, spec) in &profile.fields {
                    if inner.add(name.clone(), spec.clone()) {
                        added += 1;
                    }
                }
            }
        }

        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::descriptor::ProfileDescriptor;

    fn profile_schema() -> Schema {
        Schema::new()
            .with_field("name", FieldSpec::string())
            .with_field(
                "profile",
                FieldSpec::nested(Schema::new().with_field("username", FieldSpec::string())),
            )
    }

    #[test]
    fn test_dotted_path_lookup() {
        let schema = profile_schema();

        assert!(schema.declares("name"));
        assert!(schema.declares("profile"));
        assert!(schema.declares("profile.username"));
        assert!(!schema.declares("profile.email"));
        assert!(!schema.declares("name.first"));
    }

    #[test]
    fn test_add_does_not_overwrite() {
        let mut schema = Schema::new().with_field("hash", FieldSpec::string().trim(true));

        assert!(!schema.add("hash", FieldSpec::number()));
        assert_eq!(schema.path("hash"), Some(&FieldSpec::string().trim(true)));
        assert!(schema.add("salt", FieldSpec::string()));
    }

    #[test]
    fn test_extend_is_idempotent() {
        let mut descriptor = SchemaFieldDescriptor::default();
        descriptor.fields.insert("hash".to_string(), FieldSpec::string());
        descriptor.profile = Some(ProfileDescriptor {
            container: "profile".to_string(),
            fields: [("email".to_string(), FieldSpec::string())].into_iter().collect(),
        });

        let mut schema = profile_schema();
        assert_eq!(schema.extend(&descriptor), 2);
        assert_eq!(schema.extend(&descriptor), 0);

        assert!(schema.declares("hash"));
        assert!(schema.declares("profile.username"));
        assert!(schema.declares("profile.email"));
    }

    #[test]
    fn test_extend_creates_missing_profile_container() {
        let mut descriptor = SchemaFieldDescriptor::default();
        descriptor.profile = Some(ProfileDescriptor {
            container: "account".to_string(),
            fields: [("username".to_string(), FieldSpec::string())].into_iter().collect(),
        });

        let mut schema = Schema::new();
        schema.extend(&descriptor);

        assert!(schema.nested("account").is_some());
        assert!(schema.declares("account.username"));
    }
}
