//! 필드 계획 결과물
//!
//! [`SchemaFieldPlanner`](crate::services::schema::field_planner::SchemaFieldPlanner) 가
//! 옵션으로부터 한 번 유도하는 선언적 필드 목록입니다. 라이브 스키마에
//! 아직 없는 필드만 담깁니다.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::schema::field_spec::FieldSpec;

/// 최상위 필드와 (선택적) 프로필 하위 문서 필드 선언
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaFieldDescriptor {
    /// 최상위 물리 필드 이름 → 선언
    pub fields: BTreeMap<String, FieldSpec>,
    /// 프로필 모드일 때 프로필 컨테이너에 추가될 필드
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileDescriptor>,
}

/// 프로필 하위 문서에 추가될 필드 선언
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileDescriptor {
    /// 프로필 컨테이너의 최상위 필드 이름
    pub container: String,
    /// 컨테이너 내부 필드 이름(접두사 없음) → 선언
    pub fields: BTreeMap<String, FieldSpec>,
}

impl SchemaFieldDescriptor {
    /// 최상위 또는 프로필 내부에 해당 필드 선언이 있는지 확인합니다.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
            || self
                .profile
                .as_ref()
                .is_some_and(|profile| profile.fields.contains_key(name))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len() + self.profile.as_ref().map_or(0, |profile| profile.fields.len())
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}
