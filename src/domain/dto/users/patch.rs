//! 변경 패치
//!
//! `ChangeRouter` 가 논리적 변경 객체를 물리 필드 할당으로 바꾼 결과입니다.
//! 한 번의 update 호출 동안만 존재합니다.

use mongodb::bson::Document;

use crate::domain::entities::users::UserDocument;

/// 최상위 필드와 프로필 필드로 분리된 변경 집합
///
/// 두 문서 모두 물리 필드 이름을 키로 사용하며, 프로필 쪽 키에는
/// 컨테이너 접두사가 붙지 않습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub top_level: Document,
    pub profile: Document,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty() && self.profile.is_empty()
    }

    pub fn len(&self) -> usize {
        self.top_level.len() + self.profile.len()
    }

    /// 패치를 문서에 병합합니다.
    ///
    /// 프로필 하위 문서는 교체하지 않고 나열된 키만 설정하므로
    /// 변경 대상이 아닌 형제 필드는 보존됩니다.
    pub fn apply_to(&self, user: &mut UserDocument, profile_container: &str) {
        for (field, value) in &self.top_level {
            user.set(field.clone(), value.clone());
        }
        for (field, value) in &self.profile {
            user.set_in_profile(profile_container, field.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_empty_patch() {
        let patch = Patch::new();

        assert!(patch.is_empty());
        assert_eq!(patch.len(), 0);
    }

    #[test]
    fn test_apply_preserves_profile_siblings() {
        let mut user = UserDocument::from_document(doc! {
            "hash": "old",
            "profile": { "username": "alice", "bio": "hello" }
        });
        let patch = Patch {
            top_level: doc! { "hash": "new" },
            profile: doc! { "username": "bob" },
        };

        patch.apply_to(&mut user, "profile");

        assert_eq!(user.get_str("hash"), Some("new"));
        assert_eq!(
            user.as_document().get_document("profile").unwrap(),
            &doc! { "username": "bob", "bio": "hello" }
        );
    }
}
