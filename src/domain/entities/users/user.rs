//! User Entity Implementation
//!
//! 저장소에 보관되는 원본 사용자 문서입니다.
//! 필드 이름이 설정에 따라 달라지므로 구조체 필드 대신 BSON 문서를 감싸고,
//! 최상위 필드와 프로필 하위 문서 필드에 대한 접근자를 제공합니다.

use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

/// 원본 사용자 문서
///
/// 자격 증명 필드(hash, salt)를 포함한 모든 필드를 담고 있으므로
/// 호출자에게 그대로 노출해서는 안 됩니다. 외부로 내보낼 때는
/// `FieldProjector` 를 거친 뷰를 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDocument(Document);

impl UserDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: Document) -> Self {
        Self(document)
    }

    /// 저장소가 부여한 `_id`
    pub fn id(&self) -> Option<ObjectId> {
        self.0.get_object_id("_id").ok()
    }

    /// ID 문자열로 변환
    pub fn id_hex(&self) -> Option<String> {
        self.id().map(|id| id.to_hex())
    }

    pub fn set_id(&mut self, id: ObjectId) {
        self.0.insert("_id", id);
    }

    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Bson>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// 프로필 하위 문서의 필드 값
    ///
    /// 프로필 컨테이너가 없거나 하위 문서가 아니면 `None` 입니다.
    pub fn get_in_profile(&self, container: &str, field: &str) -> Option<&Bson> {
        self.0.get_document(container).ok()?.get(field)
    }

    /// 프로필 하위 문서에 값을 설정합니다.
    ///
    /// 컨테이너가 없거나 하위 문서가 아닌 값이 들어 있으면 새 하위 문서로 교체합니다.
    pub fn set_in_profile(&mut self, container: &str, field: impl Into<String>, value: impl Into<Bson>) {
        if !matches!(self.0.get(container), Some(Bson::Document(_))) {
            self.0.insert(container, Document::new());
        }
        if let Some(Bson::Document(profile)) = self.0.get_mut(container) {
            profile.insert(field.into(), value.into());
        }
    }

    /// 프로필 모드 여부에 따라 최상위 또는 프로필 하위 문서에서 값을 읽습니다.
    pub fn lookup(&self, container: Option<&str>, field: &str) -> Option<&Bson> {
        match container {
            Some(container) => self.get_in_profile(container, field),
            None => self.get(field),
        }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.0.get(field)? {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    /// 정수형으로 읽을 수 있는 값을 `i64` 로 반환합니다.
    ///
    /// BSON 날짜는 epoch 밀리초로 변환됩니다.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        as_i64(self.0.get(field)?)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for UserDocument {
    fn from(document: Document) -> Self {
        Self(document)
    }
}

impl From<UserDocument> for Document {
    fn from(user: UserDocument) -> Self {
        user.0
    }
}

/// 숫자 / 날짜 BSON 값을 `i64` 로 변환합니다.
pub fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) if n.is_finite() => Some(*n as i64),
        Bson::DateTime(dt) => Some(dt.timestamp_millis()),
        _ => None,
    }
}
