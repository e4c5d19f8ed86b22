//! 평문 값 뷰 변환
//!
//! 저장소 고유 값(ObjectId, BSON 날짜, 바이너리)을 JSON 평문 값으로 바꿉니다.
//! 변환 결과에는 드라이버 래퍼 타입이 남지 않습니다.
//!
//! | BSON | JSON |
//! |------|------|
//! | `ObjectId` | 24자리 hex 문자열 |
//! | `DateTime` | RFC 3339 문자열 |
//! | `Binary` | base64 문자열 |
//! | 문서 / 배열 | 재귀 변환 |
//! | 기타 | relaxed Extended JSON |

use base64::{engine::general_purpose::STANDARD, Engine as _};
use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

/// 호출자에게 노출되는 사용자 뷰
pub type UserView = Map<String, Value>;

/// BSON 값을 평문 JSON 값으로 변환합니다.
pub fn to_plain(value: &Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(dt.timestamp_millis())),
        Bson::Binary(binary) => Value::String(STANDARD.encode(&binary.bytes)),
        Bson::Array(items) => Value::Array(items.iter().map(to_plain).collect()),
        Bson::Document(doc) => Value::Object(plain_document(doc)),
        other => other.clone().into_relaxed_extjson(),
    }
}

/// 문서 전체를 평문 맵으로 변환합니다.
pub fn plain_document(doc: &Document) -> UserView {
    doc.iter()
        .map(|(key, value)| (key.clone(), to_plain(value)))
        .collect()
}
