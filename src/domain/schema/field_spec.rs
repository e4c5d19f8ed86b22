//! 필드 선언 타입
//!
//! 스키마의 각 물리 필드가 어떤 타입이고 어떤 정규화 규칙(trim, lowercase)과
//! 기본값을 갖는지 표현합니다. 쓰기 경로와 조회 경로가 동일한 [`FieldSpec::cast`]
//! 를 거치므로, 저장 시점의 정규화와 조회 시점의 정규화가 항상 대칭을 이룹니다.

use mongodb::bson::{oid::ObjectId, Bson, DateTime, Document};
use serde::Serialize;

use crate::core::errors::{AppError, AppResult};
use crate::domain::schema::model::Schema;

/// 필드의 선언 타입
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldKind {
    String,
    /// 정수 또는 실수. 타임스탬프는 epoch 밀리초로 저장합니다.
    Number,
    Boolean,
    Date,
    ObjectId,
    /// 임의의 값. 캐스팅 없이 그대로 저장됩니다.
    Mixed,
    /// 하위 문서 (프로필 컨테이너 등)
    Nested(Schema),
}

/// 필드 기본값
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldDefault {
    /// 고정 값
    Value(Bson),
    /// 문서 생성 시각
    Now,
}

/// 단일 물리 필드 선언
///
/// ```rust,ignore
/// let username = FieldSpec::string().trim(true).unique(true).lowercase(true);
/// let attempts = FieldSpec::number().with_default(FieldDefault::Value(Bson::Int32(0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub unique: bool,
    pub lowercase: bool,
    pub trim: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            unique: false,
            lowercase: false,
            trim: false,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn date() -> Self {
        Self::new(FieldKind::Date)
    }

    pub fn object_id() -> Self {
        Self::new(FieldKind::ObjectId)
    }

    pub fn mixed() -> Self {
        Self::new(FieldKind::Mixed)
    }

    pub fn nested(schema: Schema) -> Self {
        Self::new(FieldKind::Nested(schema))
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// 하위 문서 선언이면 내부 스키마를 반환합니다.
    pub fn as_nested(&self) -> Option<&Schema> {
        match &self.kind {
            FieldKind::Nested(schema) => Some(schema),
            _ => None,
        }
    }

    /// 선언된 기본값을 실제 값으로 평가합니다.
    ///
    /// `FieldDefault::Now` 는 `Date` 필드에는 BSON 날짜로,
    /// 그 외 필드에는 epoch 밀리초 숫자로 평가됩니다.
    pub fn default_value(&self) -> Option<Bson> {
        match self.default.as_ref()? {
            FieldDefault::Value(value) => Some(value.clone()),
            FieldDefault::Now => {
                let now = chrono::Utc::now().timestamp_millis();
                match self.kind {
                    FieldKind::Date => Some(Bson::DateTime(DateTime::from_millis(now))),
                    _ => Some(Bson::Int64(now)),
                }
            }
        }
    }

    /// 값을 선언 타입에 맞게 변환하고 정규화합니다.
    ///
    /// `null` 은 모든 타입에서 그대로 통과합니다 (필드 비우기).
    /// 변환할 수 없는 값은 `ValidationError` 로 거부됩니다.
    ///
    /// # 인자
    ///
    /// * `path` - 에러 메시지에 사용할 필드 경로
    /// * `value` - 변환할 값
    pub fn cast(&self, path: &str, value: Bson) -> AppResult<Bson> {
        if matches!(value, Bson::Null) {
            return Ok(value);
        }

        match &self.kind {
            FieldKind::String => self.cast_string(path, value),
            FieldKind::Number => cast_number(path, value),
            FieldKind::Boolean => cast_boolean(path, value),
            FieldKind::Date => cast_date(path, value),
            FieldKind::ObjectId => cast_object_id(path, value),
            FieldKind::Mixed => Ok(value),
            FieldKind::Nested(schema) => cast_nested(path, schema, value),
        }
    }

    fn cast_string(&self, path: &str, value: Bson) -> AppResult<Bson> {
        let mut text = match value {
            Bson::String(s) => s,
            Bson::Int32(n) => n.to_string(),
            Bson::Int64(n) => n.to_string(),
            Bson::Double(n) => n.to_string(),
            Bson::Boolean(b) => b.to_string(),
            Bson::ObjectId(oid) => oid.to_hex(),
            other => return Err(type_mismatch(path, "string", &other)),
        };

        if self.trim {
            text = text.trim().to_string();
        }
        if self.lowercase {
            text = text.to_lowercase();
        }

        Ok(Bson::String(text))
    }
}

fn cast_number(path: &str, value: Bson) -> AppResult<Bson> {
    match value {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => Ok(value),
        Bson::DateTime(dt) => Ok(Bson::Int64(dt.timestamp_millis())),
        Bson::String(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                Ok(Bson::Int64(n))
            } else if let Ok(n) = trimmed.parse::<f64>() {
                Ok(Bson::Double(n))
            } else {
                Err(AppError::ValidationError(format!(
                    "'{}' expects a number, got \"{}\"",
                    path, s
                )))
            }
        }
        other => Err(type_mismatch(path, "number", &other)),
    }
}

fn cast_boolean(path: &str, value: Bson) -> AppResult<Bson> {
    match value {
        Bson::Boolean(_) => Ok(value),
        Bson::String(ref s) if s.eq_ignore_ascii_case("true") => Ok(Bson::Boolean(true)),
        Bson::String(ref s) if s.eq_ignore_ascii_case("false") => Ok(Bson::Boolean(false)),
        other => Err(type_mismatch(path, "boolean", &other)),
    }
}

fn cast_date(path: &str, value: Bson) -> AppResult<Bson> {
    match value {
        Bson::DateTime(_) => Ok(value),
        Bson::Int64(ms) => Ok(Bson::DateTime(DateTime::from_millis(ms))),
        Bson::Int32(ms) => Ok(Bson::DateTime(DateTime::from_millis(i64::from(ms)))),
        Bson::String(s) => DateTime::parse_rfc3339_str(&s)
            .map(Bson::DateTime)
            .map_err(|_| AppError::ValidationError(format!("'{}' expects an RFC 3339 date, got \"{}\"", path, s))),
        other => Err(type_mismatch(path, "date", &other)),
    }
}

fn cast_object_id(path: &str, value: Bson) -> AppResult<Bson> {
    match value {
        Bson::ObjectId(_) => Ok(value),
        Bson::String(s) => ObjectId::parse_str(&s)
            .map(Bson::ObjectId)
            .map_err(|_| AppError::ValidationError(format!("'{}' expects an ObjectId, got \"{}\"", path, s))),
        other => Err(type_mismatch(path, "ObjectId", &other)),
    }
}

fn cast_nested(path: &str, schema: &Schema, value: Bson) -> AppResult<Bson> {
    let doc = match value {
        Bson::Document(doc) => doc,
        other => return Err(type_mismatch(path, "sub-document", &other)),
    };

    let mut casted = Document::new();
    for (key, inner) in doc {
        let inner_path = format!("{}.{}", path, key);
        let inner = match schema.path(&key) {
            Some(spec) => spec.cast(&inner_path, inner)?,
            None => inner,
        };
        casted.insert(key, inner);
    }

    Ok(Bson::Document(casted))
}

fn type_mismatch(path: &str, expected: &str, actual: &Bson) -> AppError {
    AppError::ValidationError(format!(
        "'{}' expects a {}, got {:?}",
        path,
        expected,
        actual.element_type()
    ))
}
