//! # Field Projector
//!
//! 원본 사용자 문서를 호출자에게 노출할 평문 뷰로 변환합니다.
//!
//! ## 필터링 정책
//!
//! 최상위와 프로필 하위 문서에 각각 독립적으로 적용됩니다.
//!
//! 1. 포함 목록이 비어 있지 않으면 목록에 있는 필드만 통과합니다.
//! 2. 아니면 제외 목록이 비어 있지 않으면 목록에 없는 필드만 통과합니다.
//! 3. 둘 다 비어 있으면 모든 필드가 통과합니다.
//!
//! 저장소 식별자 `_id` 는 필터 대상이 아니며 항상 최상위 `id` 로 노출됩니다.
//! 이미 투영된 뷰를 다시 투영하면 `id` 를 식별자로 사용하므로 결과가 같습니다.
//!
//! 프로필 투영 훅이 설정되어 있으면 프로필 뷰 구성은 훅이 전담하고
//! 프로필 포함/제외 목록은 무시됩니다.

use mongodb::bson::Document;
use serde_json::Value;

use crate::config::adapter_options::AdapterOptions;
use crate::domain::dto::users::{plain_document, to_plain, UserView};

const STORE_ID: &str = "_id";
const VIEW_ID: &str = "id";

/// 원본 문서 → 평문 뷰 변환기
pub struct FieldProjector;

impl FieldProjector {
    /// 문서 전체를 투영합니다.
    ///
    /// # 예제
    ///
    /// ```rust,ignore
    /// let view = FieldProjector::project(&options, user.as_document());
    /// assert!(view.contains_key("id"));
    /// assert!(!view.contains_key("hash")); // excludedFields: ["hash"]
    /// ```
    pub fn project(options: &AdapterOptions, raw: &Document) -> UserView {
        let mut view = UserView::new();

        if let Some(id) = raw.get(STORE_ID).or_else(|| raw.get(VIEW_ID)) {
            view.insert(VIEW_ID.to_string(), to_plain(id));
        }

        let container = options.fields.profile.as_str();

        for (field, value) in raw {
            if field == STORE_ID || field == VIEW_ID {
                continue;
            }
            if !passes(field, &options.included_fields, &options.excluded_fields) {
                continue;
            }

            let projected = if field == container {
                Self::project_profile(options, raw)
            } else {
                to_plain(value)
            };
            view.insert(field.clone(), projected);
        }

        view
    }

    /// 프로필 하위 문서만 투영합니다.
    ///
    /// 훅이 없고 프로필 컨테이너가 하위 문서가 아니면 값을 그대로 평문 변환하고,
    /// 컨테이너가 없으면 `null` 입니다.
    pub fn project_profile(options: &AdapterOptions, raw: &Document) -> Value {
        if let Some(hook) = &options.profile_projection {
            return hook.apply(raw);
        }

        let container = options.fields.profile.as_str();
        match raw.get_document(container) {
            Ok(profile) => {
                let filtered: Document = profile
                    .iter()
                    .filter(|(field, _)| {
                        passes(field, &options.included_profile_fields, &options.excluded_profile_fields)
                    })
                    .map(|(field, value)| (field.clone(), value.clone()))
                    .collect();
                Value::Object(plain_document(&filtered))
            }
            Err(_) => raw.get(container).map(to_plain).unwrap_or(Value::Null),
        }
    }
}

fn passes(field: &str, included: &[String], excluded: &[String]) -> bool {
    if !included.is_empty() {
        included.iter().any(|name| name == field)
    } else if !excluded.is_empty() {
        !excluded.iter().any(|name| name == field)
    } else {
        true
    }
}
