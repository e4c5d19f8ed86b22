//! 데이터 및 서버 설정 관리 모듈
//!
//! 실행 환경, 저장소 연결, HTTP 바인딩 설정을 환경 변수에서 읽어옵니다.

use std::env;

use crate::utils::string_utils::clean_optional_string;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 개발 환경 - 빠른 개발을 위한 설정
    Development,
    /// 테스트 환경 - 자동화된 테스트용 설정
    Test,
    /// 스테이징 환경 - 프로덕션 유사 환경
    Staging,
    /// 프로덕션 환경 - 최고 수준의 보안 및 성능
    Production,
}

impl Environment {
    /// 현재 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 또는 `NODE_ENV` 환경 변수를 확인하며,
    /// 설정되지 않은 경우 `Production`을 기본값으로 사용합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let env = Environment::current();
    /// match env {
    ///     Environment::Development => println!("개발 환경"),
    ///     Environment::Production => println!("프로덕션 환경"),
    ///     _ => {}
    /// }
    /// ```
    pub fn current() -> Self {
        match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| env::var("NODE_ENV").unwrap_or_else(|_| "production".to_string()))
            .to_lowercase()
            .as_str()
        {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    /// 환경별 기본 로그 필터
    ///
    /// 개발 환경은 어댑터 내부의 `debug` 로그(무시된 변경 키 등)까지 출력합니다.
    /// `RUST_LOG` 가 설정되면 이 값은 사용되지 않습니다.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Development => "debug,actix_web=debug",
            Environment::Test => "warn",
            Environment::Staging | Environment::Production => "info",
        }
    }

    /// 문자열에서 Environment를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `s` - 환경 이름 문자열 (대소문자 무관)
    ///
    /// # Returns
    ///
    /// 해당하는 Environment 값. 알 수 없는 값인 경우 `Production`을 반환합니다.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// 문서 저장소 연결 설정
///
/// 어댑터 옵션 JSON 에 값이 없을 때 사용되는 환경 변수 값입니다.
/// 값이 없으면 `None` 을 반환하여 옵션 해석 단계의 기본값이 적용되도록 합니다.
///
/// # Environment Variables
///
/// - `MONGODB_URI`: 연결 URI
/// - `DATABASE_NAME`: 데이터베이스 이름
/// - `USER_COLLECTION`: 사용자 컬렉션 이름
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreConfig {
    pub mongo_uri: Option<String>,
    pub database_name: Option<String>,
    pub collection_name: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            mongo_uri: non_empty_var("MONGODB_URI"),
            database_name: non_empty_var("DATABASE_NAME"),
            collection_name: non_empty_var("USER_COLLECTION"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    clean_optional_string(env::var(key).ok())
}

/// 서버 바인딩 설정
pub struct ServerConfig;

impl ServerConfig {
    /// 서버가 바인딩할 포트를 반환합니다.
    ///
    /// # Returns
    ///
    /// 포트 번호. 기본값: 8080
    ///
    /// # Environment Variables
    ///
    /// - `PORT`: 커스텀 포트 설정
    pub fn port() -> u16 {
        env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080)
    }

    /// 서버가 바인딩할 호스트 주소를 반환합니다.
    ///
    /// # Returns
    ///
    /// 호스트 주소. 기본값: "0.0.0.0" (모든 인터페이스)
    ///
    /// # Environment Variables
    ///
    /// - `HOST`: 커스텀 호스트 설정
    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
    }
}
