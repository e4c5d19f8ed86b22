//! Database Connection Management Module
//!
//! MongoDB 연결 수명주기를 관리하는 모듈입니다.
//!
//! 연결은 한 번만 일어나는 상태 전이입니다.
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──ping ok──► Connected
//!                                  │
//!                                  └──error──► Failed ──connect()──► Connecting ...
//! ```
//!
//! `Connected` 이후의 재연결은 드라이버의 커넥션 풀이 투명하게 처리하므로
//! 이 계층에서는 동기화하지 않습니다.
//!
//! # 기본 사용법
//!
//! ```rust,ignore
//! use crate::db::Database;
//!
//! let database = Database::new();
//! database.connect("mongodb://localhost:27017", "userbase", "userbase_adapter").await?;
//! let users = database.handle()?.collection::<Document>("users");
//! ```

use std::sync::RwLock;

use log::{error, info, warn};
use mongodb::{bson::doc, options::ClientOptions, Client};

use crate::core::errors::{AppError, AppResult};

/// 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// MongoDB 데이터베이스 연결 래퍼
///
/// 연결 전에도 생성할 수 있으며, 실제 클라이언트는 [`Database::connect`]
/// 가 성공한 뒤에만 사용할 수 있습니다.
pub struct Database {
    state: RwLock<ConnectionState>,
    handle: RwLock<Option<mongodb::Database>>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ConnectionState::Disconnected),
            handle: RwLock::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
            .read()
            .map(|state| *state)
            .unwrap_or(ConnectionState::Failed)
    }

    fn set_state(&self, next: ConnectionState) {
        if let Ok(mut state) = self.state.write() {
            *state = next;
        }
    }

    /// 상태 확인과 `Connecting` 전이를 하나의 쓰기 잠금 안에서 수행합니다.
    ///
    /// 이미 연결되어 있으면 `false`, 이번 호출이 연결을 맡으면 `true` 입니다.
    /// 다른 호출이 연결 중이면 두 번째 클라이언트를 만들지 않고 거부합니다.
    fn begin_connect(&self) -> AppResult<bool> {
        let mut state = self
            .state
            .write()
            .map_err(|_| AppError::StoreError("connection state lock poisoned".to_string()))?;

        match *state {
            ConnectionState::Connected => Ok(false),
            ConnectionState::Connecting => {
                warn!("MongoDB 연결이 이미 진행 중입니다");
                Err(AppError::StoreError("connection attempt already in progress".to_string()))
            }
            ConnectionState::Disconnected | ConnectionState::Failed => {
                *state = ConnectionState::Connecting;
                Ok(true)
            }
        }
    }

    /// MongoDB 에 연결하고 `ping` 으로 연결 상태를 검증합니다.
    ///
    /// 이미 연결된 상태면 아무 일도 하지 않고, 다른 호출이 연결 중이면
    /// `StoreError` 로 거부합니다.
    ///
    /// ## 인자
    ///
    /// * `uri` - MongoDB 연결 URI
    /// * `database_name` - 사용할 데이터베이스 이름
    /// * `app_name` - 서버 로그와 모니터링에 표시될 애플리케이션 이름
    ///
    /// ## 에러
    ///
    /// URI 파싱, 클라이언트 생성, ping 실패 시 드라이버 에러를 그대로
    /// `AppError::DatabaseError` 로 반환하고 상태를 `Failed` 로 전환합니다.
    pub async fn connect(&self, uri: &str, database_name: &str, app_name: &str) -> AppResult<()> {
        if !self.begin_connect()? {
            return Ok(());
        }

        info!("📡 MongoDB 연결 중... (database: {})", database_name);

        match Self::open(uri, database_name, app_name).await {
            Ok(database) => {
                if let Ok(mut handle) = self.handle.write() {
                    *handle = Some(database);
                }
                self.set_state(ConnectionState::Connected);
                info!("✅ MongoDB 연결 성공: {}", database_name);
                Ok(())
            }
            Err(e) => {
                self.set_state(ConnectionState::Failed);
                error!("❌ MongoDB 연결 실패: {}", e);
                Err(AppError::DatabaseError(e))
            }
        }
    }

    async fn open(uri: &str, database_name: &str, app_name: &str) -> mongodb::error::Result<mongodb::Database> {
        let mut client_options = ClientOptions::parse(uri).await?;

        // 애플리케이션 이름 설정 (모니터링 및 로깅에 유용)
        client_options.app_name = Some(app_name.to_string());

        let client = Client::with_options(client_options)?;
        let database = client.database(database_name);

        database.run_command(doc! { "ping": 1 }).await?;

        Ok(database)
    }

    /// 연결된 데이터베이스 핸들을 반환합니다.
    ///
    /// 연결되지 않았으면 `AppError::NotConnected` 입니다.
    pub fn handle(&self) -> AppResult<mongodb::Database> {
        self.handle
            .read()
            .ok()
            .and_then(|handle| handle.clone())
            .ok_or(AppError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_database_is_disconnected() {
        let database = Database::new();

        assert_eq!(database.state(), ConnectionState::Disconnected);
        assert!(matches!(database.handle(), Err(AppError::NotConnected)));
    }

    #[actix_web::test]
    async fn test_invalid_uri_moves_to_failed() {
        let database = Database::new();

        let result = database.connect("not-a-mongodb-uri", "userbase", "test").await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert_eq!(database.state(), ConnectionState::Failed);
        assert!(database.handle().is_err());
    }

    #[actix_web::test]
    async fn test_concurrent_connect_is_rejected_while_connecting() {
        let database = Database::new();
        database.set_state(ConnectionState::Connecting);

        let result = database.connect("mongodb://localhost:27017", "userbase", "test").await;

        assert!(matches!(result, Err(AppError::StoreError(_))));
        assert_eq!(database.state(), ConnectionState::Connecting);
        assert!(database.handle().is_err());
    }

    #[test]
    fn test_begin_connect_claims_transition_once() {
        let database = Database::new();

        assert!(database.begin_connect().unwrap());
        assert_eq!(database.state(), ConnectionState::Connecting);
        assert!(database.begin_connect().is_err());

        database.set_state(ConnectionState::Connected);
        assert!(!database.begin_connect().unwrap());

        database.set_state(ConnectionState::Failed);
        assert!(database.begin_connect().unwrap());
    }
}
