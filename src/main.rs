//! 사용자 어댑터 서버 메인 애플리케이션
//!
//! 어댑터 옵션을 해석하고 MongoDB 사용자 저장소에 필드 계획을 등록한 뒤,
//! 읽기 전용 사용자 조회 API 를 Actix-web 으로 제공합니다.

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use userbase_mongo_adapter::config::{
    Environment, OptionsResolver, ResolveOptions, ServerConfig, UserOptions,
};
use userbase_mongo_adapter::core::errors::AppError;
use userbase_mongo_adapter::db::Database;
use userbase_mongo_adapter::domain::schema::Schema;
use userbase_mongo_adapter::repositories::users::{MongoUserStore, UserStore};
use userbase_mongo_adapter::routes::configure_all_routes;
use userbase_mongo_adapter::services::schema::SchemaFieldPlanner;
use userbase_mongo_adapter::services::users::UserAdapter;

/// Rate Limiting 설정 구조체
#[derive(Debug)]
struct RateLimitConfig {
    per_second: u64,
    burst_size: u32,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 사용자 어댑터 서버 시작중...");

    let adapter = initialize_adapter().await.map_err(|e| {
        if e.is_configuration_error() {
            error!("❌ 어댑터 설정 오류 (옵션 또는 스키마 확인 필요): {}", e);
        } else {
            error!("❌ 어댑터 초기화 실패: {}", e);
        }
        io::Error::other(e.to_string())
    })?;

    info!("✅ 사용자 어댑터가 초기화되었습니다!");

    start_http_server(web::Data::new(adapter)).await
}

/// 옵션 해석부터 저장소 연결까지 어댑터를 구성합니다
///
/// 호스트 스키마는 비어 있는 상태에서 시작하며, 필드 계획 등록으로
/// 어댑터가 필요로 하는 필드가 모두 추가됩니다.
///
/// # Errors
///
/// * `MissingConnectionUri` - `MONGODB_URI` 와 옵션의 `mongoURI` 가 모두 비어 있음
/// * `ValidationError` - 잘못된 필드 이름 매핑
/// * `DatabaseError` - 연결 또는 인덱스 생성 실패
async fn initialize_adapter() -> Result<UserAdapter, AppError> {
    let user_options = UserOptions::from_env()?;
    let options = Arc::new(OptionsResolver::resolve(
        &user_options,
        ResolveOptions::enforcing_connection_uri(),
    )?);

    info!(
        "📐 어댑터 옵션: database={}, collection={}, useProfile={}",
        options.connection.database_name, options.connection.collection_name, options.use_profile
    );

    let store: Arc<dyn UserStore> = Arc::new(MongoUserStore::new(
        Arc::new(Database::new()),
        options.connection.collection_name.clone(),
        Schema::new(),
    ));

    let plan = SchemaFieldPlanner::register(store.as_ref(), options).await?;
    let adapter = UserAdapter::new(store, plan);

    info!("📡 데이터베이스 연결 중...");
    adapter.connect().await?;

    Ok(adapter)
}

/// HTTP 서버를 구성하고 실행합니다
///
/// CORS, 로깅, 경로 정규화, Rate Limiting 미들웨어를 포함합니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(adapter: web::Data<UserAdapter>) -> io::Result<()> {
    let bind_address = format!("{}:{}", ServerConfig::host(), ServerConfig::port());

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 Users API: http://{}/api/v1/users", bind_address);

    let rate_limit_config = load_rate_limit_config();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit_config.per_second)
        .burst_size(rate_limit_config.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::other("Rate Limiting 설정이 올바르지 않습니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit_config.per_second,
        rate_limit_config.burst_size
    );

    HttpServer::new(move || {
        App::new()
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .app_data(adapter.clone())
            .configure(configure_all_routes)
    })
        .bind(bind_address)?
        .workers(4)
        .run()
        .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    // 로거 초기화 전이므로 결과는 stderr 로 남깁니다.
    let loaded = match profile.as_str() {
        "prod" => dotenv::from_filename(".env.prod").map(|_| ".env.prod"),
        "dev" => dotenv::from_filename(".env.dev").map(|_| ".env.dev"),
        _ => dotenv().map(|_| ".env"),
    };

    match loaded {
        Ok(file) => eprintln!("[{}] {} 파일 로드 됨", profile, file),
        Err(e) => eprintln!("[{}] 환경 파일 로드 실패: {}", profile, e),
    }
}

/// 로깅 시스템을 초기화합니다
///
/// `RUST_LOG` 가 없으면 실행 환경별 기본 필터를 사용합니다.
///
/// ```bash
/// RUST_LOG=userbase_mongo_adapter::services=debug cargo run
/// ```
fn init_logging() {
    let environment = Environment::current();
    env_logger::init_from_env(Env::default().default_filter_or(environment.default_log_filter()));
    info!("실행 환경: {:?}", environment);
}

/// CORS 설정을 구성합니다
///
/// 조회 전용 API 이므로 GET 과 preflight 만 허용합니다.
fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600)
}

/// 환경변수에서 Rate Limiting 설정을 로드합니다
///
/// * `RATE_LIMIT_PER_SECOND` - 초당 허용 요청 수 (기본값: 100)
/// * `RATE_LIMIT_BURST_SIZE` - 버스트 허용량 (기본값: 200)
fn load_rate_limit_config() -> RateLimitConfig {
    let per_second = std::env::var("RATE_LIMIT_PER_SECOND")
        .unwrap_or_else(|_| "100".to_string())
        .parse::<u64>()
        .unwrap_or_else(|e| {
            error!("RATE_LIMIT_PER_SECOND 파싱 실패: {}. 기본값 100 사용", e);
            100
        });

    let burst_size = std::env::var("RATE_LIMIT_BURST_SIZE")
        .unwrap_or_else(|_| "200".to_string())
        .parse::<u32>()
        .unwrap_or_else(|e| {
            error!("RATE_LIMIT_BURST_SIZE 파싱 실패: {}. 기본값 200 사용", e);
            200
        });

    let config = RateLimitConfig {
        per_second,
        burst_size,
    };

    info!("Rate Limiting 설정 로드됨: {:?}", config);
    config
}
