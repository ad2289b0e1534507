use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use contact_backend::{
    AppState,
    config::Config,
    mailer::SmtpMailer,
    middleware::{RateLimiter, run_eviction},
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置邮件发送器
    let mailer = SmtpMailer::new(&config).expect("Failed to create SMTP transport");

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        mailer: Arc::new(mailer),
    };

    // 设置限流器，并启动过期计数器的清理任务
    let rate_limiter = Arc::new(RateLimiter::new());
    tokio::spawn(run_eviction(Arc::clone(&rate_limiter)));

    let router = create_router(state.clone(), rate_limiter);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
