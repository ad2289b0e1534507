use std::sync::Arc;

use axum::{Router, routing::post};

use crate::{
    AppState,
    middleware::{RateLimiter, log_errors, rate_limit},
    routes,
};

// 联系表单相关的路由
fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(routes::contact::send_contact))
}

// 创建主路由，限流中间件挂在最外层，先于其他处理执行
pub fn create_router(state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .nest(&state.config.api_base_uri, contact_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit,
        ))
        .with_state(state)
}
