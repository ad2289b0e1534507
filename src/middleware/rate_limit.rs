use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;

// 每个窗口允许的最大请求数
const MAX_REQUESTS: u32 = 10;
// 窗口长度（毫秒）
const WINDOW_MS: i64 = 60_000;
// 超过多少个窗口未活跃后清理计数器
const EVICT_AFTER_WINDOWS: i64 = 3;

// 单个客户端的计数窗口
struct WindowCounter {
    count: u32,
    window_start: i64,
}

pub struct RateLimiter {
    counters: DashMap<String, WindowCounter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }

    /// 检查某个客户端是否放行，每次调用都计数（被拒绝的请求同样计数）
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, chrono::Utc::now().timestamp_millis())
    }

    fn check_at(&self, key: &str, now: i64) -> bool {
        // entry 持有分片写锁，对同一 key 的修改互斥
        let mut counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| WindowCounter {
                count: 0,
                window_start: now,
            });

        // 严格大于才算窗口过期，恰好等于窗口长度仍在窗口内
        if now - counter.window_start > WINDOW_MS {
            counter.count = 0;
            counter.window_start = now;
        }

        counter.count += 1;
        counter.count <= MAX_REQUESTS
    }

    /// 清理长期不活跃的计数器，返回清理数量
    pub fn evict_stale(&self, now: i64) -> usize {
        // 清理期间可能有新客户端插入，只统计retain实际删除的条目
        let mut evicted = 0;
        self.counters.retain(|_, counter| {
            let keep = now - counter.window_start <= WINDOW_MS * EVICT_AFTER_WINDOWS;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// 从请求头中获取IP，或者降级使用连接信息中的IP
fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or_else(|| remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    if !limiter.check(&ip) {
        tracing::warn!("Rate limit exceeded for {}", ip);
        return (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
    }

    next.run(req).await
}

/// 周期性清理任务，由 main 启动
pub async fn run_eviction(limiter: Arc<RateLimiter>) {
    let mut interval = tokio::time::interval(Duration::from_millis(WINDOW_MS as u64));

    loop {
        interval.tick().await;
        let evicted = limiter.evict_stale(chrono::Utc::now().timestamp_millis());
        if evicted > 0 {
            tracing::debug!("Evicted {} stale rate limit counters", evicted);
        }
    }
}
