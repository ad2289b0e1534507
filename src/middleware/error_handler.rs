use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

// 记录日志时读取的响应体上限
const MAX_LOGGED_BODY: usize = 1024;

/// 记录所有5xx响应的状态码和响应体
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    // 超长的响应体不读取，原样返回给客户端
    let content_length = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if let Some(len) = content_length.filter(|len| *len > MAX_LOGGED_BODY) {
        error!(
            "Server error {}: body of {} bytes not logged",
            response.status(),
            len
        );
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Could not read body of {} response: {}", parts.status, e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    error!(
        "Server error {}: {}",
        parts.status,
        String::from_utf8_lossy(&bytes)
    );

    // 响应体被消费过，长度头不再可信
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use tower::ServiceExt;

    fn failing_app(body: String) -> Router {
        Router::new()
            .route(
                "/fail",
                get(move || async move { (StatusCode::INTERNAL_SERVER_ERROR, body) }),
            )
            .layer(axum::middleware::from_fn(log_errors))
    }

    async fn body_of(app: Router) -> Vec<u8> {
        let response = app
            .oneshot(Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn small_error_body_is_passed_through() {
        let body = body_of(failing_app("boom".into())).await;
        assert_eq!(body, b"boom");
    }

    #[tokio::test]
    async fn oversized_error_body_reaches_the_client_intact() {
        let big = "x".repeat(MAX_LOGGED_BODY * 4);
        let body = body_of(failing_app(big.clone())).await;
        assert_eq!(body.len(), big.len());
    }
}
