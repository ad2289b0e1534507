use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    mailer::MailError,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::ContactUsRequest;

#[axum::debug_handler]
pub async fn send_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactUsRequest>,
) -> impl IntoResponse {
    // 检查必填字段
    if req.email.trim().is_empty()
        || req.subject.trim().is_empty()
        || req.message.trim().is_empty()
    {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "邮箱、主题和内容均不能为空".to_string(),
            ),
        );
    }

    match state.mailer.send_contact(&req).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response("Mail sent successfully".to_string()),
        ),
        Err(MailError::InvalidAddress(_)) => (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, "邮箱地址无效".to_string()),
        ),
        Err(e) => {
            tracing::error!("Failed to send contact mail: {}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "邮件发送失败".to_string()),
            )
        }
    }
}
