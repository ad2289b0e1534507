use serde::{Deserialize, Serialize};

/// 联系我们表单内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactUsRequest {
    pub email: String,
    pub subject: String,
    pub message: String,
}
