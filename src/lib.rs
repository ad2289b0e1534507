use std::sync::Arc;

use config::Config;
use mailer::MailSender;

pub mod config;
pub mod mailer;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub mailer: Arc<dyn MailSender>,
}
