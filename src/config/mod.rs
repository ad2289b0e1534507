use std::env;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub gmail_host: String,
    pub gmail_port: u16,
    pub gmail_email: String,
    pub gmail_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            gmail_host: env::var("GMAIL_HOST")?,
            gmail_port: env::var("GMAIL_PORT")?.parse().unwrap_or(587),
            gmail_email: env::var("GMAIL_EMAIL")?,
            gmail_password: env::var("GMAIL_PASSWORD")?,
        })
    }
}
