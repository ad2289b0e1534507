use std::fmt;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::Config;
use crate::routes::contact::ContactUsRequest;

#[derive(Debug)]
pub enum MailError {
    InvalidAddress(lettre::address::AddressError),
    Build(lettre::error::Error),
    Transport(lettre::transport::smtp::Error),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::InvalidAddress(e) => write!(f, "invalid mail address: {}", e),
            MailError::Build(e) => write!(f, "failed to build mail: {}", e),
            MailError::Transport(e) => write!(f, "failed to send mail: {}", e),
        }
    }
}

impl std::error::Error for MailError {}

impl From<lettre::address::AddressError> for MailError {
    fn from(e: lettre::address::AddressError) -> Self {
        MailError::InvalidAddress(e)
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(e: lettre::error::Error) -> Self {
        MailError::Build(e)
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        MailError::Transport(e)
    }
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_contact(&self, req: &ContactUsRequest) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    own_email: String,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let credentials =
            Credentials::new(config.gmail_email.clone(), config.gmail_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.gmail_host)?
            .port(config.gmail_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            own_email: config.gmail_email.clone(),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send_contact(&self, req: &ContactUsRequest) -> Result<(), MailError> {
        // 发件人和收件人都是站点自己的邮箱，回信地址指向留言者
        let from: Mailbox = format!("Contact Us <{}>", self.own_email).parse()?;

        let message = Message::builder()
            .from(from)
            .to(self.own_email.parse()?)
            .reply_to(req.email.parse()?)
            .subject(req.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(req.message.clone())?;

        self.transport.send(message).await?;

        Ok(())
    }
}
