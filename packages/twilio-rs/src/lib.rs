// Minimal Twilio REST client for outbound SMS (Programmable Messaging API).

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client};

use crate::models::{ApiErrorBody, MessageResponse};

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("request to Twilio failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Twilio returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("message {sid} was rejected with status '{status}'")]
    Rejected { sid: String, status: String },
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format, e.g. "+15551234567".
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    pub fn with_client(options: TwilioOptions, client: Client) -> Self {
        Self { options, client }
    }

    fn messages_url(&self) -> String {
        format!(
            "{base}/Accounts/{sid}/Messages.json",
            base = API_BASE,
            sid = self.options.account_sid
        )
    }

    fn message_form<'a>(&'a self, recipient: &'a str, body: &'a str) -> HashMap<&'static str, &'a str> {
        let mut form_body = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("From", self.options.from_number.as_str());
        form_body.insert("Body", body);
        form_body
    }

    /// Queue an SMS for delivery.
    ///
    /// Succeeds once Twilio has accepted the message; carrier delivery is
    /// asynchronous and not observed here.
    pub async fn send_sms(&self, recipient: &str, body: &str) -> Result<MessageResponse, TwilioError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&self.message_form(recipient, body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message: ApiErrorBody::describe(&error_body),
            });
        }

        let message = response.json::<MessageResponse>().await?;
        if message.is_rejected() {
            return Err(TwilioError::Rejected {
                sid: message.sid,
                status: message.status,
            });
        }

        Ok(message)
    }
}
