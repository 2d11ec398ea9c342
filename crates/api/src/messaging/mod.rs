//! Outbound messages to users: email and SMS.
//!
//! [`Messenger`] owns whichever channels are configured. A message for an
//! unconfigured channel is logged at `info` instead of sent, so local
//! development and tests run without SMTP or SMS credentials. Delivery
//! failures are logged and never fail the request that triggered them.

pub mod email;
pub mod sms;

use jobbit_core::enums::Type2fa;
use jobbit_db::models::user::User;

use email::{EmailConfig, EmailDelivery};
use sms::{SmsConfig, SmsDelivery};

pub struct Messenger {
    email: Option<EmailDelivery>,
    sms: Option<SmsDelivery>,
}

impl Messenger {
    pub fn new(
        client: reqwest::Client,
        email: Option<EmailConfig>,
        sms: Option<SmsConfig>,
    ) -> Self {
        Self {
            email: email.map(EmailDelivery::new),
            sms: sms.map(|config| SmsDelivery::new(client, config)),
        }
    }

    pub async fn send_email(&self, to: &str, subject: &str, body: &str) {
        match &self.email {
            Some(delivery) => {
                if let Err(e) = delivery.send(to, subject, body).await {
                    tracing::error!(to, subject, error = %e, "Email delivery failed");
                }
            }
            None => {
                tracing::info!(to, subject, body, "SMTP not configured; email not sent");
            }
        }
    }

    pub async fn send_sms(&self, phone_number: &str, text: &str) {
        match &self.sms {
            Some(delivery) => {
                if let Err(e) = delivery.send(phone_number, text).await {
                    tracing::error!(to = phone_number, error = %e, "SMS delivery failed");
                }
            }
            None => {
                tracing::info!(to = phone_number, text, "SMS not configured; message not sent");
            }
        }
    }

    /// Deliver a one-time code through `channel`, falling back to the user's
    /// other contact when the chosen one is missing.
    pub async fn send_code(&self, user: &User, channel: Type2fa, code: &str) {
        let text = format!("Your verification code: {code}");
        match (channel, user.email.as_deref(), user.phone_number.as_deref()) {
            (Type2fa::Phone, _, Some(phone)) | (Type2fa::Email, None, Some(phone)) => {
                self.send_sms(phone, &text).await
            }
            (_, Some(email), _) => self.send_email(email, "Verification code", &text).await,
            (_, None, None) => {
                tracing::warn!(user_id = %user.id, "User has no contact for a verification code")
            }
        }
    }
}
