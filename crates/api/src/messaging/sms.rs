//! SMS delivery through SMS Aero or, in development, a Telegram bot chat.

use serde_json::json;

const SMS_AERO_BASE_URL: &str = "https://gate.smsaero.ru";
const TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("SMS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SMS provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Which provider carries text messages.
#[derive(Debug, Clone)]
pub enum SmsConfig {
    SmsAero {
        base_url: String,
        email: String,
        api_key: String,
        signature: String,
    },
    /// Forwards every message to one Telegram chat instead of the phone.
    Telegram {
        base_url: String,
        bot_token: String,
        chat_id: String,
    },
}

impl SmsConfig {
    /// Returns `None` when `SMS_PROVIDER` is unset.
    ///
    /// | Variable              | Used by    | Default                    |
    /// |-----------------------|------------|----------------------------|
    /// | `SMS_PROVIDER`        | both       | -- (`smsaero`/`telegram`)  |
    /// | `SMS_AERO_EMAIL`      | smsaero    | --                         |
    /// | `SMS_AERO_API_KEY`    | smsaero    | --                         |
    /// | `SMS_AERO_SIGNATURE`  | smsaero    | `SMS Aero`                 |
    /// | `SMS_AERO_BASE_URL`   | smsaero    | `https://gate.smsaero.ru`  |
    /// | `TG_BOT_TOKEN`        | telegram   | --                         |
    /// | `TG_CHAT_ID`          | telegram   | --                         |
    /// | `TG_API_BASE_URL`     | telegram   | `https://api.telegram.org` |
    ///
    /// # Panics
    ///
    /// Panics on an unknown provider or a missing credential.
    pub fn from_env() -> Option<Self> {
        let provider = std::env::var("SMS_PROVIDER").ok()?;
        let required = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set for {provider}"))
        };
        let config = match provider.as_str() {
            "smsaero" => SmsConfig::SmsAero {
                base_url: std::env::var("SMS_AERO_BASE_URL")
                    .unwrap_or_else(|_| SMS_AERO_BASE_URL.into()),
                email: required("SMS_AERO_EMAIL"),
                api_key: required("SMS_AERO_API_KEY"),
                signature: std::env::var("SMS_AERO_SIGNATURE")
                    .unwrap_or_else(|_| "SMS Aero".into()),
            },
            "telegram" => SmsConfig::Telegram {
                base_url: std::env::var("TG_API_BASE_URL")
                    .unwrap_or_else(|_| TELEGRAM_BASE_URL.into()),
                bot_token: required("TG_BOT_TOKEN"),
                chat_id: required("TG_CHAT_ID"),
            },
            other => panic!("Unknown SMS_PROVIDER '{other}'; expected smsaero or telegram"),
        };
        Some(config)
    }
}

pub struct SmsDelivery {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsDelivery {
    pub fn new(client: reqwest::Client, config: SmsConfig) -> Self {
        Self { client, config }
    }

    /// Send `text` to `phone_number`.
    pub async fn send(&self, phone_number: &str, text: &str) -> Result<(), SmsError> {
        let response = match &self.config {
            SmsConfig::SmsAero {
                base_url,
                email,
                api_key,
                signature,
            } => {
                self.client
                    .get(format!("{base_url}/v2/sms/send"))
                    .basic_auth(email, Some(api_key))
                    .query(&[
                        ("numbers[]", phone_number),
                        ("text", text),
                        ("sign", signature.as_str()),
                    ])
                    .send()
                    .await?
            }
            SmsConfig::Telegram {
                base_url,
                bot_token,
                chat_id,
            } => {
                self.client
                    .post(format!("{base_url}/bot{bot_token}/sendMessage"))
                    .json(&json!({
                        "chat_id": chat_id,
                        "text": format!("{phone_number}: {text}"),
                        "parse_mode": "HTML",
                    }))
                    .send()
                    .await?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(to = phone_number, "SMS sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    #[tokio::test]
    async fn smsaero_sends_with_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/sms/send")
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("numbers[]".into(), "+79990001122".into()),
                Matcher::UrlEncoded("text".into(), "Code 123456".into()),
                Matcher::UrlEncoded("sign".into(), "Jobbit".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let sms = SmsDelivery::new(
            reqwest::Client::new(),
            SmsConfig::SmsAero {
                base_url: server.url(),
                email: "ops@jobbit.local".into(),
                api_key: "key".into(),
                signature: "Jobbit".into(),
            },
        );
        sms.send("+79990001122", "Code 123456").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn telegram_posts_to_bot_chat() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": "42",
                "parse_mode": "HTML",
            })))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let sms = SmsDelivery::new(
            reqwest::Client::new(),
            SmsConfig::Telegram {
                base_url: server.url(),
                bot_token: "TOKEN".into(),
                chat_id: "42".into(),
            },
        );
        sms.send("+79990001122", "hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_rejection_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/botTOKEN/sendMessage")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let sms = SmsDelivery::new(
            reqwest::Client::new(),
            SmsConfig::Telegram {
                base_url: server.url(),
                bot_token: "TOKEN".into(),
                chat_id: "42".into(),
            },
        );
        let err = sms.send("+79990001122", "hello").await.unwrap_err();
        assert!(matches!(err, SmsError::Rejected { status: 401, .. }));
    }
}
