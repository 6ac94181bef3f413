//! Outbound intro calls through Twilio.
//!
//! The bot places a short call that greets the customer with a scripted
//! message; the call markup is rendered by [`IntroCall::to_twiml`] and served
//! from the configured intro URL.

use quick_xml::escape::escape;
use serde::Deserialize;
use yatra_core::{Secret, optional_secret_from_env};

/// Default Twilio REST origin.
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Errors raised while placing a call.
#[derive(Debug, thiserror::Error)]
pub enum TelephonyError {
    /// Account SID, auth token or caller number is not configured.
    #[error("Twilio credentials are not configured")]
    MissingCredentials,

    /// No number to dial was given or configured.
    #[error("no phone number given and telephony.customer_phone is unset")]
    MissingNumber,

    /// The request did not complete.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Twilio answered with a non-success status.
    #[error("Twilio returned {status}: {message}")]
    Provider {
        /// HTTP status.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The response body was not understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TelephonyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Intro call script for one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntroCall {
    /// Customer's first name.
    pub customer_name: String,
    /// Trip destination.
    pub destination: String,
}

impl IntroCall {
    /// Creates a script.
    pub fn new(customer_name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            destination: destination.into(),
        }
    }

    /// Renders the call markup.
    #[must_use]
    pub fn to_twiml(&self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<Response>\n",
                "    <Say voice=\"Polly.Raveena-Neural\" language=\"en-IN\">",
                "Hi {name}! Thanks for showing interest in our {destination} group trip. ",
                "We've sent you some exciting package options on WhatsApp. ",
                "If you'd like to talk to a trip specialist, just press 1.</Say>\n",
                "    <Pause length=\"2\"/>\n",
                "    <Say>Have a great day!</Say>\n",
                "</Response>\n",
            ),
            name = escape(self.customer_name.as_str()),
            destination = escape(self.destination.as_str()),
        )
    }
}

/// Twilio account credentials.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    /// `TWILIO_ACCOUNT_SID`.
    pub account_sid: String,
    /// `TWILIO_AUTH_TOKEN`.
    pub auth_token: Secret,
    /// `TWILIO_PHONE_NUMBER`, the caller ID.
    pub from_number: String,
}

impl TwilioCredentials {
    /// Reads credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`TelephonyError::MissingCredentials`] if any variable is unset.
    pub fn from_env() -> Result<Self, TelephonyError> {
        Self::from_parts(
            optional_secret_from_env("TWILIO_ACCOUNT_SID"),
            optional_secret_from_env("TWILIO_AUTH_TOKEN"),
            optional_secret_from_env("TWILIO_PHONE_NUMBER"),
        )
    }

    /// Builds credentials from values that may be missing.
    ///
    /// # Errors
    ///
    /// Returns [`TelephonyError::MissingCredentials`] unless all three are set.
    pub fn from_parts(
        sid: Option<Secret>,
        token: Option<Secret>,
        from: Option<Secret>,
    ) -> Result<Self, TelephonyError> {
        match (sid, token, from) {
            (Some(sid), Some(auth_token), Some(from)) => Ok(Self {
                account_sid: sid.expose().to_string(),
                auth_token,
                from_number: from.expose().to_string(),
            }),
            _ => Err(TelephonyError::MissingCredentials),
        }
    }
}

#[derive(Deserialize)]
struct CallResource {
    sid: String,
}

/// Places calls with the Twilio REST API.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl TwilioClient {
    /// Creates a client for the given account.
    #[must_use]
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API origin.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Dials `to`; Twilio fetches the call markup from `twiml_url`.
    ///
    /// Returns the call SID.
    ///
    /// # Errors
    ///
    /// Returns a [`TelephonyError`] if the request fails or is rejected.
    pub async fn place_call(&self, to: &str, twiml_url: &str) -> Result<String, TelephonyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.base_url, self.credentials.account_sid
        );
        let form = [
            ("To", to),
            ("From", self.credentials.from_number.as_str()),
            ("Url", twiml_url),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.account_sid,
                Some(self.credentials.auth_token.expose()),
            )
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let call: CallResource = response
            .json()
            .await
            .map_err(|err| TelephonyError::InvalidResponse(err.to_string()))?;
        tracing::info!(sid = %call.sid, to, "intro call placed");
        Ok(call.sid)
    }
}
