use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Payment provider rejected the request with status {0}")]
    Rejected(u16),

    #[error("Payment provider response is missing the client secret")]
    MalformedResponse,
}

/// Transaction handle returned to the client for payment confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// Seam for the payment provider, so handlers and tests never talk to the
/// wire client directly.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Initiates a transaction for `amount` minor units of `currency` and
    /// returns the client secret needed to confirm it.
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError>;
}

/// Stripe-backed gateway using the payment-intents endpoint.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .client
            .post(PAYMENT_INTENTS_URL)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount.to_string()),
                ("currency", currency.to_string()),
                ("automatic_payment_methods[enabled]", "true".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PaymentError::Rejected(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        let client_secret = body["client_secret"]
            .as_str()
            .ok_or(PaymentError::MalformedResponse)?;

        Ok(PaymentIntent {
            client_secret: client_secret.to_string(),
        })
    }
}
