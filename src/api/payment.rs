use axum::{extract::State, Json};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use crate::{error::Error, util::DecimalString};

const DEFAULT_API_BASE: &str = "https://api.stripe.com";
const CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct PaymentGateway {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

impl PaymentGateway {
    pub fn new(secret_key: String, http: reqwest::Client) -> Self {
        Self::with_api_base(secret_key, http, DEFAULT_API_BASE.to_string())
    }

    pub fn with_api_base(secret_key: String, http: reqwest::Client, api_base: String) -> Self {
        Self {
            http,
            secret_key,
            api_base,
        }
    }

    pub async fn create_intent(&self, amount: i64) -> Result<PaymentIntent, Error> {
        let params = [
            ("amount", amount.to_string()),
            ("currency", CURRENCY.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::PaymentProcessor(body));
        }

        response.json().await.map_err(Into::into)
    }
}

/// Converts a major-unit price into the processor's minor-unit amount
/// (cents): multiply by 100, truncate.
pub fn minor_units(price: Decimal) -> Result<i64, Error> {
    (price * Decimal::from(100))
        .trunc()
        .to_i64()
        .ok_or(Error::InvalidField("price"))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateIntentRequest {
    pub price: DecimalString,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

pub async fn create_intent(
    State(gateway): State<PaymentGateway>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, Error> {
    let amount = minor_units(request.price.into())?;

    tracing::debug!("requesting payment intent for {} {}", amount, CURRENCY);
    let intent = gateway.create_intent(amount).await?;

    Ok(Json(CreateIntentResponse {
        client_secret: intent.client_secret,
    }))
}
