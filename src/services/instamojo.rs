//! Instamojo payment gateway client and webhook signature checks.
//!
//! This module handles:
//! - Creating payment requests for application fees
//! - Looking up the authoritative status of a payment
//! - Verifying the HMAC-SHA1 `mac` Instamojo attaches to webhooks
//!
//! # Webhook Signature
//!
//! Instamojo signs the webhook fields with the account's private salt:
//!
//! ```text
//! mac = hex(HMAC-SHA1(salt, "fees|payment_id|payment_request_id|status"))
//! ```

use std::str::FromStr;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha1::Sha1;

use crate::config::Config;
use crate::error::AppError;

type HmacSha1 = Hmac<Sha1>;

/// Parameters for a new payment request.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequestParams {
    pub amount: Decimal,
    pub purpose: String,
    pub buyer_name: String,
    pub email: String,
    pub redirect_url: String,
    pub webhook_url: String,
}

/// Payment request as created on the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPaymentRequest {
    pub id: String,
    pub status: String,
    pub long_url: String,
    pub short_url: Option<String>,
}

/// Authoritative payment status from the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDetails {
    pub payment_request_status: String,
    pub payment_status: String,
    pub fees: Decimal,
}

/// The two gateway calls the payment flow needs.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_request(
        &self,
        params: PaymentRequestParams,
    ) -> Result<CreatedPaymentRequest, AppError>;

    async fn payment_details(
        &self,
        payment_request_id: &str,
        payment_id: &str,
    ) -> Result<PaymentDetails, AppError>;
}

/// HTTP client for Instamojo API v1.1.
#[derive(Debug, Clone)]
pub struct InstamojoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    auth_token: String,
}

impl InstamojoClient {
    /// Build a client with a 10 second request timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.instamojo_url.trim_end_matches('/').to_string(),
            api_key: config.instamojo_api_key.clone(),
            auth_token: config.instamojo_auth_token.clone(),
        })
    }

    async fn parse_envelope(response: reqwest::Response) -> Result<RawPaymentRequest, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!(
                "Instamojo responded {}: {}",
                status, body
            )));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Malformed Instamojo response: {}", e)))?;

        match envelope {
            Envelope {
                success: true,
                payment_request: Some(request),
                ..
            } => Ok(request),
            Envelope { message, .. } => Err(AppError::Gateway(format!(
                "Instamojo rejected request: {}",
                message.map(|m| m.to_string()).unwrap_or_default()
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    payment_request: Option<RawPaymentRequest>,
    message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawPaymentRequest {
    id: String,
    status: String,
    #[serde(default)]
    longurl: Option<String>,
    #[serde(default)]
    shorturl: Option<String>,
    #[serde(default)]
    payment: Option<RawPayment>,
}

#[derive(Debug, Deserialize)]
struct RawPayment {
    status: String,
    fees: serde_json::Value,
}

#[async_trait]
impl PaymentGateway for InstamojoClient {
    async fn create_payment_request(
        &self,
        params: PaymentRequestParams,
    ) -> Result<CreatedPaymentRequest, AppError> {
        let amount = format!("{:.2}", params.amount);
        let form = [
            ("amount", amount.as_str()),
            ("purpose", params.purpose.as_str()),
            ("buyer_name", params.buyer_name.as_str()),
            ("email", params.email.as_str()),
            ("redirect_url", params.redirect_url.as_str()),
            ("webhook", params.webhook_url.as_str()),
            ("allow_repeated_payments", "False"),
        ];

        let response = self
            .http
            .post(format!("{}/payment-requests/", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .header("X-Auth-Token", &self.auth_token)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Request failed: {}", e)))?;

        let request = Self::parse_envelope(response).await?;
        let long_url = request
            .longurl
            .ok_or_else(|| AppError::Gateway("Payment request has no long URL".to_string()))?;

        Ok(CreatedPaymentRequest {
            id: request.id,
            status: request.status,
            long_url,
            short_url: request.shorturl,
        })
    }

    async fn payment_details(
        &self,
        payment_request_id: &str,
        payment_id: &str,
    ) -> Result<PaymentDetails, AppError> {
        let response = self
            .http
            .get(format!(
                "{}/payment-requests/{}/{}/",
                self.base_url, payment_request_id, payment_id
            ))
            .header("X-Api-Key", &self.api_key)
            .header("X-Auth-Token", &self.auth_token)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Request failed: {}", e)))?;

        let request = Self::parse_envelope(response).await?;
        let payment = request
            .payment
            .ok_or_else(|| AppError::Gateway("Payment details missing".to_string()))?;
        let fees = match &payment.fees {
            serde_json::Value::String(raw) => parse_amount(raw).ok(),
            serde_json::Value::Number(n) => parse_amount(&n.to_string()).ok(),
            _ => None,
        }
        .ok_or_else(|| AppError::Gateway(format!("Unexpected fees value: {}", payment.fees)))?;

        Ok(PaymentDetails {
            payment_request_status: request.status,
            payment_status: payment.status,
            fees,
        })
    }
}

/// Parse a gateway amount such as `"43.21"`.
pub fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| AppError::InvalidRequest(format!("Invalid amount: {:?}", raw)))
}

/// The pipe-joined message Instamojo signs.
fn signed_message(fees: &str, payment_id: &str, payment_request_id: &str, status: &str) -> String {
    format!("{}|{}|{}|{}", fees, payment_id, payment_request_id, status)
}

fn keyed_mac(salt: &str) -> HmacSha1 {
    // HMAC pads or hashes the key, so every length is accepted
    HmacSha1::new_from_slice(salt.as_bytes()).expect("HMAC key length is valid")
}

/// Compute the hex `mac` for a set of webhook fields.
pub fn webhook_mac(
    salt: &str,
    fees: &str,
    payment_id: &str,
    payment_request_id: &str,
    status: &str,
) -> String {
    let mut mac = keyed_mac(salt);
    mac.update(signed_message(fees, payment_id, payment_request_id, status).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a webhook `mac` in constant time.
///
/// Hex case is ignored; anything that does not decode is a mismatch.
pub fn verify_webhook_mac(
    salt: &str,
    fees: &str,
    payment_id: &str,
    payment_request_id: &str,
    status: &str,
    supplied_mac: &str,
) -> bool {
    let Ok(supplied) = hex::decode(supplied_mac.trim()) else {
        return false;
    };
    let mut mac = keyed_mac(salt);
    mac.update(signed_message(fees, payment_id, payment_request_id, status).as_bytes());
    mac.verify_slice(&supplied).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mac_matches_known_vector() {
        // RFC 2202 test case 2: HMAC-SHA1("Jefe", "what do ya want for nothing?")
        let mut mac = HmacSha1::new_from_slice(b"Jefe").unwrap();
        mac.update(b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac.finalize().into_bytes()),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn test_webhook_mac_signs_pipe_joined_fields() {
        // HMAC-SHA1("TEST_SALT", "43.21|MOJO1|req1|Credit")
        assert_eq!(
            webhook_mac("TEST_SALT", "43.21", "MOJO1", "req1", "Credit"),
            "a2fb2bf3431ddc8b8ebc4c76e7029e53fec79373"
        );
    }

    #[test]
    fn test_empty_salt_still_signs() {
        assert_eq!(webhook_mac("", "1", "p", "r", "Credit").len(), 40);
    }

    #[test]
    fn test_verify_accepts_own_mac() {
        let mac = webhook_mac("TEST_SALT", "43.21", "MOJO1", "req1", "Credit");

        assert_eq!(mac.len(), 40);
        assert!(verify_webhook_mac(
            "TEST_SALT", "43.21", "MOJO1", "req1", "Credit", &mac
        ));
        assert!(verify_webhook_mac(
            "TEST_SALT",
            "43.21",
            "MOJO1",
            "req1",
            "Credit",
            &mac.to_uppercase()
        ));
    }

    #[test]
    fn test_verify_rejects_tampered_fields() {
        let mac = webhook_mac("TEST_SALT", "43.21", "MOJO1", "req1", "Credit");

        assert!(!verify_webhook_mac(
            "TEST_SALT", "4321", "MOJO1", "req1", "Credit", &mac
        ));
        assert!(!verify_webhook_mac(
            "TEST_SALT", "43.21", "MOJO1", "req1", "Failed", &mac
        ));
        assert!(!verify_webhook_mac(
            "OTHER_SALT", "43.21", "MOJO1", "req1", "Credit", &mac
        ));
        assert!(!verify_webhook_mac(
            "TEST_SALT", "43.21", "MOJO1", "req1", "Credit", "zz-not-hex"
        ));
        assert!(!verify_webhook_mac(
            "TEST_SALT", "43.21", "MOJO1", "req1", "Credit", ""
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("43.21").unwrap(), dec!(43.21));
        assert_eq!(parse_amount(" 123.45 ").unwrap(), dec!(123.45));
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_envelope_parses_payment_details() {
        let body = r#"{
            "success": true,
            "payment_request": {
                "id": "req1",
                "status": "Completed",
                "longurl": "https://www.instamojo.com/@sv/req1",
                "payment": { "payment_id": "MOJO1", "status": "Credit", "fees": "123.45" }
            }
        }"#;
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        let request = envelope.payment_request.unwrap();

        assert_eq!(request.status, "Completed");
        assert_eq!(request.payment.unwrap().status, "Credit");
        assert!(request.shorturl.is_none());
    }
}
