//! Shared fixtures for router-level tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use chrono::Utc;
use http_body_util::BodyExt;
use incubator_web_server::{
    config::Config,
    error::AppError,
    middleware::auth::hash_token,
    models::{
        application::{ApplicationStage, Batch, BatchApplicant, BatchApplication},
        payment::{NewPayment, Payment},
        user::User,
    },
    routes::build_router,
    services::instamojo::{
        CreatedPaymentRequest, PaymentDetails, PaymentGateway, PaymentRequestParams,
    },
    state::AppState,
    store::{IncubatorStore, MemoryStore},
};
use rand::Rng;
use rust_decimal_macros::dec;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SALT: &str = "TEST_SALT";

/// Gateway double that answers from canned values and records calls.
#[derive(Default)]
pub struct StubGateway {
    pub details: Mutex<Option<PaymentDetails>>,
    pub created: Mutex<Vec<PaymentRequestParams>>,
    pub lookups: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    pub fn with_details(details: PaymentDetails) -> Self {
        let stub = Self::default();
        *stub.details.lock().unwrap() = Some(details);
        stub
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_payment_request(
        &self,
        params: PaymentRequestParams,
    ) -> Result<CreatedPaymentRequest, AppError> {
        let mut created = self.created.lock().unwrap();
        created.push(params);
        let id = format!("req_{}", created.len());
        Ok(CreatedPaymentRequest {
            long_url: format!("https://www.instamojo.com/@sv/{}", id),
            short_url: Some(format!("https://imjo.in/{}", id)),
            status: "Pending".to_string(),
            id,
        })
    }

    async fn payment_details(
        &self,
        payment_request_id: &str,
        payment_id: &str,
    ) -> Result<PaymentDetails, AppError> {
        self.lookups
            .lock()
            .unwrap()
            .push((payment_request_id.to_string(), payment_id.to_string()));
        self.details
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Gateway("connection refused".to_string()))
    }
}

pub fn test_config(feature_flags: &str, fragments_dir: &str) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        server_port: 0,
        app_base_url: "http://test.local".to_string(),
        instamojo_url: "http://gateway.invalid".to_string(),
        instamojo_api_key: "key".to_string(),
        instamojo_auth_token: "token".to_string(),
        instamojo_salt: TEST_SALT.to_string(),
        feature_flags: feature_flags.to_string(),
        agreement_fragments_dir: fragments_dir.to_string(),
    }
}

pub fn random_hex() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}

/// Two stages, a batch and one application at stage 1.
pub struct ApplicationFixture {
    pub store: MemoryStore,
    pub stage_one: ApplicationStage,
    pub stage_two: ApplicationStage,
    pub batch: Batch,
    pub team_lead: BatchApplicant,
    pub cofounder: BatchApplicant,
    pub application: BatchApplication,
}

impl ApplicationFixture {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let stage_one = ApplicationStage {
            id: Uuid::new_v4(),
            name: "Payment".to_string(),
            number: 1,
        };
        let stage_two = ApplicationStage {
            id: Uuid::new_v4(),
            name: "Coding Task".to_string(),
            number: 2,
        };
        store.insert_application_stage(stage_one.clone()).await;
        store.insert_application_stage(stage_two.clone()).await;

        let batch = Batch {
            id: Uuid::new_v4(),
            name: "Batch 3".to_string(),
            batch_number: 3,
        };
        store.insert_batch(batch.clone()).await;

        let team_lead = BatchApplicant {
            id: Uuid::new_v4(),
            name: "Asha Menon".to_string(),
            email: "asha@example.com".to_string(),
            role: "product".to_string(),
            current_address: Some("Kochi, Kerala".to_string()),
        };
        let cofounder = BatchApplicant {
            id: Uuid::new_v4(),
            name: "Ravi Nair".to_string(),
            email: "ravi@example.com".to_string(),
            role: "engineering".to_string(),
            current_address: Some("Thrissur, Kerala".to_string()),
        };
        store.insert_batch_applicant(team_lead.clone()).await;
        store.insert_batch_applicant(cofounder.clone()).await;

        let application = BatchApplication {
            id: Uuid::new_v4(),
            batch_id: batch.id,
            application_stage_id: stage_one.id,
            team_lead_id: team_lead.id,
            fee: dec!(3000),
            created_at: Utc::now(),
        };
        store
            .insert_batch_application(application.clone(), vec![team_lead.id, cofounder.id])
            .await;

        Self {
            store,
            stage_one,
            stage_two,
            batch,
            team_lead,
            cofounder,
            application,
        }
    }

    /// Record a pending payment with a random request id.
    pub async fn pending_payment(&self) -> Payment {
        let request_id = random_hex();
        self.store
            .create_payment(NewPayment {
                batch_application_id: self.application.id,
                amount: self.application.fee,
                instamojo_payment_request_id: request_id.clone(),
                instamojo_payment_request_status: "Pending".to_string(),
                short_url: None,
                long_url: format!("https://www.instamojo.com/@sv/{}", request_id),
            })
            .await
            .unwrap()
    }

    pub async fn current_stage_number(&self) -> i32 {
        let application = self
            .store
            .batch_application(self.application.id)
            .await
            .unwrap()
            .unwrap();
        self.store
            .application_stage(application.application_stage_id)
            .await
            .unwrap()
            .unwrap()
            .number
    }

    pub async fn reload_payment(&self, payment: &Payment) -> Payment {
        self.store
            .payment_by_request_id(&payment.instamojo_payment_request_id)
            .await
            .unwrap()
            .unwrap()
    }
}

/// Insert a user who signs in with `token`.
pub async fn insert_user(store: &MemoryStore, token: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        name: Some("Test User".to_string()),
        email: format!("{}@example.com", random_hex()),
        login_token_hash: Some(hash_token(token)),
    };
    store.insert_user(user.clone()).await;
    user
}

pub fn app(store: MemoryStore, gateway: Arc<StubGateway>, config: Config) -> Router {
    build_router(AppState::new(Arc::new(store), gateway, config))
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get("location")
        .expect("response has a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn form_body(fields: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form_body(fields)))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_as(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}
