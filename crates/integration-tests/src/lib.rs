//! End-to-end test harness for the Bazaar API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a scratch database and start the server against it
//! cargo run -p bazaar-cli -- migrate
//! cargo run -p bazaar-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! The harness talks to the server over HTTP and to the same database
//! directly. Customers cannot sign in without Google, so tests create the
//! customer row themselves and mint a token with the server's secret.
//!
//! # Environment Variables
//!
//! - `BAZAAR_API_URL` - server base URL (default `http://localhost:5000`)
//! - `BAZAAR_DATABASE_URL` (or `DATABASE_URL`) - the server's database
//! - `BAZAAR_JWT_SECRET` - the server's signing secret

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_api::db::customers::GoogleProfile;
use bazaar_api::db::CustomerRepository;
use bazaar_api::models::Customer;
use bazaar_api::services::auth::{AdminAuthService, TokenKeys};

/// Shared handles for one test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub pool: PgPool,
    tokens: TokenKeys,
}

/// A signed-in customer.
pub struct TestCustomer {
    pub customer: Customer,
    pub token: String,
}

impl TestContext {
    /// Connect to the running server and its database.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("BAZAAR_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        let database_url = std::env::var("BAZAAR_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("BAZAAR_DATABASE_URL must be set");
        let secret = std::env::var("BAZAAR_JWT_SECRET").expect("BAZAAR_JWT_SECRET must be set");

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to database");

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            pool,
            tokens: TokenKeys::new(
                &SecretString::from(secret),
                Duration::from_secs(60 * 60),
            ),
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A request carrying a bearer token and a unique client IP, so the
    /// per-IP rate limiters don't trip across tests.
    pub fn request(&self, method: reqwest::Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let octet = Uuid::new_v4().as_u128() % 250 + 1;
        let builder = self
            .client
            .request(method, self.url(path))
            .header("x-forwarded-for", format!("198.51.100.{octet}"));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Create a fresh customer and a token for it.
    pub async fn customer(&self) -> TestCustomer {
        let suffix = Uuid::new_v4().simple().to_string();
        let customer = CustomerRepository::new(&self.pool)
            .upsert_google(&GoogleProfile {
                google_id: format!("it-{suffix}"),
                email: format!("it-{suffix}@example.com"),
                name: "Integration Shopper".to_string(),
                picture: None,
            })
            .await
            .expect("Failed to create customer");
        let token = self
            .tokens
            .issue_customer(&customer)
            .expect("Failed to issue customer token");
        TestCustomer { customer, token }
    }

    /// Create a fresh admin account and log in through the API.
    pub async fn admin_token(&self) -> String {
        let username = format!("it-admin-{}", Uuid::new_v4().simple());
        let password = "integration-password";
        AdminAuthService::new(&self.pool)
            .create_admin(&username, password)
            .await
            .expect("Failed to create admin");

        let resp = self
            .request(reqwest::Method::POST, "/api/admin/login", None)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login request failed");
        let body = expect_status(resp, StatusCode::OK).await;
        body["data"]["token"]
            .as_str()
            .expect("login response has a token")
            .to_string()
    }

    /// Create an active product through the admin API and return its JSON.
    pub async fn create_product(&self, admin_token: &str, price: &str, stock: i32) -> Value {
        let resp = self
            .request(reqwest::Method::POST, "/api/products", Some(admin_token))
            .json(&json!({
                "name": format!("Test product {}", Uuid::new_v4().simple()),
                "description": "Created by the integration tests",
                "price": price,
                "image": "/images/test.jpg",
                "stock": stock,
                "category": "testing",
            }))
            .send()
            .await
            .expect("Create product request failed");
        expect_status(resp, StatusCode::CREATED).await["data"].clone()
    }
}

/// Full shipping details for checkout requests.
#[must_use]
pub fn shipping_info() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "phone": "555-0100",
        "address": "12 Analytical Row",
        "city": "London",
        "state": "",
        "zipCode": "N1 9GU",
        "country": "UK",
    })
}

/// The numeric `_id` of an entity returned by the API.
#[must_use]
pub fn id_of(entity: &Value) -> i64 {
    entity["_id"].as_i64().expect("entity has a numeric _id")
}

/// Assert the status and return the parsed JSON body.
pub async fn expect_status(resp: reqwest::Response, expected: StatusCode) -> Value {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
