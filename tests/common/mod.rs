#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use chitchat_api::config::{AppConfig, Environment, TagFilterMode};
use chitchat_api::payment::{PaymentError, PaymentGateway, PaymentIntent};
use chitchat_api::routes;
use chitchat_api::state::AppState;
use chitchat_api::store::users::Role;
use chitchat_api::store::Store;

pub const TEST_CLIENT_SECRET: &str = "pi_test_secret_123";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Gateway double returning a fixed client secret, so payment tests never
/// leave the process.
pub struct FakePaymentGateway;

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_payment_intent(
        &self,
        _amount: i64,
        _currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        Ok(PaymentIntent {
            client_secret: TEST_CLIENT_SECRET.to_string(),
        })
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_key: "test-signing-key".to_string(),
        stripe_sk: None,
        cors_origins: Vec::new(),
        dev_app_name: "ChitChatConnect (dev)".to_string(),
        prod_app_name: "ChitChatConnect".to_string(),
        tag_filter_mode: TagFilterMode::Any,
        token_ttl_hours: 24,
    }
}

/// A server on an ephemeral port with its own in-memory database, plus a
/// store handle for fixtures the HTTP surface cannot create.
pub struct TestApp {
    pub base_url: String,
    pub ws_url: String,
    pub client: reqwest::Client,
    pub store: Store,
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(test_config(), true).await
}

pub async fn spawn_app_with(config: AppConfig, with_payments: bool) -> Result<TestApp> {
    let store = Store::connect(&config.database_url)
        .await
        .context("connect store")?;
    let payments =
        with_payments.then(|| Arc::new(FakePaymentGateway) as Arc<dyn PaymentGateway>);
    let state = AppState::new(config, store.clone(), payments);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = routes::serve(listener, state).await {
            eprintln!("test server stopped: {err}");
        }
    });

    Ok(TestApp {
        base_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}"),
        client: reqwest::Client::new(),
        store,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.header("authorization", token);
        }
        Ok(request.send().await?)
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<reqwest::Response> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.header("authorization", token);
        }
        Ok(request.send().await?)
    }

    pub async fn put_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<reqwest::Response> {
        let mut request = self.client.put(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.header("authorization", token);
        }
        Ok(request.send().await?)
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.header("authorization", token);
        }
        Ok(request.send().await?)
    }

    /// Registers an account and returns the user document from the envelope.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Value> {
        let response = self
            .post_json(
                "/api/auth/register",
                None,
                &json!({
                    "firstName": first_name,
                    "lastName": last_name,
                    "email": email,
                    "password": password,
                }),
            )
            .await?;
        ensure!(
            response.status().is_success(),
            "registration failed with {}",
            response.status()
        );
        let body: Value = response.json().await?;
        Ok(body["data"]["user"].clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .post_json(
                "/api/auth/login",
                None,
                &json!({ "email": email, "password": password }),
            )
            .await?;
        ensure!(
            response.status().is_success(),
            "login failed with {}",
            response.status()
        );
        let body: Value = response.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from login response")
    }

    /// Registers and logs in; returns the user document and a token.
    pub async fn signed_up_user(&self, email: &str) -> Result<(Value, String)> {
        let local = email.split('@').next().unwrap_or("Test");
        let user = self.register(local, "Tester", email, TEST_PASSWORD).await?;
        let token = self.login(email, TEST_PASSWORD).await?;
        Ok((user, token))
    }

    /// Flips the account's role directly in the store; there is no HTTP
    /// endpoint for bootstrapping the first admin.
    pub async fn promote_to_admin(&self, email: &str) -> Result<()> {
        let mut user = self
            .store
            .user_by_email(email)
            .await?
            .context("user not found")?;
        user.role = Role::Admin;
        self.store.update_user(&user).await?;
        Ok(())
    }

    pub async fn create_post(
        &self,
        token: &str,
        title: &str,
        is_public: bool,
        tags: &[&str],
    ) -> Result<Value> {
        let tags: Vec<Value> = tags.iter().map(|name| json!({ "name": name })).collect();
        let response = self
            .post_json(
                "/api/posts/add",
                Some(token),
                &json!({
                    "title": title,
                    "body": format!("{title} body"),
                    "isPublic": is_public,
                    "tags": tags,
                }),
            )
            .await?;
        ensure!(
            response.status().is_success(),
            "post creation failed with {}",
            response.status()
        );
        let body: Value = response.json().await?;
        Ok(body["data"]["post"].clone())
    }
}

/// Reads the envelope and asserts the error shape in one step.
pub async fn expect_error(
    response: reqwest::Response,
    status: u16,
    custom_message: &str,
) -> Result<Value> {
    ensure!(
        response.status().as_u16() == status,
        "expected {status}, got {}",
        response.status()
    );
    let body: Value = response.json().await?;
    ensure!(body["status"] == "error", "not an error envelope: {body}");
    ensure!(
        body["customMessage"] == custom_message,
        "unexpected customMessage: {body}"
    );
    Ok(body)
}
