use std::net::SocketAddr;
use std::sync::Arc;

use htmlive_common::memory::{MemoryIdentityService, MemoryStore};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use server::config::{AppConfig, AuthConfig, CorsConfig, ServerConfig, UploadConfig};
use server::state::AppState;

pub mod routes {
    pub const REGISTER: &str = "/api/v1/auth/register";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const ME: &str = "/api/v1/auth/me";
    pub const REQUESTS: &str = "/api/v1/requests";
    pub const REQUESTS_STREAM: &str = "/api/v1/requests/stream";
    pub const PREVIEW: &str = "/api/v1/preview";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn deletion(id: &str) -> String {
        format!("/api/v1/requests/{id}/deletion")
    }
}

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";

/// A running test server backed by in-memory collaborators.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    /// Handle on the store, for moderator actions and inspection.
    pub store: MemoryStore,
    pub identity: Arc<MemoryIdentityService>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}

/// One file part of a multipart upload.
pub struct UploadFile<'a> {
    pub name: &'a str,
    pub mime: Option<&'a str>,
    pub content: &'a [u8],
}

pub fn file<'a>(name: &'a str, content: &'a str) -> UploadFile<'a> {
    UploadFile {
        name,
        mime: None,
        content: content.as_bytes(),
    }
}

pub fn bundle_form(name: Option<&str>, description: Option<&str>, files: &[UploadFile<'_>]) -> Form {
    let mut form = Form::new();
    if let Some(name) = name {
        form = form.text("name", name.to_string());
    }
    if let Some(description) = description {
        form = form.text("description", description.to_string());
    }
    for f in files {
        let mut part = Part::bytes(f.content.to_vec()).file_name(f.name.to_string());
        if let Some(mime) = f.mime {
            part = part.mime_str(mime).expect("Failed to set MIME type");
        }
        form = form.part("file", part);
    }
    form
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_upload(UploadConfig::default()).await
    }

    pub async fn spawn_with_upload(upload: UploadConfig) -> Self {
        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
                token_ttl_days: 7,
                max_failed_attempts: 3,
                lockout_secs: 900,
            },
            upload,
        };

        let store = MemoryStore::new();
        let identity = Arc::new(MemoryIdentityService::new(app_config.auth.lockout()));
        let state = AppState {
            store: Arc::new(store.clone()),
            identity: identity.clone(),
            config: app_config,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            store,
            identity,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn upload(&self, path: &str, form: Form, token: Option<&str>) -> TestResponse {
        let mut req = self.client.post(self.url(path)).multipart(form);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let res = req
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Submit a site request and return its id.
    pub async fn submit(&self, token: &str, name: &str, files: &[UploadFile<'_>]) -> String {
        let res = self
            .upload(routes::REQUESTS, bundle_form(Some(name), None, files), Some(token))
            .await;
        assert_eq!(res.status, 201, "Submission failed: {}", res.text);
        res.body["id"]
            .as_str()
            .expect("Response missing id")
            .to_string()
    }

    /// Register a user, returning the auth token.
    pub async fn create_authenticated_user(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let reg = self.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let res = self.post_without_token(routes::LOGIN, &body).await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response missing token")
            .to_string()
    }
}
