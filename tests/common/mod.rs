#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use content_platform_api::app::{router, AppState};
use content_platform_api::config::AppConfig;
use content_platform_api::dto::SignUpRequest;
use content_platform_api::types::Role;

pub const PASSWORD: &str = "secret12";

/// In-process server over fresh in-memory stores, one per test
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::in_memory(AppConfig::for_tests())?;
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url,
            state,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response> {
        let mut request = self.client.patch(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Sign up through the public endpoint and return the new account id
    pub async fn sign_up(&self, name: &str) -> Result<i64> {
        let res = self
            .post(
                "/auth/signup",
                None,
                &json!({ "name": name, "email": email(name), "password": PASSWORD }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("signup response without id")
    }

    pub async fn login(&self, name: &str) -> Result<String> {
        let res = self
            .post("/auth/login", None, &json!({ "email": email(name), "password": PASSWORD }))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }

    /// Sign up and log in a USER
    pub async fn user(&self, name: &str) -> Result<(i64, String)> {
        let id = self.sign_up(name).await?;
        Ok((id, self.login(name).await?))
    }

    /// Sign up a USER, promote it to EDITOR and log in
    pub async fn editor(&self, name: &str) -> Result<(i64, String)> {
        let id = self.sign_up(name).await?;
        self.state.auth.update_role(id, Role::Editor).await?;
        Ok((id, self.login(name).await?))
    }

    /// Admins are only created out of band, the way the admin CLI does it
    pub async fn admin(&self, name: &str) -> Result<(i64, String)> {
        let account = self
            .state
            .auth
            .sign_up(
                SignUpRequest {
                    name: name.to_string(),
                    email: email(name),
                    password: PASSWORD.to_string(),
                },
                Role::Admin,
            )
            .await?;
        Ok((account.id, self.login(name).await?))
    }
}

pub fn email(name: &str) -> String {
    format!("{}@example.com", name)
}

pub async fn data(res: Response) -> Result<Value> {
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}
