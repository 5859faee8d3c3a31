use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CrmError;
use crate::rate_gate::RateGate;

/// How a vendor expects the API key to be presented.
pub enum AuthStyle {
    Bearer,
    Header(&'static str),
    QueryParam(&'static str),
}

/// Shared REST plumbing for vendor leaf adapters: URL construction, auth
/// header/param placement, rate gating, and vendor-payload deserialization.
/// Each vendor adapter owns one of these and supplies its own endpoint
/// paths and response-shape mapping.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    auth_style: AuthStyle,
    gate: RateGate,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, auth_style: AuthStyle, min_call_interval: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            auth_style,
            gate: RateGate::new(min_call_interval),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<R, CrmError> {
        self.gate.acquire().await;
        let mut req = self.http.request(Method::GET, self.url(path)).query(query);
        req = self.apply_auth(req);
        send(req).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, CrmError> {
        self.gate.acquire().await;
        let mut req = self.http.request(Method::POST, self.url(path)).json(body);
        req = self.apply_auth(req);
        send(req).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, CrmError> {
        self.gate.acquire().await;
        let mut req = self.http.request(Method::PUT, self.url(path)).json(body);
        req = self.apply_auth(req);
        send(req).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), CrmError> {
        self.gate.acquire().await;
        let mut req = self.http.request(Method::DELETE, self.url(path));
        req = self.apply_auth(req);
        let resp = req.send().await?;
        map_status(resp.status())?;
        Ok(())
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer => req.bearer_auth(&self.api_key),
            AuthStyle::Header(name) => req.header(name, &self.api_key),
            AuthStyle::QueryParam(name) => req.query(&[(name, &self.api_key)]),
        }
    }
}

async fn send<R: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<R, CrmError> {
    let resp = req.send().await?;
    map_status(resp.status())?;
    resp.json::<R>().await.map_err(CrmError::from)
}

fn map_status(status: StatusCode) -> Result<(), CrmError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(CrmError::AuthFailed(format!("status {status}")))
        }
        StatusCode::NOT_FOUND => Err(CrmError::NotFound),
        StatusCode::TOO_MANY_REQUESTS => Err(CrmError::RateLimited { retry_after_secs: 1 }),
        s => Err(CrmError::Transport(format!("unexpected status {s}"))),
    }
}
