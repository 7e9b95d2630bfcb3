use anyhow::Result;
use reqwest::{Client, ClientBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

pub const DEFAULT_PASSWORD: &str = "l3xSucks!";

pub fn build_http_client() -> Result<Client> {
    let client = ClientBuilder::new()
        .cookie_store(true)
        .user_agent(APP_USER_AGENT)
        .timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

pub async fn sign_up(client: &Client, address: &str, email: &str) -> Result<Response> {
    let body = json!({
        "name": "Clark Kent",
        "email": email,
        "password": DEFAULT_PASSWORD,
    });
    let response = client
        .post(format!("{}/api/auth/signup", address))
        .json(&body)
        .send()
        .await?;
    Ok(response)
}

pub async fn log_in(client: &Client, address: &str, email: &str) -> Result<Response> {
    let body = json!({ "email": email, "password": DEFAULT_PASSWORD });
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&body)
        .send()
        .await?;
    Ok(response)
}

/// Value of a `Set-Cookie` header on the response, if the cookie was set
pub fn response_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

pub async fn json_body(response: Response) -> Result<Value> {
    let data = response.json::<Value>().await?;
    Ok(data)
}
