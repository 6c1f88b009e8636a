//! Jellyfin authentication implementation

use reqwest::{header, Client};
use std::error::Error;

use crate::jellyfin::models::{AuthRequest, AuthResponse};

/// Handles authentication with a Jellyfin server
pub async fn authenticate(
    client: &Client,
    server_url: &str,
    username: &str,
    password: &str,
) -> Result<AuthResponse, Box<dyn Error>> {
    let server_url = server_url.trim_end_matches('/');
    let auth_url = format!("{}/Users/authenticatebyname", server_url);

    let auth_request = AuthRequest {
        username: username.to_string(),
        pw: password.to_string(),
    };

    let mut headers = header::HeaderMap::new();
    headers.insert(
        "Content-Type",
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        "X-Emby-Authorization",
        header::HeaderValue::from_static(
            "MediaBrowser Client=\"jellyplay\", Device=\"MediaPlayer\", DeviceId=\"jellyplay\", Version=\"0.1.0\", DeviceName=\"Jellyplay Client\"",
        ),
    );

    let response = client
        .post(&auth_url)
        .headers(headers)
        .json(&auth_request)
        .send()
        .await?;

    if response.status() == reqwest::StatusCode::OK {
        let response_text = response.text().await?;
        match serde_json::from_str::<AuthResponse>(&response_text) {
            Ok(auth_response) => Ok(auth_response),
            Err(e) => Err(format!("Failed to parse auth response: {}", e).into()),
        }
    } else {
        let error_text = response.text().await?;
        Err(format!("Login failed: {}", error_text).into())
    }
}
