//! Jellyfin API client implementation

use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tracing::{debug, error, trace};
use uuid::Uuid;

use crate::jellyfin::models::{AuthResponse, ItemsResponse, MediaItem};
use crate::jellyfin::models_playback::{
    MediaSource, PlaybackInfoBody, PlaybackInfoRequest, PlaybackInfoResponse, PlaybackStopInfo,
};

const API_LOG_TARGET: &str = "jellyplay::jellyfin::api";

/// Client for interacting with Jellyfin API
#[derive(Clone)]
pub struct JellyfinClient {
    client: Client,
    server_url: String,
    api_key: Option<String>,
    user_id: Option<String>,
    device_id: String,
}

/// Error types for Jellyfin API operations
#[derive(Debug)]
pub enum JellyfinError {
    Network(ReqwestError),
    Authentication(String),
    NotFound(String),
    InvalidResponse(String),
    Other(String),
}

// --- Error Implementations ---

impl fmt::Display for JellyfinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JellyfinError::Network(e) => write!(f, "Network error: {}", e),
            JellyfinError::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            JellyfinError::NotFound(msg) => write!(f, "Not found: {}", msg),
            JellyfinError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            JellyfinError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Error for JellyfinError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JellyfinError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReqwestError> for JellyfinError {
    fn from(err: ReqwestError) -> Self {
        JellyfinError::Network(err)
    }
}

/// The slice of the remote API the playback core depends on. Kept as a trait
/// so the orchestrator and resolver can be exercised against mock servers.
#[async_trait]
pub trait PlaybackApi: Send + Sync {
    /// Identity of the authenticated user, if any.
    fn user_id(&self) -> Option<&str>;

    /// Stable identifier of this client device.
    fn device_id(&self) -> &str;

    /// Negotiate playable media sources for an item.
    async fn get_playback_info(
        &self,
        request: &PlaybackInfoRequest,
    ) -> Result<PlaybackInfoResponse, JellyfinError>;

    /// Tell the server a playback session ended.
    async fn report_playback_stopped(&self, info: &PlaybackStopInfo) -> Result<(), JellyfinError>;

    /// Fetch intro-skip segment metadata for an item. The payload shape is
    /// server-plugin-defined and kept opaque.
    async fn get_intro_segments(&self, item_id: &str) -> Result<serde_json::Value, JellyfinError>;

    /// URL for fetching a media source's native encoding unmodified.
    fn direct_stream_url(&self, source: &MediaSource) -> Result<String, JellyfinError>;

    /// URL for a server-provided transcoding path.
    fn transcode_stream_url(&self, transcoding_path: &str) -> String;

    /// Universal audio stream URL for an item.
    fn audio_stream_url(&self, item_id: &str) -> Result<String, JellyfinError>;
}

// --- JellyfinClient Implementation ---

impl JellyfinClient {
    /// Create a new Jellyfin client with the server URL
    pub fn new(server_url: &str) -> Self {
        debug!(target: API_LOG_TARGET, "Creating new JellyfinClient with server_url: {}", server_url);

        let client = match Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(target: API_LOG_TARGET, "Error creating HTTP client with timeout: {:?}. Falling back to default.", e);
                Client::new()
            }
        };

        let normalized_url = server_url.trim_end_matches('/').to_string();

        JellyfinClient {
            client,
            server_url: normalized_url,
            api_key: None,
            user_id: None,
            device_id: Uuid::new_v4().to_string(),
        }
    }

    /// Set API key for authentication
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Set user ID for requests
    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Set the device ID instead of the generated one (e.g. from settings).
    pub fn with_device_id(mut self, device_id: &str) -> Self {
        self.device_id = device_id.to_string();
        self
    }

    // --- Private Helper Methods ---

    /// Builds a full URL for an API endpoint path.
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Checks if the client has authentication credentials.
    fn ensure_authenticated(&self) -> Result<(&str, &str), JellyfinError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| JellyfinError::Authentication("API key not set".to_string()))?;
        let user_id = self
            .user_id
            .as_deref()
            .ok_or_else(|| JellyfinError::Authentication("User ID not set".to_string()))?;
        Ok((api_key, user_id))
    }

    /// Sends a GET request and deserializes the JSON response.
    async fn _get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<T, JellyfinError> {
        let (api_key, _) = self.ensure_authenticated()?;
        let url = self.build_url(path);
        debug!(target: API_LOG_TARGET, "Sending GET request to: {}", url);

        let mut request_builder = self.client.get(&url).header("X-Emby-Token", api_key);
        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        let response = request_builder.send().await?;
        Self::_handle_response(response).await
    }

    /// Sends a POST request with a JSON body and deserializes the JSON response.
    async fn _post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        query_params: &[(&str, String)],
        body: &B,
    ) -> Result<T, JellyfinError> {
        let (api_key, _) = self.ensure_authenticated()?;
        let url = self.build_url(path);
        debug!(target: API_LOG_TARGET, "Sending POST request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("X-Emby-Token", api_key)
            .query(query_params)
            .json(body)
            .send()
            .await?;
        Self::_handle_response(response).await
    }

    /// Sends a POST request with a JSON body and expects a 204 No Content on success.
    async fn _post_json_no_content<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), JellyfinError> {
        let (api_key, _) = self.ensure_authenticated()?;
        let url = self.build_url(path);
        debug!(target: API_LOG_TARGET, "Sending POST request with JSON body to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("X-Emby-Token", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(target: API_LOG_TARGET, "POST request failed. Status: {}, Body: {}", status, error_text);
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(JellyfinError::Authentication(format!(
                        "Authentication failed ({}): {}",
                        status, error_text
                    )))
                }
                StatusCode::NOT_FOUND => Err(JellyfinError::NotFound(format!(
                    "Endpoint not found ({}): {}",
                    status, error_text
                ))),
                _ => Err(JellyfinError::InvalidResponse(format!(
                    "Unexpected status code {} (expected 204 No Content). Body: {}",
                    status, error_text
                ))),
            }
        }
    }

    /// Handles response status checking and JSON deserialization.
    async fn _handle_response<T: DeserializeOwned>(response: Response) -> Result<T, JellyfinError> {
        let status = response.status();
        trace!(target: API_LOG_TARGET, "Response status: {}", status);

        if status.is_success() {
            let response_text = response.text().await?;
            if response_text.is_empty() {
                error!(target: API_LOG_TARGET, "Received empty response body with success status {}", status);
                return Err(JellyfinError::InvalidResponse(
                    "Empty response body received".to_string(),
                ));
            }

            serde_json::from_str::<T>(&response_text).map_err(|e| {
                error!(target: API_LOG_TARGET, "JSON parsing error: {}. Full response text:\n{}", e, response_text);
                JellyfinError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(target: API_LOG_TARGET, "Request failed. Status: {}, Body: {}", status, error_text);
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(JellyfinError::Authentication(format!(
                        "Authentication failed ({}): {}",
                        status, error_text
                    )))
                }
                StatusCode::NOT_FOUND => Err(JellyfinError::NotFound(format!(
                    "Resource not found ({}): {}",
                    status, error_text
                ))),
                _ => Err(JellyfinError::InvalidResponse(format!(
                    "Request failed with status {}: {}",
                    status, error_text
                ))),
            }
        }
    }

    // --- Public API Methods ---

    /// Authenticate with Jellyfin using username and password
    pub async fn authenticate(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, JellyfinError> {
        tracing::info!(target: API_LOG_TARGET, "Authenticating user: {}", username);

        match crate::jellyfin::authenticate(&self.client, &self.server_url, username, password)
            .await
        {
            Ok(auth_response) => {
                tracing::info!(target: API_LOG_TARGET, "Authentication successful for user ID: {}", auth_response.user.id);
                self.api_key = Some(auth_response.access_token.clone());
                self.user_id = Some(auth_response.user.id.clone());
                Ok(auth_response)
            }
            Err(e) => {
                error!(target: API_LOG_TARGET, "Authentication failed for user {}: {:?}", username, e);
                Err(JellyfinError::Authentication(format!(
                    "Authentication failed: {}",
                    e
                )))
            }
        }
    }

    /// Get root items from the user's library (Views)
    pub async fn get_items(&self) -> Result<Vec<MediaItem>, JellyfinError> {
        debug!(target: API_LOG_TARGET, "Fetching root library items (Views)");
        let (_, user_id) = self.ensure_authenticated()?;
        let path = format!("/Users/{}/Views", user_id);
        let response: ItemsResponse = self._get_json(&path, None).await?;
        debug!(target: API_LOG_TARGET, "Successfully fetched {} root items", response.items.len());
        Ok(response.items)
    }

    /// Get child items of a folder/collection
    pub async fn get_items_by_parent_id(
        &self,
        parent_id: &str,
    ) -> Result<Vec<MediaItem>, JellyfinError> {
        debug!(target: API_LOG_TARGET, "Fetching items with parent_id: {}", parent_id);
        let (_, user_id) = self.ensure_authenticated()?;
        let path = format!("/Users/{}/Items", user_id);
        let params = [
            ("ParentId", parent_id),
            ("Fields", "MediaSources,SeriesName,ParentIndexNumber,IndexNumber"),
        ];
        let response: ItemsResponse = self._get_json(&path, Some(&params)).await?;
        debug!(target: API_LOG_TARGET, "Successfully fetched {} items for parent {}", response.items.len(), parent_id);
        Ok(response.items)
    }

    /// Get full details for multiple items by their IDs
    pub async fn get_items_details(
        &self,
        item_ids: &[String],
    ) -> Result<Vec<MediaItem>, JellyfinError> {
        debug!(target: API_LOG_TARGET, "Fetching details for {} item(s)", item_ids.len());
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (_, user_id) = self.ensure_authenticated()?;
        let ids_param = item_ids.join(",");
        let path = format!("/Users/{}/Items", user_id);
        let params = [
            ("Ids", ids_param.as_str()),
            ("Fields", "MediaSources,SeriesName,ParentIndexNumber,IndexNumber"),
        ];

        let response: ItemsResponse = self._get_json(&path, Some(&params)).await?;
        debug!(target: API_LOG_TARGET, "Successfully fetched details for {} items", response.items.len());
        Ok(response.items)
    }

    // --- Getter methods (primarily for testing/debugging) ---
    pub fn get_server_url(&self) -> &str {
        &self.server_url
    }
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
    pub fn get_user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[async_trait]
impl PlaybackApi for JellyfinClient {
    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn device_id(&self) -> &str {
        &self.device_id
    }

    async fn get_playback_info(
        &self,
        request: &PlaybackInfoRequest,
    ) -> Result<PlaybackInfoResponse, JellyfinError> {
        debug!(target: API_LOG_TARGET, "Requesting playback info for item_id: {}", request.item_id);
        let path = format!("/Items/{}/PlaybackInfo", request.item_id);

        let mut params: Vec<(&str, String)> = vec![
            ("UserId", request.user_id.clone()),
            ("StartTimeTicks", request.start_time_ticks.to_string()),
            ("AudioStreamIndex", request.audio_stream_index.to_string()),
            (
                "SubtitleStreamIndex",
                request.subtitle_stream_index.to_string(),
            ),
        ];
        if let Some(source_id) = &request.media_source_id {
            params.push(("MediaSourceId", source_id.clone()));
        }

        let body = PlaybackInfoBody {
            device_profile: request.device_profile.clone(),
        };
        self._post_json(&path, &params, &body).await
    }

    async fn report_playback_stopped(&self, info: &PlaybackStopInfo) -> Result<(), JellyfinError> {
        tracing::info!(
            target: API_LOG_TARGET,
            "Reporting playback stopped for item_id: {:?}",
            info.item_id
        );
        self._post_json_no_content("/Sessions/Playing/Stopped", info)
            .await
    }

    async fn get_intro_segments(&self, item_id: &str) -> Result<serde_json::Value, JellyfinError> {
        debug!(target: API_LOG_TARGET, "Fetching intro segments for item_id: {}", item_id);
        let path = format!("/Episode/{}/IntroSkipperSegments", item_id);
        self._get_json(&path, None).await
    }

    fn direct_stream_url(&self, source: &MediaSource) -> Result<String, JellyfinError> {
        let (api_key, _) = self.ensure_authenticated()?;
        let source_id = source.id.as_deref().ok_or_else(|| {
            JellyfinError::InvalidResponse("Media source has no id".to_string())
        })?;
        let container = source.container.as_deref().unwrap_or("mkv");
        let tag = source.e_tag.as_deref().unwrap_or_default();

        Ok(format!(
            "{}/Videos/{}/stream.{}?Static=true&tag={}&mediaSourceId={}&deviceId={}&api_key={}",
            self.server_url,
            source_id,
            container,
            urlencoding::encode(tag),
            urlencoding::encode(source_id),
            urlencoding::encode(&self.device_id),
            urlencoding::encode(api_key),
        ))
    }

    fn transcode_stream_url(&self, transcoding_path: &str) -> String {
        format!("{}{}", self.server_url, transcoding_path)
    }

    fn audio_stream_url(&self, item_id: &str) -> Result<String, JellyfinError> {
        let (_, user_id) = self.ensure_authenticated()?;
        Ok(format!(
            "{}/Audio/{}/universal?userId={}&deviceId={}",
            self.server_url,
            item_id,
            urlencoding::encode(user_id),
            urlencoding::encode(&self.device_id),
        ))
    }
}
