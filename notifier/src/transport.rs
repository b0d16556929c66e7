//! Serializing a notice and delivering it to the notices endpoint.
use std::time;

use async_trait::async_trait;
use http::StatusCode;
use reqwest::header;
use tracing::{debug, warn};

use crate::error::{MalformedRequestError, ReportError, SetupError};
use crate::notice::NoticePayload;

pub const DEFAULT_ENDPOINT: &str = "https://api.honeybadger.io/v1/notices";
pub const DEFAULT_REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(30);
pub const API_KEY_HEADER: &str = "X-API-Key";
const JSON_MEDIA_TYPE: &str = "application/json";

/// Delivers one serialized notice and classifies the outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        payload: &NoticePayload,
        credential: &str,
        endpoint: &str,
    ) -> Result<(), ReportError>;
}

/// A `Transport` doing a single HTTP POST with reqwest.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(request_timeout: time::Duration) -> Result<Self, SetupError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(request_timeout)
            .build()
            .map_err(SetupError::HttpClient)?;

        Ok(Self { client })
    }

    /// Build the POST request without touching the network.
    fn build_request(
        &self,
        body: Vec<u8>,
        credential: &str,
        endpoint: &str,
    ) -> Result<reqwest::Request, MalformedRequestError> {
        let url: reqwest::Url = endpoint.parse()?;
        let api_key = header::HeaderValue::from_str(credential)?;

        self.client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .header(header::CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(header::ACCEPT, JSON_MEDIA_TYPE)
            .body(body)
            .build()
            .map_err(MalformedRequestError::Build)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        payload: &NoticePayload,
        credential: &str,
        endpoint: &str,
    ) -> Result<(), ReportError> {
        let body = encode(payload)?;
        let request = self.build_request(body, credential, endpoint)?;

        debug!("sending notice to {}", request.url());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(ReportError::Transport)?;

        let status = response.status();
        check_status(status).map_err(|error| {
            warn!("notice rejected by {} with status {}", endpoint, status);
            error
        })
    }
}

/// Serialize a payload into the bytes sent as the request body.
pub fn encode(payload: &NoticePayload) -> Result<Vec<u8>, ReportError> {
    Ok(serde_json::to_vec(payload)?)
}

/// The service answers a stored notice with 201. Every other status, 2XX included, is a failure.
fn check_status(status: StatusCode) -> Result<(), ReportError> {
    if status == StatusCode::CREATED {
        Ok(())
    } else {
        Err(ReportError::UnexpectedStatus { status })
    }
}
