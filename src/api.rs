// API client module: a small blocking HTTP client for the background
// removal service. One call, one multipart part, no retries.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use reqwest::header::HeaderValue;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};

/// Form field the service expects the image under.
pub const IMAGE_FIELD: &str = "image_file";
/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Content type used when the extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client bound to one endpoint and one API key.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    api_key: HeaderValue,
}

/// The file part of the request body, before it becomes a
/// `multipart::Part`. Kept separate so the headers can be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ApiClient {
    /// Create a client for `endpoint`. `timeout` bounds the whole call; the
    /// connect phase is additionally capped at 30 seconds.
    pub fn new(endpoint: impl Into<String>, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| Error::Request(format!("API key is not a valid header value: {e}")))?;
        api_key.set_sensitive(true);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| Error::Request(format!("http client: {e}")))?;

        Ok(ApiClient {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoint.clone(), &config.api_key, config.timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload `src` and return the processed image bytes. Any status other
    /// than 200 is an error carrying the status and the raw body text.
    pub fn remove_background(&self, src: &Path) -> Result<Vec<u8>> {
        let upload = ImageUpload::from_path(src)?;
        debug!(
            endpoint = %self.endpoint,
            file_name = %upload.file_name,
            content_type = %upload.content_type,
            bytes = upload.data.len(),
            "uploading image"
        );

        // The service wants a plain `filename="<base name>"`, not the
        // RFC 5987 `filename*=` form reqwest switches to when it encodes.
        let form = multipart::Form::new()
            .percent_encode_noop()
            .part(IMAGE_FIELD, upload.into_part()?);
        let res = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.clone())
            .multipart(form)
            .send()
            .map_err(Error::Transport)?;

        let status = res.status();
        let body = res.bytes().map_err(Error::Transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status != StatusCode::OK {
            return Err(Error::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        info!(bytes = body.len(), "background removed");
        Ok(body.to_vec())
    }
}

impl ImageUpload {
    /// Read `src` fully into memory. The file handle is closed before this
    /// returns, whether reading succeeded or not.
    pub fn from_path(src: &Path) -> Result<Self> {
        let data = {
            let mut file = File::open(src).map_err(|source| Error::Open {
                path: src.to_path_buf(),
                source,
            })?;
            let mut data = Vec::new();
            file.read_to_end(&mut data).map_err(|source| Error::Read {
                path: src.to_path_buf(),
                source,
            })?;
            data
        };

        let file_name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| src.display().to_string());

        Ok(ImageUpload {
            file_name,
            content_type: content_type_for(src),
            data,
        })
    }

    fn into_part(self) -> Result<multipart::Part> {
        multipart::Part::bytes(self.data)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|e| Error::Request(format!("create form part: {e}")))
    }
}

/// Best-effort content type from the file extension (case-insensitive).
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// Upload `config.input` and write the result to `config.output`.
pub fn remove_background_to_file(config: &Config) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    let bytes = client.remove_background(&config.input)?;
    crate::output::save_output(&config.output, &bytes)
}
