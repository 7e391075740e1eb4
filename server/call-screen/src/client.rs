//! Upload client for the two analysis services.

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use risk_aggregator::types::{DeepfakeResponse, PhishingResponse};

use crate::config::Config;
use crate::error::{preview, ServiceError, Upstream};

/// One uploaded audio file, kept in memory for both analysis requests.
#[derive(Debug, Clone)]
pub struct AudioUpload {
  pub file_name: String,
  pub content_type: String,
  pub bytes: Vec<u8>,
}

impl AudioUpload {
  pub const DEFAULT_CONTENT_TYPE: &'static str = "audio/wav";

  /// Name used when the client sent none: `audio_{unix_millis}.wav`.
  pub fn fallback_name() -> String {
    format!("audio_{}.wav", chrono::Utc::now().timestamp_millis())
  }
}

#[derive(Clone)]
pub struct AnalysisClient {
  http: reqwest::Client,
  deepfake_url: String,
  phishing_url: String,
  preview_chars: usize,
}

impl AnalysisClient {
  pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.analysis_timeout {
      builder = builder.timeout(timeout);
    }
    Ok(Self {
      http: builder.build()?,
      deepfake_url: config.deepfake_url.clone(),
      phishing_url: config.phishing_url.clone(),
      preview_chars: config.error_preview_chars,
    })
  }

  pub async fn deepfake(&self, audio: &AudioUpload) -> Result<DeepfakeResponse, ServiceError> {
    self.upload(Upstream::Deepfake, &self.deepfake_url, audio).await
  }

  pub async fn phishing(&self, audio: &AudioUpload) -> Result<PhishingResponse, ServiceError> {
    self.upload(Upstream::Phishing, &self.phishing_url, audio).await
  }

  /// POST the file as multipart field `file` and decode the JSON reply.
  ///
  /// Non-success statuses and unparseable bodies become errors; nothing is retried.
  async fn upload<T: DeserializeOwned>(
    &self,
    service: Upstream,
    url: &str,
    audio: &AudioUpload,
  ) -> Result<T, ServiceError> {
    info!(
      "{} upload: file={}, bytes={}",
      service,
      audio.file_name,
      audio.bytes.len()
    );

    let part = Part::bytes(audio.bytes.clone())
      .file_name(audio.file_name.clone())
      .mime_str(&audio.content_type)
      .map_err(|source| ServiceError::Upstream { service, source })?;
    let form = Form::new().part("file", part);

    let response = self
      .http
      .post(url)
      .multipart(form)
      .send()
      .await
      .map_err(|source| ServiceError::Upstream { service, source })?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|source| ServiceError::Upstream { service, source })?;
    debug!("{} response status: {}", service, status);

    if !status.is_success() {
      return Err(ServiceError::UpstreamStatus {
        service,
        status: status.as_u16(),
      });
    }

    parse_body(service, &body, self.preview_chars)
  }
}

/// Decode an upstream body, reporting a truncated copy of it when it is not the expected JSON.
pub fn parse_body<T: DeserializeOwned>(
  service: Upstream,
  body: &str,
  preview_chars: usize,
) -> Result<T, ServiceError> {
  serde_json::from_str(body).map_err(|e| {
    debug!("{} body rejected: {}", service, e);
    ServiceError::UpstreamBody {
      service,
      preview: preview(body, preview_chars),
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use risk_aggregator::types::Probability;

  #[test]
  fn parses_deepfake_reply_with_string_probability() {
    let body = r#"{"result": "spoof", "probability": "0.87", "filename": "a.wav"}"#;
    let r: DeepfakeResponse = parse_body(Upstream::Deepfake, body, 200).unwrap();
    assert_eq!(r.probability, Probability::Text("0.87".into()));
    assert_eq!(r.result, "spoof");
  }

  #[test]
  fn parses_phishing_reply() {
    let body = r#"{"results": [{"sentence": "여보세요", "score": 0.12, "is_phishing": false}]}"#;
    let r: PhishingResponse = parse_body(Upstream::Phishing, body, 200).unwrap();
    assert_eq!(r.results.len(), 1);
    assert!(!r.results[0].is_phishing);
  }

  #[test]
  fn html_error_page_is_reported_truncated() {
    let body = "<html><body>502 Bad Gateway from nginx</body></html>";
    let err = parse_body::<PhishingResponse>(Upstream::Phishing, body, 12).unwrap_err();
    match err {
      ServiceError::UpstreamBody { service, preview } => {
        assert_eq!(service, Upstream::Phishing);
        assert_eq!(preview, "<html><body>…");
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  fn missing_field_is_a_body_error() {
    let err = parse_body::<DeepfakeResponse>(Upstream::Deepfake, r#"{"result": "spoof"}"#, 200)
      .unwrap_err();
    assert!(matches!(err, ServiceError::UpstreamBody { .. }));
  }

  #[test]
  fn fallback_name_is_wav() {
    let name = AudioUpload::fallback_name();
    assert!(name.starts_with("audio_") && name.ends_with(".wav"));
  }
}
