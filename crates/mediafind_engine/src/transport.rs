use std::path::Path;

use client_logging::{client_debug, client_warn};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    CatalogItem, FailureKind, JobSnapshot, MediaKind, MediaType, SearchResponse, SubmitReceipt,
    TransportError, TransportSettings,
};

/// Request/response access to the processing backend.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn submit_job(&self, kind: MediaKind, file: &Path)
        -> Result<SubmitReceipt, TransportError>;

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobSnapshot, TransportError>;

    /// The opaque result payload of a succeeded job.
    async fn fetch_job_result(&self, job_id: &str) -> Result<serde_json::Value, TransportError>;

    async fn list_videos(&self) -> Result<Vec<CatalogItem>, TransportError>;

    async fn list_transcriptions(&self) -> Result<Vec<CatalogItem>, TransportError>;

    async fn search_text(&self, query: &str, top_k: usize)
        -> Result<SearchResponse, TransportError>;

    async fn search_by_reference(
        &self,
        media_type: MediaType,
        id: i64,
        top_k: usize,
    ) -> Result<SearchResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    /// Append percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, TransportError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = TransportError::from_status(status.as_u16(), &body);
            client_warn!("request failed with {}: {}", status, err.message);
            return Err(err);
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        client_debug!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        decode(&body)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn submit_job(
        &self,
        kind: MediaKind,
        file: &Path,
    ) -> Result<SubmitReceipt, TransportError> {
        let bytes = tokio::fs::read(file).await.map_err(|err| {
            TransportError::new(FailureKind::Io, format!("{}: {err}", file.display()))
        })?;
        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let url = self.endpoint(&["process", kind.upload_path()])?;
        client_debug!("POST {} ({} bytes from {})", url, bytes.len(), filename);
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        let body = self.send(self.client.post(url).multipart(form)).await?;
        decode(&body)
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobSnapshot, TransportError> {
        let url = self.endpoint(&["jobs", job_id])?;
        self.get_json(url).await
    }

    async fn fetch_job_result(&self, job_id: &str) -> Result<serde_json::Value, TransportError> {
        let url = self.endpoint(&["jobs", job_id, "result"])?;
        let body: serde_json::Value = self.get_json(url).await?;
        Ok(unwrap_result_envelope(body))
    }

    async fn list_videos(&self) -> Result<Vec<CatalogItem>, TransportError> {
        let url = self.endpoint(&["videos"])?;
        self.get_json(url).await
    }

    async fn list_transcriptions(&self) -> Result<Vec<CatalogItem>, TransportError> {
        let url = self.endpoint(&["transcriptions"])?;
        self.get_json(url).await
    }

    async fn search_text(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<SearchResponse, TransportError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("top_k", &top_k.to_string());
        self.get_json(url).await
    }

    async fn search_by_reference(
        &self,
        media_type: MediaType,
        id: i64,
        top_k: usize,
    ) -> Result<SearchResponse, TransportError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("ref_type", media_type.as_str())
            .append_pair("ref_id", &id.to_string())
            .append_pair("top_k", &top_k.to_string());
        self.get_json(url).await
    }
}

/// `{ "result": ... }` yields the inner payload; anything else is the payload.
fn unwrap_result_envelope(body: serde_json::Value) -> serde_json::Value {
    match body {
        serde_json::Value::Object(mut map) => match map.remove("result") {
            Some(inner) if !inner.is_null() => inner,
            Some(inner) => {
                map.insert("result".to_string(), inner);
                serde_json::Value::Object(map)
            }
            None => serde_json::Value::Object(map),
        },
        other => other,
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(body)
        .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(TransportSettings::with_base_url(base)).unwrap()
    }

    #[test]
    fn endpoint_encodes_job_id() {
        let url = transport("http://localhost:8000")
            .endpoint(&["jobs", "a b/c", "result"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/jobs/a%20b%2Fc/result");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let url = transport("http://localhost:8000/api/").endpoint(&["videos"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/videos");
    }

    #[test]
    fn rejects_unparseable_base() {
        let err = ReqwestTransport::new(TransportSettings::with_base_url("not a url")).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[test]
    fn envelope_is_unwrapped() {
        let payload = json!({"text": "hello world"});
        assert_eq!(
            unwrap_result_envelope(json!({"job_id": "j", "result": payload.clone()})),
            payload
        );
    }

    #[test]
    fn body_without_envelope_is_the_payload() {
        let body = json!({"objects": []});
        assert_eq!(unwrap_result_envelope(body.clone()), body);
        let null_result = json!({"job_id": "j", "result": null});
        assert_eq!(unwrap_result_envelope(null_result.clone()), null_result);
    }
}
