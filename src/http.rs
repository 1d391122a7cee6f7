use crate::fetcher::{ByteStream, FetchError, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use std::time::Duration;
use url::Url;

/// `Transport` backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    ///
    /// Builds the http client.
    ///
    /// # Arguments
    ///
    /// * `connect_timeout` - Time allowed to establish the connection.
    /// * `timeout`         - Time allowed for the whole request, body included.
    ///
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, url: &Url) -> Result<Box<dyn ByteStream>, FetchError> {
        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_failure)?;

        if !res.status().is_success() {
            return Err(FetchError::TransportFailure(format!(
                "{} returned {}",
                url,
                res.status()
            )));
        }

        debug!(
            "{} answered {} ({:?} bytes)",
            url,
            res.status(),
            res.content_length()
        );
        Ok(Box::new(ResponseBody { response: res }))
    }
}

struct ResponseBody {
    response: reqwest::Response,
}

#[async_trait]
impl ByteStream for ResponseBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        self.response.chunk().await.map_err(transport_failure)
    }
}

fn transport_failure(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::TransportFailure(format!("timed out: {}", error))
    } else {
        FetchError::TransportFailure(error.to_string())
    }
}
