use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::HeaderName;

/// An [`HttpClient`] wrapper that injects a token as an HTTP header.
///
/// `header_name` is the header field to set (for Socrata feeds this is
/// [`super::APP_TOKEN_HEADER`]) and `key` is the raw value written into it.
pub struct ApiKey<C> {
    pub inner: C,
    pub header_name: String,
    pub key: String,
}

impl<C> ApiKey<C> {
    /// Wraps `inner` so every request carries a Socrata application token.
    pub fn app_token(inner: C, key: String) -> Self {
        Self {
            inner,
            header_name: super::APP_TOKEN_HEADER.to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let header_name = HeaderName::from_bytes(self.header_name.as_bytes())
            .expect("ApiKey: invalid header name");
        req.headers_mut()
            .insert(header_name, self.key.parse().expect("ApiKey: invalid value"));
        self.inner.execute(req).await
    }
}
