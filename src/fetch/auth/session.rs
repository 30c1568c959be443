use crate::fetch::client::HttpClient;
use async_trait::async_trait;

/// An [`HttpClient`] wrapper that appends a session id as a URL query
/// parameter (`sid` for the tracking backend).
pub struct SessionParam<C> {
    pub inner: C,
    pub param_name: String,
    pub session_id: String,
}

impl<C> SessionParam<C> {
    pub fn sid(inner: C, session_id: String) -> Self {
        Self {
            inner,
            param_name: "sid".to_string(),
            session_id,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for SessionParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.session_id);
        self.inner.execute(req).await
    }
}
