use async_trait::async_trait;
use reqwest::{Method, Request, Response, Url};

/// Executes a prepared request. Decorators in [`crate::fetch::auth`] wrap an
/// inner client to add credentials before delegating.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// Remote-API calls are plain GETs with everything in the query string.
    async fn get(&self, url: Url) -> reqwest::Result<Response> {
        self.execute(Request::new(Method::GET, url)).await
    }
}
