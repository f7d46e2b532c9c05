use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes one prepared HTTP request.
///
/// Implementations may decorate the request (see [`crate::fetch::auth`]) but
/// never retry it.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
