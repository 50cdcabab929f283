//! Bulletin fetching.
//!
//! The poll coordinator talks to the network only through [`BulletinSource`],
//! so cycles can be driven by a scripted source in tests.

mod http;

pub use http::*;

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Fetch error types.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("client error: {0}")]
    Client(String),
}

/// Status and body of a completed fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Something that can retrieve the bulletin page.
pub trait BulletinSource: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}
