//! Test doubles for the HTTP port and the retry sleeper.
//!
//! Available to this crate's tests and, through the `test-utils` feature,
//! to downstream crates.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::http::{HttpBackend, HttpStream};
use crate::retry::Sleeper;

/// Canned response for the fake backend.
#[derive(Debug, Clone)]
pub enum CannedResponse {
    /// 200 with a JSON body.
    Json(serde_json::Value),
    /// A bare status code with an empty body.
    Status(u16),
    /// A streamed body.
    Body {
        status: u16,
        content_type: Option<String>,
        chunks: Vec<Vec<u8>>,
    },
    /// A 200 body that breaks after the given chunks.
    BrokenBody {
        content_type: Option<String>,
        chunks: Vec<Vec<u8>>,
    },
    /// The request never completes (connection reset, DNS failure).
    TransportError(String),
}

impl CannedResponse {
    /// 200 streamed body with the given content type.
    pub fn body(content_type: &str, data: &[u8]) -> Self {
        Self::Body {
            status: 200,
            content_type: Some(content_type.to_string()),
            chunks: vec![data.to_vec()],
        }
    }
}

struct Route {
    pattern: String,
    responses: VecDeque<CannedResponse>,
}

/// A fake HTTP backend that returns canned responses.
///
/// Routes match when the request URL contains the pattern; the first added
/// route wins. Each route replays its responses in order and then keeps
/// repeating the last one. Unmatched URLs answer 404.
#[derive(Clone, Default)]
pub struct FakeBackend {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    /// Create a new fake backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a canned response for URLs containing `url_contains`.
    pub fn with_response(self, url_contains: &str, response: CannedResponse) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            if let Some(route) = routes.iter_mut().find(|r| r.pattern == url_contains) {
                route.responses.push_back(response);
            } else {
                routes.push(Route {
                    pattern: url_contains.to_string(),
                    responses: VecDeque::from([response]),
                });
            }
        }
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn respond(&self, url: &Url) -> Option<CannedResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| url.as_str().contains(&r.pattern))?;
        if route.responses.len() > 1 {
            route.responses.pop_front()
        } else {
            route.responses.front().cloned()
        }
    }
}

fn body_stream(chunks: Vec<Vec<u8>>, broken: bool) -> crate::http::ByteStream {
    let items: Vec<ApiResult<Bytes>> = chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
    let tail: Vec<ApiResult<Bytes>> = if broken {
        vec![Err(ApiError::Transport("connection reset mid-body".to_string()))]
    } else {
        Vec::new()
    };
    stream::iter(items).chain(stream::iter(tail)).boxed()
}

#[async_trait]
impl HttpBackend for FakeBackend {
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        _timeout: Duration,
    ) -> ApiResult<T> {
        let not_found = || ApiError::InvalidStatusCode {
            status: 404,
            url: url.to_string(),
        };
        match self.respond(url).ok_or_else(not_found)? {
            CannedResponse::Json(json) => serde_json::from_value(json).map_err(Into::into),
            CannedResponse::Status(status)
            | CannedResponse::Body { status, .. } => Err(ApiError::InvalidStatusCode {
                status,
                url: url.to_string(),
            }),
            CannedResponse::BrokenBody { .. } => Err(ApiError::Transport(
                "connection reset mid-body".to_string(),
            )),
            CannedResponse::TransportError(message) => Err(ApiError::Transport(message)),
        }
    }

    async fn get_stream(&self, url: &Url) -> ApiResult<HttpStream> {
        let Some(response) = self.respond(url) else {
            return Ok(HttpStream {
                status: 404,
                content_type: None,
                body: body_stream(Vec::new(), false),
            });
        };

        match response {
            CannedResponse::Json(json) => Ok(HttpStream {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: body_stream(vec![json.to_string().into_bytes()], false),
            }),
            CannedResponse::Status(status) => Ok(HttpStream {
                status,
                content_type: None,
                body: body_stream(Vec::new(), false),
            }),
            CannedResponse::Body {
                status,
                content_type,
                chunks,
            } => Ok(HttpStream {
                status,
                content_type,
                body: body_stream(chunks, false),
            }),
            CannedResponse::BrokenBody {
                content_type,
                chunks,
            } => Ok(HttpStream {
                status: 200,
                content_type,
                body: body_stream(chunks, true),
            }),
            CannedResponse::TransportError(message) => Err(ApiError::Transport(message)),
        }
    }
}

/// Sleeper that returns immediately and remembers every requested pause.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
