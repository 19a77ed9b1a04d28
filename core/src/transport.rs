//! The seam between the engine and whatever performs HTTP I/O.
//!
//! A `Transport` sends one request and returns the response as data, with
//! every status (4xx and 5xx included) reported as a normal response.
//! Only a missing response is an error. Timeouts and cancellation are the
//! transport's business; the classifier never sees partial responses.

use crate::error::ConnectionError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectionError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectionError> {
        (**self).send(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use std::fmt;
    use std::time::Duration;

    use tracing::{trace, warn};

    use super::Transport;
    use crate::error::ConnectionError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by `ureq`.
    ///
    /// Status codes are never turned into errors here, so the classifier
    /// gets to see every response.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("UreqTransport").finish_non_exhaustive()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::build(None)
        }

        /// Bound every request (connect, send and receive) by `timeout`.
        pub fn with_timeout(timeout: Duration) -> Self {
            Self::build(Some(timeout))
        }

        fn build(timeout: Option<Duration>) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectionError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;
            trace!(method = method.as_str(), %url, "sending request");

            let result = match method {
                HttpMethod::Get => {
                    let mut builder = self.agent.get(&url);
                    for (key, value) in &headers {
                        builder = builder.header(key, value);
                    }
                    builder.call()
                }
                HttpMethod::Delete => {
                    let mut builder = self.agent.delete(&url);
                    for (key, value) in &headers {
                        builder = builder.header(key, value);
                    }
                    builder.call()
                }
                HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                    let mut builder = match method {
                        HttpMethod::Post => self.agent.post(&url),
                        HttpMethod::Put => self.agent.put(&url),
                        _ => self.agent.patch(&url),
                    };
                    for (key, value) in &headers {
                        builder = builder.header(key, value);
                    }
                    match body {
                        Some(body) => builder.send(&body[..]),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(|err| {
                warn!(%url, error = %err, "no response from storage service");
                ConnectionError::new(err.to_string())
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            // A status arrived, so the whole body is read whatever its size.
            let body = response
                .body_mut()
                .with_config()
                .limit(u64::MAX)
                .read_to_vec()
                .map_err(|err| ConnectionError::new(err.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
