use orientdb_core::Method;
use std::fmt;
use std::time::Duration;

/// Basic-auth credentials attached to a request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A single outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub credentials: Option<Credentials>,
}

/// Failed request: the response body when the server answered, otherwise the
/// transport error text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: Option<u16>,
    pub body: String,
}

/// Transport trait for performing one request and returning its body
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<String, TransportFailure>;
}

/// reqwest-backed transport. Keeps a cookie store so the server's session
/// cookie follows every request after connect.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> crate::Result<Self> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<String, TransportFailure> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        if let Some(credentials) = &request.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = builder.send().await.map_err(|e| TransportFailure {
            status: None,
            body: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TransportFailure {
            status: Some(status.as_u16()),
            body: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(TransportFailure {
                status: Some(status.as_u16()),
                body,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("admin", "secret");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("secret"));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_transport_error() {
        let transport = HttpTransport::with_timeout(Some(Duration::from_secs(2))).unwrap();
        let failure = transport
            .send(Request {
                method: Method::Get,
                url: "http://127.0.0.1:1/server".to_string(),
                credentials: None,
            })
            .await
            .unwrap_err();

        assert_eq!(failure.status, None);
        assert!(!failure.body.is_empty());
    }
}
