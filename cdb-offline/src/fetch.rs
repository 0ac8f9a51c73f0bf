//! Fetch Types
//!
//! Requests seen by the agent, responses it produces, and the [`Network`]
//! seam through which it reaches the live network.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::NetworkError;

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// No CORS
    NoCors,
    /// CORS
    Cors,
    /// Top-level document navigation
    Navigate,
}

/// Fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: RequestMethod,
    pub mode: RequestMode,
}

impl Request {
    /// A subresource `GET` in CORS mode.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Get,
            mode: RequestMode::Cors,
        }
    }

    /// A document navigation.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::new(url)
        }
    }

    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// Fetch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Final URL of the response.
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            url: url.into(),
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// `200 OK` HTML document.
    pub fn html(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, url, body).with_header("content-type", "text/html; charset=utf-8")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Status in the 200-299 range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The live network.
///
/// `Err` means the request never produced a response. HTTP error statuses
/// are returned as `Ok` responses.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}
