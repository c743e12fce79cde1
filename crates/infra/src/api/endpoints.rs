//! Static endpoint descriptors
//!
//! Every platform call names a descriptor: a path template, a verb, the
//! documentation link and a human description. The last two end up in error
//! messages so a failed call points straight at the relevant docs page.

use std::fmt;

/// HTTP verb of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

/// A platform endpoint; `path` may contain `{name}` placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub path: &'static str,
    pub method: HttpMethod,
    pub docs_url: &'static str,
    pub description: &'static str,
}

impl EndpointDescriptor {
    pub const fn get(path: &'static str, docs_url: &'static str, description: &'static str) -> Self {
        Self { path, method: HttpMethod::Get, docs_url, description }
    }

    /// Fill `{name}` placeholders; unknown names are left untouched
    pub fn bind(&'static self, params: &[(&str, &str)]) -> RequestTarget {
        let mut path = self.path.to_string();
        for (name, value) in params {
            path = path.replace(&format!("{{{name}}}"), value);
        }
        RequestTarget { descriptor: self, path }
    }

    /// Target for a path without placeholders
    pub fn target(&'static self) -> RequestTarget {
        RequestTarget { descriptor: self, path: self.path.to_string() }
    }
}

/// A descriptor with its placeholders filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub descriptor: &'static EndpointDescriptor,
    pub path: String,
}

impl RequestTarget {
    pub fn method(&self) -> HttpMethod {
        self.descriptor.method
    }
}
