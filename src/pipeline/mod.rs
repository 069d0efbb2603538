// Request pipeline module - per-request context carried through the proxy phases

use std::time::Instant;
use uuid::Uuid;

/// Request context that holds everything known about one request
/// as it flows through the proxy phases
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    query: Option<String>,
    rewritten_path: Option<String>,
    started_at: Instant,
}

impl RequestContext {
    /// Create a new RequestContext from HTTP request information
    /// Automatically generates a unique request ID (UUID v4) and captures the start time
    pub fn new(method: String, path: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path,
            query: None,
            rewritten_path: None,
            started_at: Instant::now(),
        }
    }

    /// Fill in the request line once the header has been read
    pub fn set_request(&mut self, method: &str, path: &str, query: Option<&str>) {
        self.method = method.to_string();
        self.path = path.to_string();
        self.query = query.map(str::to_string);
    }

    /// Get the unique request ID
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the original request path
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Record the canonical path the request is forwarded with
    pub fn set_rewritten_path(&mut self, path: String) {
        self.rewritten_path = Some(path);
    }

    pub fn rewritten_path(&self) -> Option<&str> {
        self.rewritten_path.as_deref()
    }

    /// Rewritten path plus the original query string, for the upstream request
    pub fn upstream_uri(&self) -> Option<String> {
        let path = self.rewritten_path.as_deref()?;
        Some(match self.query.as_deref() {
            Some(query) if !query.is_empty() => format!("{}?{}", path, query),
            _ => path.to_string(),
        })
    }

    /// Milliseconds since the context was created
    pub fn elapsed_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }
}
