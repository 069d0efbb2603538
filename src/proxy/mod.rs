// Proxy module - Pingora ProxyHttp implementation
// Canonicalizes and re-signs image request paths before forwarding them upstream

use async_trait::async_trait;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_http::{RequestHeader, ResponseHeader};
use pingora_proxy::{ProxyHttp, Session};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, UpstreamAddress};
use crate::metrics::RewriteMetrics;
use crate::options::OptionRegistry;
use crate::pipeline::RequestContext;
use crate::rewrite::{RewriteResponse, Rewriter};
use crate::store::ConfigStore;

pub mod helpers;
pub mod special_endpoints;

use helpers::{get_client_ip, internal_error, write_endpoint_response};
use special_endpoints::{
    handle_forbidden, handle_health, handle_metrics, HEALTH_PATH, METRICS_PATH,
};

/// EdgeProxy implements the Pingora ProxyHttp trait
/// Rewrites every image request to its canonical signed form
pub struct EdgeProxy {
    rewriter: Rewriter,
    store: Arc<dyn ConfigStore>,
    config_key: String,
    upstream: UpstreamAddress,
    upstream_timeout: Duration,
    /// Proxy start time (for uptime calculation in /health endpoint)
    start_time: Instant,
}

impl EdgeProxy {
    /// Create a new EdgeProxy from configuration and a configuration store
    pub fn new(config: &Config, store: Arc<dyn ConfigStore>) -> Result<Self> {
        let upstream = config.upstream.address().ok_or_else(|| {
            internal_error(format!(
                "Invalid upstream endpoint '{}'",
                config.upstream.endpoint
            ))
        })?;
        let registry = Arc::new(OptionRegistry::new(config.options.extended));

        tracing::info!(
            upstream_host = %upstream.host,
            upstream_port = upstream.port,
            extended_options = config.options.extended,
            options = registry.len(),
            "Edge proxy initialized"
        );

        Ok(Self {
            rewriter: Rewriter::new(registry),
            store,
            config_key: config.store.config_key.clone(),
            upstream,
            upstream_timeout: Duration::from_secs(config.upstream.timeout),
            start_time: Instant::now(),
        })
    }

    pub fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    /// Host header value for upstream requests
    fn upstream_host(&self) -> String {
        let default_port = if self.upstream.use_tls { 443 } else { 80 };
        if self.upstream.port == default_port {
            self.upstream.host.clone()
        } else {
            format!("{}:{}", self.upstream.host, self.upstream.port)
        }
    }
}

#[async_trait]
impl ProxyHttp for EdgeProxy {
    type CTX = RequestContext;

    /// Create a new request context for each incoming request
    fn new_ctx(&self) -> Self::CTX {
        RequestContext::new("GET".to_string(), "/".to_string())
    }

    /// The image backend is the single upstream
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        let mut peer = Box::new(HttpPeer::new(
            (self.upstream.host.clone(), self.upstream.port),
            self.upstream.use_tls,
            self.upstream.host.clone(),
        ));

        peer.options.connection_timeout = Some(self.upstream_timeout);
        peer.options.read_timeout = Some(self.upstream_timeout);
        peer.options.write_timeout = Some(self.upstream_timeout);

        tracing::debug!(
            request_id = %ctx.request_id(),
            host = %self.upstream.host,
            port = self.upstream.port,
            "Selected upstream peer"
        );

        Ok(peer)
    }

    /// Serve built-in endpoints, then rewrite or reject the request
    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        let req = session.req_header();
        let method = req.method.to_string();
        let path = req.uri.path().to_string();
        let query = req.uri.query().map(str::to_string);
        ctx.set_request(&method, &path, query.as_deref());

        if path == HEALTH_PATH {
            write_endpoint_response(session, handle_health(self.start_time), ctx.request_id())
                .await?;
            return Ok(true);
        }

        if path == METRICS_PATH {
            write_endpoint_response(
                session,
                handle_metrics(RewriteMetrics::global()),
                ctx.request_id(),
            )
            .await?;
            return Ok(true);
        }

        match self
            .rewriter
            .handle(self.store.as_ref(), &self.config_key, &path)
            .await
        {
            RewriteResponse::Rewrite { path: rewritten } => {
                ctx.set_rewritten_path(rewritten);
                Ok(false)
            }
            RewriteResponse::Forbidden { status, message } => {
                tracing::info!(
                    request_id = %ctx.request_id(),
                    client_ip = %get_client_ip(session),
                    path = %path,
                    reason = %message,
                    "Request forbidden"
                );
                write_endpoint_response(
                    session,
                    handle_forbidden(status, &message),
                    ctx.request_id(),
                )
                .await?;
                Ok(true)
            }
        }
    }

    /// Point the upstream request at the canonical path
    async fn upstream_request_filter(
        &self,
        _session: &mut Session,
        upstream_request: &mut RequestHeader,
        ctx: &mut Self::CTX,
    ) -> Result<()> {
        let uri = ctx
            .upstream_uri()
            .ok_or_else(|| internal_error("No rewritten path in context"))?;

        let parsed_uri = uri.parse().map_err(|e: http::uri::InvalidUri| {
            internal_error(format!("Invalid rewritten URI: {}", e))
        })?;
        upstream_request.set_uri(parsed_uri);

        upstream_request.remove_header(&http::header::HOST);
        upstream_request
            .append_header(
                http::header::HOST,
                http::header::HeaderValue::from_str(&self.upstream_host())
                    .map_err(|e| internal_error(format!("Invalid host header: {}", e)))?,
            )
            .map_err(|e| internal_error(format!("Failed to set Host header: {}", e)))?;

        upstream_request
            .insert_header("X-Request-ID", ctx.request_id())
            .map_err(|e| internal_error(format!("Failed to add X-Request-ID header: {}", e)))?;

        Ok(())
    }

    /// Log request completion
    async fn logging(
        &self,
        session: &mut Session,
        e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status_code = if let Some(resp) = session.response_written() {
            resp.status.as_u16()
        } else {
            500 // Default to 500 if no response written
        };

        if let Some(error) = e {
            tracing::warn!(
                request_id = %ctx.request_id(),
                path = %ctx.path(),
                error = %error,
                "Proxy error"
            );
        }

        tracing::info!(
            request_id = %ctx.request_id(),
            client_ip = %get_client_ip(session),
            method = %ctx.method(),
            path = %ctx.path(),
            rewritten_path = ctx.rewritten_path().unwrap_or("-"),
            status_code = status_code,
            duration_ms = ctx.elapsed_ms(),
            "Request completed"
        );
    }

    /// Filter upstream responses to add custom headers (request correlation)
    fn upstream_response_filter(
        &self,
        _session: &mut Session,
        upstream_response: &mut ResponseHeader,
        ctx: &mut Self::CTX,
    ) -> Result<()> {
        upstream_response
            .insert_header("X-Request-ID", ctx.request_id())
            .map_err(|e| {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    error = ?e,
                    "Failed to add X-Request-ID header"
                );
                e
            })?;

        Ok(())
    }
}
