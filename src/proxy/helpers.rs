//! Proxy utility functions.
//!
//! This module contains helper functions for request processing:
//! - Client IP detection (X-Forwarded-For aware)
//! - Writing a complete response to a Pingora session
//! - Mapping header errors into Pingora errors

use pingora_core::Result;
use pingora_http::ResponseHeader;
use pingora_proxy::Session;

use super::special_endpoints::EndpointResponse;

/// Extract client IP address from session (X-Forwarded-For aware).
///
/// The header can contain multiple IPs: `"client, proxy1, proxy2"`.
/// The first IP is the original client, which is what we return.
pub fn get_client_ip(session: &Session) -> String {
    if let Some(forwarded_for) = session
        .req_header()
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(client_ip) = first_forwarded_ip(forwarded_for) {
            return client_ip.to_string();
        }
    }

    // Fall back to direct connection IP
    session
        .client_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// First non-empty entry of an X-Forwarded-For value
pub fn first_forwarded_ip(forwarded_for: &str) -> Option<&str> {
    forwarded_for
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
}

/// Write a complete response (header and body) and end the stream
pub async fn write_endpoint_response(
    session: &mut Session,
    response: EndpointResponse,
    request_id: &str,
) -> Result<()> {
    let mut header = ResponseHeader::build(response.status, None)?;
    header.insert_header("Content-Type", response.content_type)?;
    header.insert_header("Content-Length", response.body.len().to_string())?;
    header.insert_header("X-Request-ID", request_id)?;

    session
        .write_response_header(Box::new(header), false)
        .await?;
    session
        .write_response_body(Some(response.body.into()), true)
        .await?;

    Ok(())
}

/// Wrap a message in an internal Pingora error
pub fn internal_error(message: impl Into<String>) -> Box<pingora_core::Error> {
    pingora_core::Error::explain(pingora_core::ErrorType::InternalError, message.into())
}
