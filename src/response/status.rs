//! Status lines and content types.

use mime_guess::mime::{self, Mime};

/// Default protocol version.
pub const HTTP_1_1: &str = "HTTP/1.1";

// 1xx Informational
/// `100 Continue`
pub const STATUS_CONTINUE: &str = "100 Continue";
/// `101 Switching Protocols`
pub const STATUS_SWITCHING_PROTOCOLS: &str = "101 Switching Protocols";
/// `102 Processing`
pub const STATUS_PROCESSING: &str = "102 Processing";

// 2xx Success
/// `200 OK`
pub const STATUS_OK: &str = "200 OK";
/// `201 Created`
pub const STATUS_CREATED: &str = "201 Created";
/// `202 Accepted`
pub const STATUS_ACCEPTED: &str = "202 Accepted";
/// `203 Non-Authoritative Information`
pub const STATUS_NON_AUTHORITATIVE_INFORMATION: &str = "203 Non-Authoritative Information";
/// `204 No Content`
pub const STATUS_NO_CONTENT: &str = "204 No Content";
/// `205 Reset Content`
pub const STATUS_RESET_CONTENT: &str = "205 Reset Content";
/// `206 Partial Content`
pub const STATUS_PARTIAL_CONTENT: &str = "206 Partial Content";

// 3xx Redirection
/// `301 Moved Permanently`
pub const STATUS_MOVED_PERMANENTLY: &str = "301 Moved Permanently";
/// `307 Temporary Redirect`
pub const STATUS_TEMPORARY_REDIRECT: &str = "307 Temporary Redirect";

// 4xx Client errors
/// `400 Bad Request`
pub const STATUS_BAD_REQUEST: &str = "400 Bad Request";
/// `401 Unauthorized`
pub const STATUS_UNAUTHORIZED: &str = "401 Unauthorized";
/// `404 Not Found`
pub const STATUS_NOT_FOUND: &str = "404 Not Found";
/// `405 Method Not Allowed`
pub const STATUS_NOT_ALLOWED: &str = "405 Method Not Allowed";
/// `406 Not Acceptable`
pub const STATUS_NOT_ACCEPTABLE: &str = "406 Not Acceptable";
/// `408 Request Timeout`
pub const STATUS_REQUEST_TIMEOUT: &str = "408 Request Timeout";
/// `413 Payload Too Large`
pub const STATUS_PAYLOAD_TOO_LARGE: &str = "413 Payload Too Large";
/// `429 Too Many Requests`
pub const STATUS_TOO_MANY_REQUESTS: &str = "429 Too Many Requests";

// 5xx Server errors
/// `500 Internal Server Error`
pub const STATUS_INTERNAL_ERROR: &str = "500 Internal Server Error";
/// `505 HTTP Version Not Supported`
pub const STATUS_HTTP_VERSION_NOT_SUPPORTED: &str = "505 HTTP Version Not Supported";

// Content types
/// `text/html`
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
/// `text/css`
pub const CONTENT_TYPE_CSS: &str = "text/css; charset=utf-8";
/// `text/javascript`
pub const CONTENT_TYPE_JAVASCRIPT: &str = "text/javascript; charset=utf-8";
/// `application/json`
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
/// `text/plain`
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
/// `application/octet-stream`
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// `Cache-Control: no-cache`
pub const CACHE_NO_CACHE: &str = "no-cache";
/// `Access-Control-Allow-Origin: *`
pub const ALLOW_ALL: &str = "*";

/// Content type for a file extension and whether the body is text.
///
/// Types come from the `mime_guess` table. Text types (`text/*`, scripts,
/// JSON and XML, including `+xml`/`+json` suffixes) get `charset=utf-8`.
/// Unknown extensions are served as binary octet streams.
pub fn content_type_for(extension: &str) -> (String, bool) {
    let mime = mime_guess::from_ext(extension).first_or_octet_stream();
    let is_text = is_text_mime(&mime);
    let content_type = if is_text && mime.get_param(mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.to_string()
    };
    (content_type, is_text)
}

fn is_text_mime(mime: &Mime) -> bool {
    mime.type_() == mime::TEXT
        || matches!(
            mime.subtype().as_str(),
            "javascript" | "ecmascript" | "json" | "xml"
        )
        || matches!(mime.suffix().map(|s| s.as_str()), Some("xml" | "json"))
}
