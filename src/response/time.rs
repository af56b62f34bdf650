//! HTTP-date formatting.

use chrono::{DateTime, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an RFC 7231 HTTP-date.
///
/// # Example
///
/// ```
/// use chrono::DateTime;
/// use virtual_serve::response::http_date;
///
/// let epoch = DateTime::from_timestamp(0, 0).unwrap();
/// assert_eq!(http_date(epoch), "Thu, 01 Jan 1970 00:00:00 GMT");
/// ```
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// The current time as an HTTP-date.
pub fn http_date_now() -> String {
    http_date(Utc::now())
}

/// The Unix epoch, used to expire cookies.
pub fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_date() {
        let time = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(http_date(time), "Tue, 14 Nov 2023 22:13:20 GMT");
    }

    #[test]
    fn test_epoch() {
        assert_eq!(http_date(epoch()), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_now_is_gmt() {
        assert!(http_date_now().ends_with(" GMT"));
    }
}
