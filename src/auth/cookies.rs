//! Netscape cookie file parser and reqwest jar loader.
//!
//! Parses the Netscape HTTP cookie file format (7 TAB-separated fields per
//! line) and loads cookies into a `reqwest::cookie::Jar` for use with the
//! RPC client. Cookie values are session credentials for the user's
//! account; they are redacted from Debug output and never logged.

use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use reqwest::cookie::Jar;
use tracing::{debug, instrument, warn};

/// A single parsed cookie.
///
/// The value field is redacted in Debug output to keep session credentials
/// out of logs and error reports.
#[derive(Clone)]
pub struct CookieRecord {
    /// The domain the cookie belongs to (e.g. `.google.com`).
    pub domain: String,
    /// Whether subdomains should match.
    pub tailmatch: bool,
    /// The URL path scope for the cookie.
    pub path: String,
    /// Whether the cookie should only be sent over HTTPS.
    pub secure: bool,
    /// Unix timestamp for expiry (0 = session cookie).
    pub expires: u64,
    /// Cookie name.
    pub name: String,
    /// Cookie value (sensitive — never log).
    value: String,
}

impl CookieRecord {
    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive — avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for CookieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieRecord")
            .field("domain", &self.domain)
            .field("tailmatch", &self.tailmatch)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("expires", &self.expires)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Errors that can occur while loading a cookie file.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// A line in the cookie file has an invalid format.
    #[error("line {line_number}: {reason}")]
    InvalidLine {
        /// 1-based line number in the cookie file.
        line_number: usize,
        /// Description of what was wrong.
        reason: String,
    },

    /// I/O error reading the cookie file.
    #[error("failed to read cookie file: {0}")]
    Io(#[from] std::io::Error),

    /// No valid cookies found in a non-empty file.
    #[error("no valid cookies found in file ({malformed_count} lines failed to parse)")]
    NoCookiesFound {
        /// Number of malformed lines encountered.
        malformed_count: usize,
    },
}

/// Result of parsing a cookie file: successfully parsed cookies plus
/// warnings for malformed lines (partial success).
#[derive(Debug)]
pub struct CookieParse {
    /// Successfully parsed cookies.
    pub cookies: Vec<CookieRecord>,
    /// Warnings for malformed lines (line number and reason).
    pub warnings: Vec<(usize, String)>,
}

/// Parses a Netscape-format cookie file from a buffered reader.
///
/// Each non-comment, non-blank line must contain exactly 7 TAB-separated
/// fields: `domain`, `tailmatch`, `path`, `secure`, `expires`, `name`,
/// `value`. Lines starting with `#` and blank lines are skipped.
///
/// # Errors
///
/// Returns [`CookieError::Io`] on read failure, or
/// [`CookieError::NoCookiesFound`] when a non-empty file yields zero valid
/// cookies. Individual malformed lines are collected as warnings.
#[instrument(level = "debug", skip(reader))]
pub fn parse_netscape_cookies(reader: impl BufRead) -> Result<CookieParse, CookieError> {
    let mut cookies = Vec::new();
    let mut warnings = Vec::new();
    let mut non_blank_lines = 0;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line_result?;
        // Handle CRLF: strip trailing \r
        let line = line.trim_end();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        non_blank_lines += 1;

        match parse_cookie_line(line, line_number) {
            Ok(cookie) => {
                debug!(
                    line = line_number,
                    domain = %cookie.domain,
                    name = %cookie.name,
                    "parsed cookie"
                );
                cookies.push(cookie);
            }
            Err(e) => {
                warn!(line = line_number, reason = %e, "skipping malformed cookie line");
                warnings.push((line_number, e.to_string()));
            }
        }
    }

    if cookies.is_empty() && non_blank_lines > 0 {
        return Err(CookieError::NoCookiesFound {
            malformed_count: warnings.len(),
        });
    }

    Ok(CookieParse { cookies, warnings })
}

/// Parses a single cookie line.
fn parse_cookie_line(line: &str, line_number: usize) -> Result<CookieRecord, CookieError> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() != 7 {
        return Err(CookieError::InvalidLine {
            line_number,
            reason: format!("expected 7 TAB-separated fields, found {}", fields.len()),
        });
    }

    let domain = fields[0].to_string();
    let tailmatch = parse_bool_field(fields[1], "tailmatch", line_number)?;
    let path = fields[2].to_string();
    let secure = parse_bool_field(fields[3], "secure", line_number)?;
    let expires = fields[4]
        .parse::<u64>()
        .map_err(|_| CookieError::InvalidLine {
            line_number,
            reason: format!("expires field must be a non-negative integer, got '{}'", fields[4]),
        })?;
    let name = fields[5].to_string();
    let value = fields[6].to_string();

    if domain.is_empty() {
        return Err(CookieError::InvalidLine {
            line_number,
            reason: "domain field is empty".to_string(),
        });
    }
    if name.is_empty() {
        return Err(CookieError::InvalidLine {
            line_number,
            reason: "cookie name field is empty".to_string(),
        });
    }

    Ok(CookieRecord {
        domain,
        tailmatch,
        path,
        secure,
        expires,
        name,
        value,
    })
}

/// Parses a `TRUE`/`FALSE` string field.
fn parse_bool_field(
    value: &str,
    field_name: &str,
    line_number: usize,
) -> Result<bool, CookieError> {
    match value {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(CookieError::InvalidLine {
            line_number,
            reason: format!("{field_name} field must be TRUE or FALSE, got '{value}'"),
        }),
    }
}

/// Loads parsed cookies into a `reqwest::cookie::Jar`.
///
/// Each record becomes a `Set-Cookie` header string added under its origin
/// URL for domain matching. Expiry is left to the remote session: the jar
/// lives for the process only, matching the session-token cache.
#[instrument(level = "debug", skip(cookies))]
pub fn load_cookies_into_jar(cookies: &[CookieRecord]) -> Arc<Jar> {
    let jar = Arc::new(Jar::default());

    for cookie in cookies {
        let mut parts = vec![format!("{}={}", cookie.name, cookie.value())];
        parts.push(format!("Domain={}", cookie.domain));
        parts.push(format!("Path={}", cookie.path));
        if cookie.secure {
            parts.push("Secure".to_string());
        }
        let set_cookie = parts.join("; ");

        let scheme = if cookie.secure { "https" } else { "http" };
        let origin = format!("{scheme}://{}/", cookie.domain.trim_start_matches('.'));

        if let Ok(url) = origin.parse::<url::Url>() {
            jar.add_cookie_str(&set_cookie, &url);
            debug!(domain = %cookie.domain, name = %cookie.name, "loaded cookie into jar");
        } else {
            warn!(domain = %cookie.domain, name = %cookie.name, "skipping cookie with unparseable domain");
        }
    }

    jar
}

/// Reads a Netscape cookie file and returns a loaded jar.
///
/// # Errors
///
/// Propagates [`CookieError`] from reading and parsing.
pub fn load_cookie_file(path: &Path) -> Result<Arc<Jar>, CookieError> {
    let file = std::fs::File::open(path)?;
    let parsed = parse_netscape_cookies(std::io::BufReader::new(file))?;
    for (line, reason) in &parsed.warnings {
        warn!(line, %reason, "cookie file line skipped");
    }
    Ok(load_cookies_into_jar(&parsed.cookies))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "# Netscape HTTP Cookie File\n\
        .google.com\tTRUE\t/\tTRUE\t1790000000\tSID\tsecret-session-value\n\
        .google.com\tTRUE\t/\tTRUE\t0\tHSID\tanother-value\n";

    #[test]
    fn test_parse_valid_file() {
        let parsed = parse_netscape_cookies(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(parsed.cookies.len(), 2);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.cookies[0].name, "SID");
        assert_eq!(parsed.cookies[0].value(), "secret-session-value");
        assert!(parsed.cookies[0].secure);
    }

    #[test]
    fn test_malformed_lines_become_warnings() {
        let input = format!("{SAMPLE}not\ta\tcookie\n");
        let parsed = parse_netscape_cookies(Cursor::new(input)).unwrap();
        assert_eq!(parsed.cookies.len(), 2);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_all_malformed_is_error() {
        let input = "garbage line one\ngarbage line two\n";
        let err = parse_netscape_cookies(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, CookieError::NoCookiesFound { malformed_count: 2 }));
    }

    #[test]
    fn test_empty_file_is_ok_and_empty() {
        let parsed = parse_netscape_cookies(Cursor::new("\n# comment only\n")).unwrap();
        assert!(parsed.cookies.is_empty());
    }

    #[test]
    fn test_bool_field_validation() {
        let input = ".google.com\tMAYBE\t/\tTRUE\t0\tSID\tv\n";
        let err = parse_netscape_cookies(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, CookieError::NoCookiesFound { .. }));
    }

    #[test]
    fn test_debug_redacts_value() {
        let parsed = parse_netscape_cookies(Cursor::new(SAMPLE)).unwrap();
        let rendered = format!("{:?}", parsed.cookies[0]);
        assert!(!rendered.contains("secret-session-value"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_error_messages_never_contain_values() {
        let input = ".google.com\tTRUE\t/\tTRUE\tnot-a-number\tSID\ttop-secret\n";
        let err = parse_netscape_cookies(Cursor::new(input)).unwrap_err();
        assert!(!err.to_string().contains("top-secret"));
    }
}
