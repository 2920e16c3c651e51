use uuid::Uuid;

use crate::{
    error::{Error, Result},
    services::jwt,
};

/// Name of the access token cookie for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie security configuration
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// HttpOnly flag prevents JavaScript access (XSS protection)
    pub http_only: bool,
    /// Secure flag ensures HTTPS-only transmission (should be true in production)
    pub secure: bool,
    /// SameSite attribute for CSRF protection
    pub same_site: SameSite,
    /// Path attribute to limit cookie scope
    pub path: String,
    /// Cookie lifetime in seconds; matches the access token expiration
    pub max_age_seconds: i64,
}

/// SameSite cookie attribute for CSRF protection
#[derive(Debug, Clone, Copy)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: false, // Set to true in production
            same_site: SameSite::Lax, // Allows top-level navigations from emails, links, etc.
            path: "/".to_string(),
            max_age_seconds: 3600,
        }
    }
}

/// Extracts a JWT from either the Authorization header or a cookie.
///
/// Priority order:
/// 1. Authorization header (for API/mobile clients)
/// 2. Cookie (fallback for browser clients)
pub fn extract_jwt_token(auth_header: Option<&str>, cookie_value: Option<&str>) -> Result<String> {
    // Priority 1: Authorization header
    if let Some(header) = auth_header {
        if let Some(token) = header.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    // Priority 2: Cookie
    if let Some(cookie) = cookie_value {
        if !cookie.is_empty() {
            return Ok(cookie.to_string());
        }
    }

    Err(Error::Authentication(
        "No valid token found in Authorization header or cookie".to_string(),
    ))
}

/// Validates a JWT from header OR cookie and returns the user id.
pub fn authenticate_jwt_token_multi_source(
    auth_header: Option<&str>,
    cookie_value: Option<&str>,
    secret: &str,
) -> Result<Uuid> {
    let token = extract_jwt_token(auth_header, cookie_value)?;
    jwt::get_user_id_from_token(&token, secret)
}

/// Extracts a specific cookie value from a Cookie header.
pub fn extract_cookie_value(cookie_str: &str, cookie_name: &str) -> Option<String> {
    cookie_str
        .split(';')
        .map(|s| s.trim())
        .find(|cookie| cookie.starts_with(&format!("{}=", cookie_name)))
        .and_then(|cookie| cookie.split('=').nth(1).map(|s| s.to_string()))
}

/// Builds a Set-Cookie header value for the access token.
pub fn build_access_token_cookie(token: &str, config: &CookieConfig) -> String {
    format!(
        "{}={}{}{}; SameSite={}; Path={}; Max-Age={}",
        ACCESS_TOKEN_COOKIE,
        token,
        if config.http_only { "; HttpOnly" } else { "" },
        if config.secure { "; Secure" } else { "" },
        config.same_site.as_str(),
        config.path,
        config.max_age_seconds,
    )
}

/// Builds a Set-Cookie header value that clears the access token.
///
/// Used during logout to invalidate the cookie by setting Max-Age=0.
pub fn build_clear_cookie(config: &CookieConfig) -> String {
    format!(
        "{}={}{}{}; SameSite={}; Path={}; Max-Age=0",
        ACCESS_TOKEN_COOKIE,
        "",
        if config.http_only { "; HttpOnly" } else { "" },
        if config.secure { "; Secure" } else { "" },
        config.same_site.as_str(),
        config.path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_jwt_token_prefers_header() {
        let token = extract_jwt_token(Some("Bearer abc"), Some("def")).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_extract_jwt_token_falls_back_to_cookie() {
        let token = extract_jwt_token(None, Some("def")).unwrap();
        assert_eq!(token, "def");
        assert!(extract_jwt_token(None, None).is_err());
        assert!(extract_jwt_token(Some("Token abc"), None).is_err());
    }

    #[test]
    fn test_extract_cookie_value() {
        let cookie_str = "access_token=abc123; theme=dark";
        assert_eq!(
            extract_cookie_value(cookie_str, "access_token"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_cookie_value(cookie_str, "theme"),
            Some("dark".to_string())
        );
        assert_eq!(extract_cookie_value(cookie_str, "missing"), None);
    }

    #[test]
    fn test_build_access_token_cookie() {
        let cookie = build_access_token_cookie("tok", &CookieConfig::default());
        assert!(cookie.starts_with("access_token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_build_clear_cookie_zeroes_max_age() {
        let cookie = build_clear_cookie(&CookieConfig::default());
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.ends_with("Max-Age=0"));
    }
}
