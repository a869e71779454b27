use anyhow::Context;
use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// First value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(cfg: &SessionConfig, token: &str) -> anyhow::Result<HeaderValue> {
    build(cfg, token, cfg.ttl().whole_seconds())
}

/// Cookie that makes the browser drop the session immediately.
pub fn expired_cookie(cfg: &SessionConfig) -> anyhow::Result<HeaderValue> {
    build(cfg, "", 0)
}

fn build(cfg: &SessionConfig, value: &str, max_age: i64) -> anyhow::Result<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cfg.cookie_name, value, max_age
    );
    if cfg.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).context("build Set-Cookie header")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for v in values {
            map.append(header::COOKIE, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let h = headers(&["theme=dark; session=abc123; lang=en"]);
        assert_eq!(read_cookie(&h, "session"), Some("abc123"));
        assert_eq!(read_cookie(&h, "lang"), Some("en"));
        assert_eq!(read_cookie(&h, "missing"), None);
    }

    #[test]
    fn reads_across_multiple_cookie_headers() {
        let h = headers(&["theme=dark", "session=xyz"]);
        assert_eq!(read_cookie(&h, "session"), Some("xyz"));
    }

    #[test]
    fn empty_value_is_absent() {
        let h = headers(&["session="]);
        assert_eq!(read_cookie(&h, "session"), None);
    }

    #[test]
    fn does_not_match_on_prefix() {
        let h = headers(&["session_old=nope"]);
        assert_eq!(read_cookie(&h, "session"), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let mut cfg = AppConfig::for_tests().session;
        let v = session_cookie(&cfg, "tok").unwrap();
        assert_eq!(
            v.to_str().unwrap(),
            "session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=300"
        );

        cfg.secure = true;
        let v = expired_cookie(&cfg).unwrap();
        assert_eq!(
            v.to_str().unwrap(),
            "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
        );
    }
}
