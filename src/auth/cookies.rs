use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::CookieConfig;

pub const ACCESS_COOKIE: &str = "auth_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

fn session_cookie(name: &'static str, value: String, secure: bool, days: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(days))
        .build()
}

/// Adds the access and refresh cookies to `jar`.
pub fn with_session(jar: CookieJar, cfg: &CookieConfig, access: String, refresh: String) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, access, cfg.secure, cfg.access_days))
        .add(session_cookie(REFRESH_COOKIE, refresh, cfg.secure, cfg.refresh_days))
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();
    cookie.make_removal();
    cookie
}

/// Expires both session cookies, whether or not the client sent them.
pub fn without_session(jar: CookieJar) -> CookieJar {
    jar.add(removal_cookie(ACCESS_COOKIE))
        .add(removal_cookie(REFRESH_COOKIE))
}

pub fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(ACCESS_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn set_cookies(jar: CookieJar) -> Vec<String> {
        let res = (jar, "ok").into_response();
        res.headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn session_cookies_carry_attributes() {
        let cfg = CookieConfig {
            secure: true,
            access_days: 7,
            refresh_days: 30,
        };
        let headers = set_cookies(with_session(CookieJar::new(), &cfg, "a".into(), "r".into()));
        let access = headers.iter().find(|h| h.starts_with("auth_token=a")).unwrap();
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("SameSite=Strict"));
        assert!(access.contains("Secure"));
        assert!(access.contains("Path=/"));
        assert!(access.contains(&format!("Max-Age={}", 7 * 24 * 3600)));
        let refresh = headers.iter().find(|h| h.starts_with("refresh_token=r")).unwrap();
        assert!(refresh.contains(&format!("Max-Age={}", 30 * 24 * 3600)));
    }

    #[test]
    fn clearing_expires_both_cookies() {
        let mut req = axum::http::HeaderMap::new();
        req.insert(
            axum::http::header::COOKIE,
            "auth_token=a; refresh_token=r".parse().unwrap(),
        );
        let jar = CookieJar::from_headers(&req);
        assert_eq!(access_token(&jar).as_deref(), Some("a"));
        assert_eq!(refresh_token(&jar).as_deref(), Some("r"));

        let headers = set_cookies(without_session(jar));
        assert_eq!(headers.len(), 2);
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
    }
}
