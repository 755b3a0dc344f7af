//! Session cookie policy: one attribute set applied on every attach and clear.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Resolved attributes for one cookie write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
    pub max_age: Duration,
    pub path: String,
}

/// Per-call overrides. `None` keeps the policy default.
#[derive(Debug, Clone, Default)]
pub struct CookieOverrides {
    pub http_only: Option<bool>,
    pub same_site: Option<SameSite>,
    pub secure: Option<bool>,
    pub max_age: Option<Duration>,
    pub path: Option<String>,
}

impl CookieAttributes {
    fn merge(self, overrides: CookieOverrides) -> Self {
        Self {
            http_only: overrides.http_only.unwrap_or(self.http_only),
            same_site: overrides.same_site.unwrap_or(self.same_site),
            secure: overrides.secure.unwrap_or(self.secure),
            max_age: overrides.max_age.unwrap_or(self.max_age),
            path: overrides.path.unwrap_or(self.path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookiePolicy {
    production: bool,
    max_age: Duration,
}

impl CookiePolicy {
    /// `production` drives the `Secure` flag; `max_age` is the default lifetime.
    pub fn new(production: bool, max_age: Duration) -> Self {
        Self {
            production,
            max_age,
        }
    }

    pub fn default_attributes(&self) -> CookieAttributes {
        CookieAttributes {
            http_only: true,
            same_site: SameSite::Strict,
            secure: self.production,
            max_age: self.max_age,
            path: "/".to_string(),
        }
    }

    /// Set `name=value` on the outgoing response.
    pub fn attach(
        &self,
        jar: CookieJar,
        name: &str,
        value: impl Into<String>,
        overrides: CookieOverrides,
    ) -> CookieJar {
        let attrs = self.default_attributes().merge(overrides);
        let cookie = Cookie::build((name.to_string(), value.into()))
            .path(attrs.path)
            .http_only(attrs.http_only)
            .same_site(attrs.same_site)
            .secure(attrs.secure)
            .max_age(attrs.max_age);
        jar.add(cookie)
    }

    /// Overwrite `name` with an empty, already-expired cookie on the same path.
    pub fn clear(&self, jar: CookieJar, name: &str, overrides: CookieOverrides) -> CookieJar {
        let attrs = self.default_attributes().merge(overrides);
        let cookie = Cookie::build((name.to_string(), String::new()))
            .path(attrs.path)
            .http_only(attrs.http_only)
            .same_site(attrs.same_site)
            .secure(attrs.secure)
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH);
        jar.add(cookie)
    }

    /// Value of `name`, or `None` when absent or cleared.
    pub fn read(&self, jar: &CookieJar, name: &str) -> Option<String> {
        jar.get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};
    use axum::response::IntoResponse;

    fn policy(production: bool) -> CookiePolicy {
        CookiePolicy::new(production, Duration::minutes(15))
    }

    fn set_cookies(jar: CookieJar) -> Vec<Cookie<'static>> {
        jar.into_response()
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| Cookie::parse(v.to_str().unwrap().to_string()).unwrap())
            .collect()
    }

    /// What a browser would send back: every unexpired cookie from the response.
    fn next_request(cookies: &[Cookie<'static>]) -> CookieJar {
        let mut headers = HeaderMap::new();
        for c in cookies {
            if c.max_age() == Some(Duration::ZERO) {
                continue;
            }
            let pair = format!("{}={}", c.name(), c.value());
            headers.append(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        }
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn defaults_follow_deployment_mode() {
        let dev = policy(false).default_attributes();
        assert!(dev.http_only);
        assert_eq!(dev.same_site, SameSite::Strict);
        assert!(!dev.secure);
        assert_eq!(dev.max_age, Duration::minutes(15));
        assert!(policy(true).default_attributes().secure);
    }

    #[test]
    fn attach_then_read_on_next_request() {
        let jar = policy(true).attach(
            CookieJar::new(),
            SESSION_COOKIE,
            "abc.def.ghi",
            CookieOverrides::default(),
        );
        let cookies = set_cookies(jar);
        assert_eq!(cookies.len(), 1);
        let c = &cookies[0];
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.same_site(), Some(SameSite::Strict));
        assert_eq!(c.secure(), Some(true));
        assert_eq!(c.max_age(), Some(Duration::minutes(15)));
        assert_eq!(c.path(), Some("/"));

        let jar = next_request(&cookies);
        assert_eq!(
            policy(true).read(&jar, SESSION_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn overrides_win_per_attribute() {
        let jar = policy(false).attach(
            CookieJar::new(),
            SESSION_COOKIE,
            "v",
            CookieOverrides {
                max_age: Some(Duration::days(1)),
                same_site: Some(SameSite::Lax),
                ..Default::default()
            },
        );
        let c = &set_cookies(jar)[0];
        assert_eq!(c.max_age(), Some(Duration::days(1)));
        assert_eq!(c.same_site(), Some(SameSite::Lax));
        assert_eq!(c.http_only(), Some(true));
    }

    #[test]
    fn clear_then_read_is_absent() {
        let policy = policy(false);
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=abc"));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(policy.read(&jar, SESSION_COOKIE).as_deref(), Some("abc"));

        let jar = policy.clear(jar, SESSION_COOKIE, CookieOverrides::default());
        assert_eq!(policy.read(&jar, SESSION_COOKIE), None);

        let cookies = set_cookies(jar);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name(), SESSION_COOKIE);
        assert_eq!(cookies[0].max_age(), Some(Duration::ZERO));
        assert_eq!(cookies[0].path(), Some("/"));
        assert_eq!(policy.read(&next_request(&cookies), SESSION_COOKIE), None);
    }

    #[test]
    fn read_missing_is_absent() {
        assert_eq!(policy(false).read(&CookieJar::new(), SESSION_COOKIE), None);
    }
}
