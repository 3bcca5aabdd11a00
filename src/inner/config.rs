use cookie::{Cookie, SameSite};
use rand::Rng;
use rand::distr::Alphanumeric;
use time::Duration;

/// Default lifetime of a stored session: 30 days.
pub const DEFAULT_MAX_LIFETIME: Duration = Duration::seconds(2_592_000);

/// Sessions closer than this to expiry get their lifetime reset on read.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::days(7);

/// Cache key namespace shared by every session entry.
pub const DEFAULT_PREFIX: &str = "session/";

#[derive(Debug, Clone)]
pub enum RandKey {
    Random(usize),
    UuidV4,
    UuidV7,
    RandomSha256(usize),
}

impl RandKey {
    pub fn generate(&self) -> String {
        match self {
            RandKey::Random(len) => random_alphanumeric(*len),
            RandKey::UuidV4 => uuid::Uuid::new_v4().to_string(),
            RandKey::UuidV7 => uuid::Uuid::now_v7().to_string(),
            RandKey::RandomSha256(len) => sha256::digest(random_alphanumeric(*len).as_str()),
        }
    }
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Immutable session settings: storage lifetime, key namespace, and the
/// attributes of the cookie carrying the session id.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    name: String,
    max_lifetime: Duration,
    refresh_threshold: Duration,
    prefix: String,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
    rand_key: RandKey,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            name: "SESSIONID".to_string(),
            max_lifetime: DEFAULT_MAX_LIFETIME,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            prefix: DEFAULT_PREFIX.to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: None,
            rand_key: RandKey::UuidV7,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        SessionConfig::default()
    }
    /// Session name, also used as the cookie name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
    pub fn max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.max_lifetime = max_lifetime;
        self
    }
    pub fn refresh_threshold(mut self, refresh_threshold: Duration) -> Self {
        self.refresh_threshold = refresh_threshold;
        self
    }
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
    pub fn rand_key(mut self, rand_key: RandKey) -> Self {
        match rand_key {
            RandKey::Random(len) | RandKey::RandomSha256(len) => {
                assert!(len > 64, "len must be greater than 64");
                assert!(len < 1024, "len must be less than 1024");
            }
            RandKey::UuidV4 | RandKey::UuidV7 => {}
        }
        self.rand_key = rand_key;
        self
    }

    pub fn session_name(&self) -> &str {
        &self.name
    }
    pub fn lifetime(&self) -> Duration {
        self.max_lifetime
    }
    pub fn threshold(&self) -> Duration {
        self.refresh_threshold
    }
    pub fn key_prefix(&self) -> &str {
        &self.prefix
    }
    pub fn generate_id(&self) -> String {
        self.rand_key.generate()
    }

    /// Cookie carrying `session_id`, living as long as the stored session.
    pub fn cookie(&self, session_id: &str) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), session_id.to_string()))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .max_age(self.max_lifetime);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }
        builder.build()
    }

    /// Cookie instructing the client to drop its session id.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.cookie("");
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_thirty_day_lifetime() {
        let config = SessionConfig::default();
        assert_eq!(config.lifetime().whole_seconds(), 2_592_000);
        assert_eq!(config.threshold().whole_seconds(), 604_800);
        assert_eq!(config.key_prefix(), "session/");
        assert_eq!(config.session_name(), "SESSIONID");
    }

    #[test]
    fn random_keys_have_requested_shape() {
        assert_eq!(RandKey::Random(100).generate().len(), 100);
        assert_eq!(RandKey::RandomSha256(100).generate().len(), 64);
        assert_ne!(RandKey::UuidV7.generate(), RandKey::UuidV7.generate());
    }

    #[test]
    #[should_panic(expected = "len must be greater than 64")]
    fn short_random_key_is_rejected() {
        let _ = SessionConfig::new().rand_key(RandKey::Random(8));
    }

    #[test]
    fn cookie_carries_configured_attributes() {
        let config = SessionConfig::new()
            .name("sid")
            .domain("example.com")
            .same_site(SameSite::Lax)
            .max_lifetime(Duration::hours(1));
        let cookie = config.cookie("abc");
        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::hours(1)));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
