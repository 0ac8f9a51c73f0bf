//! Cookie Side Channel
//!
//! The consent mirror read by the server: two `"true"`/`"false"` cookies.
//! [`mirror_cookies`] is the projection from flags to cookie writes; it is
//! pure, so rewriting the mirror any number of times converges on the same
//! state.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use spin::RwLock;

use crate::clock::Clock;
use crate::config::ConsentConfig;

// ── Types ───────────────────────────────────────────────────

/// Cross-site scope of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A cookie write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: Duration,
    pub same_site: SameSite,
}

impl Cookie {
    /// Whether this write deletes the cookie instead of storing it.
    pub fn is_removal(&self) -> bool {
        self.max_age <= Duration::zero()
    }
}

impl fmt::Display for Cookie {
    /// `Set-Cookie` style rendering, e.g.
    /// `cdb_ads=true; Path=/; Max-Age=15552000; SameSite=Lax`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age.num_seconds(),
            self.same_site
        )
    }
}

/// Receiver of cookie writes, readable back by name.
pub trait SideChannel: Send + Sync {
    fn set_cookie(&self, cookie: &Cookie);

    /// Current value of a live cookie.
    fn cookie(&self, name: &str) -> Option<String>;
}

// ── Projection ──────────────────────────────────────────────

fn flag_value(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}

/// Project consent flags into the two mirror cookie writes (ads first).
pub fn mirror_cookies(config: &ConsentConfig, analytics: bool, ads: bool) -> [Cookie; 2] {
    let cookie = |name: &str, flag: bool| Cookie {
        name: name.to_string(),
        value: flag_value(flag).to_string(),
        path: config.cookie_path.clone(),
        max_age: config.cookie_max_age(),
        same_site: config.same_site,
    };
    [
        cookie(&config.ads_cookie, ads),
        cookie(&config.analytics_cookie, analytics),
    ]
}

// ── CookieJar ───────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    path: String,
    same_site: SameSite,
    expires_at: DateTime<Utc>,
}

/// In-memory cookie jar honouring `Max-Age` against a clock.
pub struct CookieJar {
    clock: Arc<dyn Clock>,
    cookies: RwLock<BTreeMap<String, StoredCookie>>,
}

impl CookieJar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            cookies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Expiry instant of a live cookie.
    pub fn expires_at(&self, name: &str) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.cookies
            .read()
            .get(name)
            .filter(|c| c.expires_at > now)
            .map(|c| c.expires_at)
    }

    /// Path scope of a live cookie.
    pub fn path(&self, name: &str) -> Option<String> {
        let now = self.clock.now();
        self.cookies
            .read()
            .get(name)
            .filter(|c| c.expires_at > now)
            .map(|c| c.path.clone())
    }

    pub fn same_site(&self, name: &str) -> Option<SameSite> {
        let now = self.clock.now();
        self.cookies
            .read()
            .get(name)
            .filter(|c| c.expires_at > now)
            .map(|c| c.same_site)
    }

    /// Request `Cookie` header for all live cookies.
    pub fn header(&self) -> String {
        let now = self.clock.now();
        self.cookies
            .read()
            .iter()
            .filter(|(_, c)| c.expires_at > now)
            .map(|(name, c)| format!("{}={}", name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Drop every cookie, as a user clearing site data would.
    pub fn clear(&self) {
        self.cookies.write().clear();
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("cookies", &*self.cookies.read())
            .finish()
    }
}

impl SideChannel for CookieJar {
    fn set_cookie(&self, cookie: &Cookie) {
        let mut cookies = self.cookies.write();
        if cookie.is_removal() {
            cookies.remove(&cookie.name);
            return;
        }
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(cookie.max_age)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        cookies.insert(
            cookie.name.clone(),
            StoredCookie {
                value: cookie.value.clone(),
                path: cookie.path.clone(),
                same_site: cookie.same_site,
                expires_at,
            },
        );
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let now = self.clock.now();
        self.cookies
            .read()
            .get(name)
            .filter(|c| c.expires_at > now)
            .map(|c| c.value.clone())
    }
}

// ── Server view ─────────────────────────────────────────────

/// The flags as the server sees them: granted only on an exact `"true"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MirroredFlags {
    pub ads: bool,
    pub analytics: bool,
}

impl MirroredFlags {
    /// Read the flags from a request `Cookie` header.
    pub fn from_cookie_header(config: &ConsentConfig, header: &str) -> Self {
        let mut flags = Self::default();
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let granted = value.trim() == "true";
            if name.trim() == config.ads_cookie {
                flags.ads = granted;
            } else if name.trim() == config.analytics_cookie {
                flags.analytics = granted;
            }
        }
        flags
    }

    /// Read the flags directly from a side channel.
    pub fn read(config: &ConsentConfig, channel: &dyn SideChannel) -> Self {
        Self {
            ads: channel.cookie(&config.ads_cookie).as_deref() == Some("true"),
            analytics: channel.cookie(&config.analytics_cookie).as_deref() == Some("true"),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────
