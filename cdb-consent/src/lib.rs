//! Cookie Consent Synchronizer
//!
//! Keeps the user's cookie-consent decision in a durable origin-scoped
//! store, mirrors it into two cookies for the server, and broadcasts a
//! change event to in-process listeners.
//!
//! The durable record is the only source of truth. The cookie mirror is a
//! projection that is rebuilt on every initialization and every write.

pub mod clock;
pub mod config;
pub mod cookies;
pub mod error;
pub mod events;
pub mod record;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ConsentConfig;
pub use cookies::{mirror_cookies, Cookie, CookieJar, MirroredFlags, SameSite, SideChannel};
pub use error::{ConfigError, ConsentError, StorageError};
pub use events::{ConsentEvent, ConsentEvents, ListenerId, CONSENT_EVENT};
pub use record::{ConsentCategory, ConsentDecision, ConsentRecord, SCHEMA_VERSION};
pub use storage::{DurableStore, JsonFileStorage, MemoryStorage};
pub use store::ConsentStore;
