//! Consent record and decision types.
//!
//! The persisted JSON shape is `{"essential":true,"analytics":..,"ads":..,"ts":..,"v":1}`.

use serde::{Deserialize, Serialize};

/// Schema version written into every new record.
pub const SCHEMA_VERSION: u32 = 1;

/// A user's explicit choice for the optional categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConsentDecision {
    pub analytics: bool,
    pub ads: bool,
}

impl ConsentDecision {
    pub const ACCEPT_ALL: Self = Self {
        analytics: true,
        ads: true,
    };

    pub const REJECT_ALL: Self = Self {
        analytics: false,
        ads: false,
    };

    pub fn new(analytics: bool, ads: bool) -> Self {
        Self { analytics, ads }
    }
}

/// Tracking categories a record can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsentCategory {
    /// Strictly necessary cookies. Always granted.
    Essential,
    Analytics,
    Ads,
}

/// The durable consent record.
///
/// `essential` is always `true`; a stored payload claiming otherwise is
/// rejected on deserialization and therefore read back as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord", into = "StoredRecord")]
pub struct ConsentRecord {
    analytics: bool,
    ads: bool,
    timestamp: i64,
    schema_version: u32,
}

impl ConsentRecord {
    /// Build a fresh record for `decision` stamped at `timestamp` (epoch ms).
    pub fn new(decision: ConsentDecision, timestamp: i64) -> Self {
        Self {
            analytics: decision.analytics,
            ads: decision.ads,
            timestamp,
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn essential(&self) -> bool {
        true
    }

    pub fn analytics(&self) -> bool {
        self.analytics
    }

    pub fn ads(&self) -> bool {
        self.ads
    }

    /// Decision time in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn decision(&self) -> ConsentDecision {
        ConsentDecision::new(self.analytics, self.ads)
    }

    /// Whether this record grants `category`.
    pub fn allows(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::Essential => true,
            ConsentCategory::Analytics => self.analytics,
            ConsentCategory::Ads => self.ads,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored payload. Returns `None` for anything that is not a
    /// complete, well-formed record.
    pub fn from_json(source: &str) -> Option<Self> {
        match serde_json::from_str(source) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("[CDB Consent] Ignoring malformed consent record: {}", e);
                None
            }
        }
    }
}

/// Wire shape of the stored record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredRecord {
    essential: bool,
    analytics: bool,
    ads: bool,
    ts: i64,
    v: u32,
}

impl TryFrom<StoredRecord> for ConsentRecord {
    type Error = &'static str;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        if !stored.essential {
            return Err("essential consent cannot be withdrawn");
        }
        Ok(Self {
            analytics: stored.analytics,
            ads: stored.ads,
            timestamp: stored.ts,
            schema_version: stored.v,
        })
    }
}

impl From<ConsentRecord> for StoredRecord {
    fn from(record: ConsentRecord) -> Self {
        Self {
            essential: true,
            analytics: record.analytics,
            ads: record.ads,
            ts: record.timestamp,
            v: record.schema_version,
        }
    }
}
