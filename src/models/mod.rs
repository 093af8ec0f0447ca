use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog entry: a school's display name and its logo locator.
///
/// Loaded once at startup and immutable for the process lifetime. Names are
/// unique by convention; the loader does not enforce uniqueness, and the
/// resolver treats the first/best match as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct School {
    pub name: String,
    /// Logo locator. Absolute once the catalog loader has resolved relative
    /// paths against the configured asset base URL.
    pub logo_url: String,
}

/// A cached generated page, addressed by its canonical key.
///
/// At most one entry exists per key; writes are full overwrites and entries
/// are never physically deleted. Staleness is decided at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchoolPage {
    /// Canonical display name of the school (denormalized for auditability).
    pub name: String,
    /// The generated artifact body, stored and served verbatim.
    pub html: String,
    pub created_at: DateTime<Utc>,
    /// Absent under the no-expiry cache policy.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SchoolPage {
    /// Whether this entry is still servable at `now`.
    ///
    /// An entry without an expiry never goes stale. Expiry is exclusive: an
    /// entry expiring exactly at `now` is already stale.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn page(expires_at: Option<DateTime<Utc>>) -> SchoolPage {
        SchoolPage {
            name: "Churchill High School".to_string(),
            html: "<!DOCTYPE html><html></html>".to_string(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn page_without_expiry_is_always_fresh() {
        let now = Utc::now();
        assert!(page(None).is_fresh(now));
        assert!(page(None).is_fresh(now + Duration::days(3650)));
    }

    #[test]
    fn freshness_boundary_is_exclusive() {
        let now = Utc::now();
        assert!(!page(Some(now - Duration::milliseconds(1))).is_fresh(now));
        assert!(!page(Some(now)).is_fresh(now));
        assert!(page(Some(now + Duration::milliseconds(1))).is_fresh(now));
    }
}
