//! Property: write is mirrored
//!
//! For any decision `{analytics, ads}`, after `write` the durable record
//! holds `essential = true` plus both flags, and the two mirror cookies read
//! `"true"`/`"false"` to match.

use std::sync::Arc;

use cdb_consent::{
    ConsentConfig, ConsentDecision, ConsentStore, CookieJar, DurableStore, FixedClock,
    MemoryStorage, MirroredFlags, SideChannel,
};
use proptest::prelude::*;

fn flag(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

proptest! {
    #[test]
    fn write_is_read_back_and_mirrored(
        analytics in any::<bool>(),
        ads in any::<bool>(),
        now in 0i64..4_102_444_800_000,
    ) {
        let clock = Arc::new(FixedClock::from_millis(now));
        let store = ConsentStore::new(
            ConsentConfig::default(),
            MemoryStorage::new("https://coupdebordure.fr"),
            CookieJar::new(clock.clone()),
        )
        .unwrap()
        .with_clock(clock);

        store.write(ConsentDecision::new(analytics, ads)).unwrap();

        let record = store.get().unwrap();
        prop_assert!(record.essential());
        prop_assert_eq!(record.analytics(), analytics);
        prop_assert_eq!(record.ads(), ads);
        prop_assert_eq!(record.timestamp(), now);

        let cookies = store.cookies();
        let analytics_cookie = cookies.cookie("cdb_analytics");
        let ads_cookie = cookies.cookie("cdb_ads");
        prop_assert_eq!(analytics_cookie.as_deref(), Some(flag(analytics)));
        prop_assert_eq!(ads_cookie.as_deref(), Some(flag(ads)));

        let server = MirroredFlags::from_cookie_header(store.config(), &cookies.header());
        prop_assert_eq!(server, MirroredFlags { ads, analytics });
    }

    #[test]
    fn reset_after_any_write_is_undecided(analytics in any::<bool>(), ads in any::<bool>()) {
        let clock = Arc::new(FixedClock::from_millis(1_700_000_000_000));
        let store = ConsentStore::new(
            ConsentConfig::default(),
            MemoryStorage::new("https://coupdebordure.fr"),
            CookieJar::new(clock),
        )
        .unwrap();

        store.write(ConsentDecision::new(analytics, ads)).unwrap();
        store.reset().unwrap();

        prop_assert_eq!(store.get(), None);
        let ads_cookie = store.cookies().cookie("cdb_ads");
        let analytics_cookie = store.cookies().cookie("cdb_analytics");
        prop_assert_eq!(ads_cookie.as_deref(), Some("false"));
        prop_assert_eq!(analytics_cookie.as_deref(), Some("false"));
    }

    #[test]
    fn arbitrary_stored_text_never_panics(raw in ".{0,64}") {
        let clock = Arc::new(FixedClock::from_millis(0));
        let store = ConsentStore::new(
            ConsentConfig::default(),
            MemoryStorage::new("https://coupdebordure.fr"),
            CookieJar::new(clock),
        )
        .unwrap();
        store.storage().set_item("cdb_cookie_consent_v1", &raw).unwrap();

        // Either a valid record or absent; reading must not fail.
        let _ = store.initialize();
    }
}
