//! Concurrent publishing against one store.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{TimeZone, Utc};
use telegraphy::{ContentService, MemoryStore};

const CONTENT: &[u8] = br#"[{"tag":"p","children":["same body"]}]"#;

#[test]
fn test_racing_publishers_get_distinct_slugs() {
    const THREADS: usize = 8;

    // a frozen clock makes every thread start from the same candidate
    let service = Arc::new(
        ContentService::new().with_clock(|| Utc.with_ymd_and_hms(2024, 5, 12, 12, 34, 56).unwrap()),
    );
    let store = Arc::new(MemoryStore::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let service = Arc::clone(&service);
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.publish(&*store, "Same Title", CONTENT).unwrap().slug
            })
        })
        .collect();

    let slugs: HashSet<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(slugs.len(), THREADS);
    assert_eq!(store.len(), THREADS);
    assert!(slugs.contains("same-title-5-12-184"));
    for attempt in 2..=THREADS {
        assert!(slugs.contains(&format!("same-title-5-12-184-{attempt}")));
    }
}

#[test]
fn test_codec_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ContentService>();
    assert_send_sync::<MemoryStore>();
    assert_send_sync::<telegraphy::Node>();
}
