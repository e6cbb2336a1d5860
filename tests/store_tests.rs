mod common;

use common::{connect_store, new_record};
use zonekeeper::ZoneError;
use zonekeeper::config::ZoneConfig;
use zonekeeper::model::RecordPatch;
use zonekeeper::zone::{SoaContent, ZoneStore};

/// Read the current zone serial out of the domain's SOA record
async fn soa_serial(store: &ZoneStore, domain: &str) -> u32 {
    let records = store.list_records(domain).await.unwrap();
    let soa = records
        .iter()
        .find(|r| r.rtype == "SOA")
        .expect("domain has an SOA record");
    SoaContent::parse(&soa.content).unwrap().serial
}

#[tokio::test]
async fn test_create_domain_seeds_soa() {
    let store = connect_store().await;

    let domain = store.create_domain("example.com").await.unwrap();
    assert_eq!(domain.name, "example.com");

    let records = store.list_records("example.com").await.unwrap();
    assert_eq!(records.len(), 1);

    let soa = &records[0];
    assert_eq!(soa.rtype, "SOA");
    assert_eq!(soa.name, "example.com");
    assert_eq!(soa.ttl, 3600);
    assert!(!soa.can_edit);

    let content = SoaContent::parse(&soa.content).unwrap();
    assert_eq!(content.serial, 1);
    assert_eq!(content.mname, "ns.localhost.local");
}

#[tokio::test]
async fn test_create_domain_conflict() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();

    assert!(matches!(
        store.create_domain("example.com").await,
        Err(ZoneError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_list_domains() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();
    store.create_domain("other.org").await.unwrap();

    let domains = store.list_domains().await.unwrap();
    let names: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["example.com", "other.org"]);
}

#[tokio::test]
async fn test_create_record_bumps_serial() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();
    assert_eq!(soa_serial(&store, "example.com").await, 1);

    let record = store
        .create_record("example.com", &new_record("www.example.com", "A", "192.0.2.1"))
        .await
        .unwrap();
    assert_eq!(record.ttl, 300); // default TTL applied
    assert!(record.can_edit);
    assert_eq!(soa_serial(&store, "example.com").await, 2);

    store
        .create_record(
            "example.com",
            &new_record("mail.example.com", "AAAA", "2001:db8::1"),
        )
        .await
        .unwrap();
    assert_eq!(soa_serial(&store, "example.com").await, 3);
}

#[tokio::test]
async fn test_create_record_missing_domain() {
    let store = connect_store().await;
    assert!(matches!(
        store
            .create_record("nope.com", &new_record("www.nope.com", "A", "192.0.2.1"))
            .await,
        Err(ZoneError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_create_record_outside_domain() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();

    assert!(matches!(
        store
            .create_record("example.com", &new_record("www.other.org", "A", "192.0.2.1"))
            .await,
        Err(ZoneError::InvalidInput(_))
    ));

    // Suffix match must respect label boundaries
    assert!(matches!(
        store
            .create_record(
                "example.com",
                &new_record("notexample.com", "A", "192.0.2.1")
            )
            .await,
        Err(ZoneError::InvalidInput(_))
    ));

    // The apex itself is fine
    store
        .create_record("example.com", &new_record("example.com", "A", "192.0.2.1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_record_type_policy() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();

    // MX is a known type but not in the default allowed set
    assert!(matches!(
        store
            .create_record("example.com", &new_record("example.com", "MX", "mail"))
            .await,
        Err(ZoneError::PolicyViolation(_))
    ));

    // SOA is locked and never caller-creatable
    assert!(matches!(
        store
            .create_record("example.com", &new_record("example.com", "SOA", "x y 1 2 3 4"))
            .await,
        Err(ZoneError::PolicyViolation(_))
    ));

    // Unknown types are rejected the same way
    assert!(matches!(
        store
            .create_record("example.com", &new_record("example.com", "BOGUS", "x"))
            .await,
        Err(ZoneError::PolicyViolation(_))
    ));

    // Policy failures never bump the serial
    assert_eq!(soa_serial(&store, "example.com").await, 1);
}

#[tokio::test]
async fn test_create_record_conflict() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();
    store
        .create_record("example.com", &new_record("www.example.com", "A", "192.0.2.1"))
        .await
        .unwrap();

    assert!(matches!(
        store
            .create_record("example.com", &new_record("www.example.com", "A", "192.0.2.2"))
            .await,
        Err(ZoneError::Conflict(_))
    ));

    // Same name under a different type is a distinct record
    store
        .create_record("example.com", &new_record("www.example.com", "TXT", "hello"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_record_partial() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();
    let record = store
        .create_record(
            "example.com",
            &zonekeeper::model::NewRecord {
                name: "srv.example.com".to_string(),
                content: "target.example.com".to_string(),
                rtype: "SRV".to_string(),
                ttl: Some(600),
                priority: Some(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(soa_serial(&store, "example.com").await, 2);

    // Only content provided: ttl and priority stay untouched
    let updated = store
        .update_record(
            "example.com",
            record.id,
            &RecordPatch {
                content: Some("other.example.com".to_string()),
                ..RecordPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.content, "other.example.com");
    assert_eq!(updated.ttl, 600);
    assert_eq!(updated.priority, Some(10));
    assert_eq!(soa_serial(&store, "example.com").await, 3);

    // Re-read reflects exactly the merged state
    let records = store.list_records("example.com").await.unwrap();
    let stored = records.iter().find(|r| r.id == record.id).unwrap();
    assert_eq!(stored.content, "other.example.com");
    assert_eq!(stored.ttl, 600);
    assert_eq!(stored.priority, Some(10));

    // Explicit zero TTL is applied, not ignored
    let updated = store
        .update_record(
            "example.com",
            record.id,
            &RecordPatch {
                ttl: Some(0),
                ..RecordPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.ttl, 0);

    // Explicit null priority clears it
    let updated = store
        .update_record(
            "example.com",
            record.id,
            &RecordPatch {
                priority: Some(None),
                ..RecordPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.priority, None);
    assert_eq!(soa_serial(&store, "example.com").await, 5);
}

#[tokio::test]
async fn test_update_record_not_found() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();
    store.create_domain("other.org").await.unwrap();
    let record = store
        .create_record("example.com", &new_record("www.example.com", "A", "192.0.2.1"))
        .await
        .unwrap();

    assert!(matches!(
        store
            .update_record("example.com", record.id + 100, &RecordPatch::default())
            .await,
        Err(ZoneError::NotFound(_))
    ));

    // Record IDs are scoped to their domain
    assert!(matches!(
        store
            .update_record("other.org", record.id, &RecordPatch::default())
            .await,
        Err(ZoneError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_locked_record_immutable() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();

    let records = store.list_records("example.com").await.unwrap();
    let soa_id = records[0].id;

    assert!(matches!(
        store
            .update_record(
                "example.com",
                soa_id,
                &RecordPatch {
                    content: Some("tampered".to_string()),
                    ..RecordPatch::default()
                },
            )
            .await,
        Err(ZoneError::PolicyViolation(_))
    ));

    assert!(matches!(
        store.delete_record("example.com", soa_id).await,
        Err(ZoneError::PolicyViolation(_))
    ));

    // Denied mutations leave the serial alone
    assert_eq!(soa_serial(&store, "example.com").await, 1);
}

#[tokio::test]
async fn test_delete_record_bumps_serial() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();
    let record = store
        .create_record("example.com", &new_record("www.example.com", "A", "192.0.2.1"))
        .await
        .unwrap();
    assert_eq!(soa_serial(&store, "example.com").await, 2);

    store.delete_record("example.com", record.id).await.unwrap();
    assert_eq!(soa_serial(&store, "example.com").await, 3);

    let records = store.list_records("example.com").await.unwrap();
    assert!(records.iter().all(|r| r.id != record.id));

    assert!(matches!(
        store.delete_record("example.com", record.id).await,
        Err(ZoneError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_domain_cascades() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();
    store
        .create_record("example.com", &new_record("www.example.com", "A", "192.0.2.1"))
        .await
        .unwrap();

    store.delete_domain("example.com").await.unwrap();

    assert!(matches!(
        store.list_records("example.com").await,
        Err(ZoneError::NotFound(_))
    ));
    assert!(store.list_domains().await.unwrap().is_empty());

    assert!(matches!(
        store.delete_domain("example.com").await,
        Err(ZoneError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_missing_soa_is_corrupt_state() {
    let store = connect_store().await;
    store.create_domain("example.com").await.unwrap();

    // Break the invariant behind the store's back
    sqlx::query("DELETE FROM records WHERE type = 'SOA'")
        .execute(store.pool())
        .await
        .unwrap();

    assert!(matches!(
        store
            .create_record("example.com", &new_record("www.example.com", "A", "192.0.2.1"))
            .await,
        Err(ZoneError::CorruptState(_))
    ));
}

#[tokio::test]
async fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = ZoneConfig {
        database_url: format!("sqlite:{}", dir.path().join("zones.db").display()),
        ..ZoneConfig::default()
    };

    {
        let store = ZoneStore::connect(&config).await.unwrap();
        store.create_domain("example.com").await.unwrap();
    }

    // Reconnect (migrate runs again, idempotently) and read the data back
    let store = ZoneStore::connect(&config).await.unwrap();
    let domains = store.list_domains().await.unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].name, "example.com");
    assert_eq!(soa_serial(&store, "example.com").await, 1);
}
