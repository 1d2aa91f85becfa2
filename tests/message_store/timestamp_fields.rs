use crate::common::*;
use chrono::{Duration, TimeZone, Utc};
use lynx::{Database, MessageStore, Timestamp, Value};
use tempfile::TempDir;

#[test]
fn present_and_absent_dates_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut message = test_message(1);
    message.date_read = Some(new_year() + Duration::seconds(30));
    message.date_delivered = None;
    message.date_edited = None;

    let id = {
        let store = MessageStore::open(dir.path()).unwrap();
        let id = store.insert_batch(vec![message.clone()]).unwrap()[0];
        store.flush().unwrap();
        id
    };

    let store = MessageStore::open(dir.path()).unwrap();
    let restored = store.get(id).unwrap();
    assert_eq!(restored.date, message.date);
    assert_eq!(restored.date_read, message.date_read);
    assert_eq!(restored.date_delivered, None);
    assert_eq!(restored.date_edited, None);

    let raw = store.get_value(id).unwrap();
    assert_eq!(
        raw.get("date_read"),
        Some(&Value::Timestamp(Timestamp::from(new_year() + Duration::seconds(30))))
    );
    assert_eq!(raw.get("date_delivered"), Some(&Value::Null));
}

#[test]
fn pre_epoch_and_far_future_dates_roundtrip() {
    let store = MessageStore::ephemeral();
    let mut old = test_message(0);
    old.date = Some(Utc.with_ymd_and_hms(1901, 12, 13, 20, 45, 52).unwrap());
    let mut future = test_message(1);
    future.date = Some(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap());

    let ids = store.insert_batch(vec![old.clone(), future.clone()]).unwrap();
    assert_eq!(store.get(ids[0]).unwrap().date, old.date);
    assert_eq!(store.get(ids[1]).unwrap().date, future.date);
}

#[test]
fn nanoseconds_are_truncated_on_store() {
    let store = MessageStore::ephemeral();
    let mut message = test_message(0);
    message.date = Some(Utc.timestamp_opt(1_704_067_200, 123_456_789).unwrap());

    let id = store.insert_batch(vec![message]).unwrap()[0];
    assert_eq!(
        store.get(id).unwrap().date,
        Some(Utc.timestamp_opt(1_704_067_200, 123_456_000).unwrap())
    );
}

#[test]
fn message_json_export_uses_microseconds() {
    let message = test_message(0);
    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["date"], serde_json::json!(1_704_067_200_000_000i64));
    assert_eq!(json["date_read"], serde_json::Value::Null);
    assert!(json.get("id").is_none());
}
