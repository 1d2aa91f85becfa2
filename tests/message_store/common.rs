//! Shared helpers for the message store suite.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use lynx::Message;

pub fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// A message with unique identifiers and a sent date `i` minutes after new year.
pub fn test_message(i: usize) -> Message {
    let mut message = Message::new(
        i as i32,
        format!("test-guid-{}", i),
        format!("chat-{}", i % 4),
        format!("+1{:010}", i),
    );
    message.text = Some(format!("Test message {}", i));
    message.service = Some("iMessage".to_string());
    message.chat_id = Some(1000 + i as i32);
    message.full_message = format!("Test message {}", i);
    message.is_from_me = i % 2 == 0;
    message.is_read = true;
    message.date = Some(new_year() + Duration::minutes(i as i64));
    message
}
