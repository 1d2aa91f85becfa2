//! Exported chat message record
//!
//! One row per message. The four optional datetimes are stored as native
//! timestamps through [`lynx_core::codec::optional_datetime`]; every other
//! field is stored as its plain native value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as persisted by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned record id. `None` until inserted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Row id in the source database.
    pub rowid: i32,
    /// Globally unique message id.
    pub guid: String,
    /// Message body, if any.
    pub text: Option<String>,
    /// Delivery service (e.g. "iMessage", "SMS").
    pub service: Option<String>,
    /// Platform the export was taken on.
    pub platform: String,
    pub handle_id: Option<i32>,
    pub destination_caller_id: Option<String>,
    pub subject: Option<String>,
    /// When the message was sent.
    #[serde(with = "lynx_core::codec::optional_datetime")]
    pub date: Option<DateTime<Utc>>,
    /// When the message was read, if ever.
    #[serde(with = "lynx_core::codec::optional_datetime")]
    pub date_read: Option<DateTime<Utc>>,
    /// When the message was delivered, if known.
    #[serde(with = "lynx_core::codec::optional_datetime")]
    pub date_delivered: Option<DateTime<Utc>>,
    pub is_from_me: bool,
    pub is_read: bool,
    pub item_type: i32,
    pub other_handle: i32,
    pub share_status: bool,
    pub share_direction: bool,
    pub group_title: Option<String>,
    pub group_action_type: i32,
    pub associated_message_guid: Option<String>,
    pub associated_message_type: Option<i32>,
    pub balloon_bundle_id: Option<String>,
    pub expressive_send_style_id: Option<String>,
    pub thread_originator_guid: Option<String>,
    pub thread_originator_part: Option<String>,
    /// When the message was last edited, if ever.
    #[serde(with = "lynx_core::codec::optional_datetime")]
    pub date_edited: Option<DateTime<Utc>>,
    pub chat_id: Option<i32>,
    /// Conversation the message belongs to.
    pub unique_chat_id: String,
    pub num_attachments: i32,
    pub deleted_from: Option<i32>,
    pub num_replies: i32,
    /// Body with attachments and edits resolved.
    pub full_message: String,
    pub thread_name: Option<String>,
    pub attachment_paths: Vec<String>,
    pub is_deleted: bool,
    pub is_edited: bool,
    pub is_reply: bool,
    pub associated_message_emoji: Option<String>,
    /// Counterpart's phone number or handle.
    pub phone_number: String,
}

impl Message {
    /// Create a message with the identifying fields set and everything else
    /// empty.
    pub fn new(
        rowid: i32,
        guid: impl Into<String>,
        unique_chat_id: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            rowid,
            guid: guid.into(),
            unique_chat_id: unique_chat_id.into(),
            phone_number: phone_number.into(),
            ..Self::default()
        }
    }

    /// Returns `true` once the recipient has read the message.
    pub fn was_read(&self) -> bool {
        self.date_read.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lynx_core::{from_value, to_value, Value};

    fn sample() -> Message {
        let mut message = Message::new(1, "guid-1", "chat-1", "+10000000001");
        message.text = Some("hello".to_string());
        message.date = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        message.date_delivered = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 2).unwrap());
        message
    }

    #[test]
    fn date_fields_encode_as_native_timestamps() {
        let value = to_value(&sample()).unwrap();
        assert!(value.get("date").unwrap().is_timestamp());
        assert!(value.get("date_delivered").unwrap().is_timestamp());
        assert_eq!(value.get("date_read"), Some(&Value::Null));
        assert_eq!(value.get("date_edited"), Some(&Value::Null));
    }

    #[test]
    fn unassigned_id_is_omitted() {
        let value = to_value(&sample()).unwrap();
        assert_eq!(value.get("id"), None);

        let mut with_id = sample();
        with_id.id = Some(9);
        let value = to_value(&with_id).unwrap();
        assert_eq!(value.get("id"), Some(&Value::Int(9)));
    }

    #[test]
    fn native_roundtrip() {
        let message = sample();
        let restored: Message = from_value(to_value(&message).unwrap()).unwrap();
        assert_eq!(restored, message);
        assert!(!restored.was_read());
    }

    #[test]
    fn integer_in_date_slot_fails_to_decode() {
        let mut value = to_value(&sample()).unwrap();
        if let Value::Object(fields) = &mut value {
            fields.insert("date".to_string(), Value::Int(1_704_067_200));
        }
        let err = from_value::<Message>(value).unwrap_err();
        assert!(err.is_decoding());
    }
}
