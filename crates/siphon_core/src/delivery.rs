//! Delivery targets, message pointers and buttons.

use serde::{Deserialize, Serialize};

/// Chat a result is delivered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatTarget {
    /// Chat identifier
    pub chat_id: i64,
    /// Message to reply to, if any
    pub reply_to: Option<i64>,
}

/// Inline query being answered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InlineQuery {
    /// Transport identifier of the query
    pub query_id: String,
}

/// Callback whose message gets edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackTarget {
    /// Transport identifier of the callback
    pub callback_id: String,
}

/// Location of one delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessagePointer {
    /// Chat holding the message
    pub chat_id: i64,
    /// Message identifier within the chat
    pub message_id: i64,
    /// True when the message heads a media group
    pub is_group: bool,
}

impl MessagePointer {
    /// Pointer to a standalone message.
    pub fn single(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
            is_group: false,
        }
    }
}

/// What a delivery strategy sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    /// One message
    Message(MessagePointer),
    /// One media group
    Group(Vec<MessagePointer>),
    /// Content text trailing media; re-sent on replay, never copied
    Caption(MessagePointer),
    /// Several sends in order
    Batch(Vec<Delivered>),
}

impl Delivered {
    /// Collapse into the pointer form recorded for replay.
    ///
    /// Trailing captions are left out: replay sends the content text itself.
    ///
    /// ```
    /// use siphon_core::{Delivered, DeliveredMessagePointer, MessagePointer};
    ///
    /// let group = Delivered::Group(vec![
    ///     MessagePointer::single(1, 10),
    ///     MessagePointer::single(1, 11),
    /// ]);
    /// let pointer = group.pointer().unwrap();
    /// assert_eq!(
    ///     pointer,
    ///     DeliveredMessagePointer::One(MessagePointer { chat_id: 1, message_id: 10, is_group: true })
    /// );
    /// ```
    pub fn pointer(&self) -> Option<DeliveredMessagePointer> {
        match self {
            Delivered::Batch(parts) => {
                let pointers: Vec<_> = parts.iter().filter_map(Delivered::head).collect();
                (!pointers.is_empty()).then_some(DeliveredMessagePointer::Many(pointers))
            }
            other => other.head().map(DeliveredMessagePointer::One),
        }
    }

    fn head(&self) -> Option<MessagePointer> {
        match self {
            Delivered::Message(pointer) => Some(*pointer),
            Delivered::Group(messages) => messages.first().map(|first| MessagePointer {
                is_group: true,
                ..*first
            }),
            Delivered::Caption(_) => None,
            Delivered::Batch(parts) => parts.iter().find_map(Delivered::head),
        }
    }
}

/// Recorded delivery used to replay instead of re-uploading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveredMessagePointer {
    /// A single message or media group
    One(MessagePointer),
    /// Several messages replayed in order
    Many(Vec<MessagePointer>),
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    /// Opens a URL
    Link {
        /// Button text
        label: String,
        /// Target URL
        url: String,
    },
    /// Sends callback data back to the bot
    Callback {
        /// Button text
        label: String,
        /// Opaque payload
        data: String,
    },
}

/// Keyboard attached to a delivered message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    /// Buttons in display order
    pub buttons: Vec<Button>,
}
