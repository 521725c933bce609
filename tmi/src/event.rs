//! Typed Twitch events
//!
//! Every event carries `timestamp`, in seconds since the UNIX epoch.
//! Channels are kept as sent by Twitch, including the leading `#`.

use crate::irc::Tags;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    ClearedChat(ClearedChat),
    ChannelBan(ChannelBan),
    Hosting(Hosting),
    StopHosting(StopHosting),
    Notice(Notice),
    Reconnect(Reconnect),
    RoomState(RoomState),
    UserNotice(UserNotice),
    UserState(UserState),
    Whisper(Whisper),
    ChatMessage(ChatMessage),
}

/// All messages in a channel were purged
#[derive(Clone, Debug, PartialEq)]
pub struct ClearedChat {
    pub timestamp: i64,
    pub tags: Tags,
    pub channel: String,
}

/// A user was timed out or banned
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelBan {
    pub timestamp: i64,
    pub tags: Tags,
    pub channel: String,
    pub user: String,
}

impl ChannelBan {
    /// Timeout length, `None` for a permanent ban
    pub fn duration(&self) -> Option<u64> { self.tags.get_number("ban-duration") }
}

/// `host` started hosting `hostee`
#[derive(Clone, Debug, PartialEq)]
pub struct Hosting {
    pub timestamp: i64,
    /// Channel name, without `#`
    pub host: String,
    pub hostee: String,
    pub viewers: u64,
}

/// `host` stopped hosting
#[derive(Clone, Debug, PartialEq)]
pub struct StopHosting {
    pub timestamp: i64,
    /// Channel name, without `#`
    pub host: String,
    pub viewers: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub timestamp: i64,
    pub tags: Tags,
    pub channel: String,
    pub message: String,
}

impl Notice {
    pub fn id(&self) -> Option<&str> { self.tags.get("msg-id") }
}

/// The server is about to restart; reconnect and rejoin
#[derive(Clone, Debug, PartialEq)]
pub struct Reconnect {
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomState {
    pub timestamp: i64,
    pub tags: Tags,
    pub channel: String,
}

/// Subs, resubs, raids, etc.
#[derive(Clone, Debug, PartialEq)]
pub struct UserNotice {
    pub timestamp: i64,
    pub tags: Tags,
    pub channel: String,
    /// Empty if the user did not attach a message
    pub message: String,
}

impl UserNotice {
    pub fn kind(&self) -> Option<&str> { self.tags.get("msg-id") }

    pub fn system_message(&self) -> Option<&str> { self.tags.get("system-msg") }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserState {
    pub timestamp: i64,
    pub tags: Tags,
    pub channel: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Whisper {
    pub timestamp: i64,
    pub tags: Tags,
    pub user: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub timestamp: i64,
    pub tags: Tags,
    pub channel: String,
    pub user: String,
    pub message: String,
}

const ACTION_PREFIX: &str = "\x01ACTION ";
const ACTION_SUFFIX: char = '\x01';

impl ChatMessage {
    /// Whether the message was sent with `/me`
    pub fn is_action(&self) -> bool { self.message.starts_with(ACTION_PREFIX) }

    /// The message text, without the `/me` framing
    pub fn text(&self) -> &str {
        match self.message.strip_prefix(ACTION_PREFIX) {
            Some(text) => text.strip_suffix(ACTION_SUFFIX).unwrap_or(text),
            None => &self.message,
        }
    }

    pub fn display_name(&self) -> &str { self.tags.get("display-name").unwrap_or(&self.user) }
}
