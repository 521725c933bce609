use chrono::Utc;

use crate::irc::Tags;

/// Tag carrying the time at which Twitch received the message,
/// in milliseconds since the UNIX epoch.
pub const SENT_TS_TAG: &str = "tmi-sent-ts";

const MILLIS_PER_SECOND: i64 = 1000;

/// Source of wall-clock time, in seconds since the UNIX epoch
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 { Utc::now().timestamp() }
}

/// Always returns the same time. Useful for tests and replays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 { self.0 }
}

/// Derives the timestamp (in seconds) of a message.
///
/// Uses `tmi-sent-ts` if present, floor-dividing the milliseconds.
/// Falls back to `clock` if the tag is missing or isn't a number.
pub fn timestamp(tags: &Tags, clock: &dyn Clock) -> i64 {
    match tags.get(SENT_TS_TAG) {
        Some(value) => match value.parse::<i64>() {
            Ok(millis) => millis.div_euclid(MILLIS_PER_SECOND),
            Err(err) => {
                log::warn!("Invalid {} tag '{}' ({}), using current time", SENT_TS_TAG, value, err);
                clock.now()
            }
        },
        None => clock.now(),
    }
}

/// Extracts the nick from a `nick!user@host` prefix.
///
/// A prefix without `!` is returned unchanged.
pub fn parse_user(source: &str) -> &str {
    match source.split_once('!') {
        Some((nick, _)) => nick,
        None => source,
    }
}

/// Strips everything up to and including the first `#`.
pub fn channel_name(channel: &str) -> &str {
    match channel.split_once('#') {
        Some((_, name)) => name,
        None => channel,
    }
}
