//! Writing Twitch IRC messages
//!
//! Functions returning a full IRC line include the trailing `\r\n`.
//! The chat command functions (`timeout`, `ban`, ...) only return the
//! message body; send it to a channel with [`privmsg`].
//!
//! Channels can be given with or without the leading `#`.

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Twitch rejects longer messages
pub const MAX_MESSAGE_LENGTH: usize = 500;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Message size limit reached: {0}/{max}", max = MAX_MESSAGE_LENGTH)]
    MessageTooLong(usize),
}

fn channel(channel: &str) -> &str { channel.trim_start_matches('#') }

pub fn join(chan: &str) -> String { format!("JOIN #{}\r\n", channel(chan)) }

pub fn part(chan: &str) -> String { format!("PART #{}\r\n", channel(chan)) }

/// `\r` is removed and every `\n` starts a new `PRIVMSG`.
///
/// Fails if any line is longer than [`MAX_MESSAGE_LENGTH`] characters.
pub fn privmsg(chan: &str, message: &str) -> Result<String, Error> {
    let chan = channel(chan);
    let message = message.replace('\r', "");
    let mut lines: Vec<&str> = message.split('\n').filter(|line| !line.is_empty()).collect();
    if lines.is_empty() {
        lines.push("");
    }

    let mut out = String::new();
    for line in lines {
        let len = line.graphemes(true).count();
        if len > MAX_MESSAGE_LENGTH {
            return Err(Error::MessageTooLong(len));
        }
        out.push_str(&format!("PRIVMSG #{} :{}\r\n", chan, line));
    }
    Ok(out)
}

pub fn pong(arg: &str) -> String { format!("PONG :{}\r\n", arg) }

pub fn cap_ls() -> String { "CAP LS 302\r\n".into() }

pub fn cap_req(capability: &str) -> String { format!("CAP REQ :{}\r\n", capability) }

/// Accepts the token with or without the `oauth:` prefix
pub fn pass(token: &str) -> String { format!("PASS oauth:{}\r\n", token.trim_start_matches("oauth:")) }

pub fn nick(login: &str) -> String { format!("NICK {}\r\n", login) }

/// `/me <message>`
pub fn action(message: &str) -> String { format!("\x01ACTION {}\x01", message) }

fn with_reason(command: String, reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!("{} {}", command, reason),
        _ => command,
    }
}

pub fn timeout(user: &str, seconds: u64, reason: Option<&str>) -> String {
    with_reason(format!(".timeout {} {}", user, seconds), reason)
}

pub fn ban(user: &str, reason: Option<&str>) -> String { with_reason(format!(".ban {}", user), reason) }

pub fn unban(user: &str) -> String { format!(".unban {}", user) }

pub fn slow(seconds: u64) -> String { format!(".slow {}", seconds) }

pub fn slow_off() -> String { ".slowoff".into() }

/// `restrict` is a duration such as `10m` or `1 week`
pub fn followers(restrict: &str) -> String { format!(".followers {}", restrict) }

pub fn followers_off() -> String { ".followersoff".into() }

pub fn subscribers() -> String { ".subscribers".into() }

pub fn subscribers_off() -> String { ".subscribersoff".into() }

pub fn clear() -> String { ".clear".into() }

pub fn r9kbeta() -> String { ".r9kbeta".into() }

pub fn r9kbeta_off() -> String { ".r9kbetaoff".into() }

pub fn emoteonly() -> String { ".emoteonly".into() }

pub fn emoteonly_off() -> String { ".emoteonlyoff".into() }

pub const DEFAULT_COMMERCIAL_LENGTH: u64 = 30;

pub fn commercial(seconds: u64) -> String { format!(".commercial {}", seconds) }

pub fn host(target: &str) -> String { format!(".host {}", channel(target)) }

pub fn unhost() -> String { ".unhost".into() }

pub fn mod_user(user: &str) -> String { format!(".mod {}", user) }

pub fn unmod_user(user: &str) -> String { format!(".unmod {}", user) }

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn irc_lines() {
        assert_eq!("JOIN #forsen\r\n", join("forsen"));
        assert_eq!("PART #forsen\r\n", part("#forsen"));
        assert_eq!("PONG :tmi.twitch.tv\r\n", pong("tmi.twitch.tv"));
        assert_eq!("PASS oauth:abc\r\n", pass("abc"));
        assert_eq!("PASS oauth:abc\r\n", pass("oauth:abc"));
        assert_eq!("NICK justinfan123\r\n", nick("justinfan123"));
        assert_eq!("CAP LS 302\r\n", cap_ls());
        assert_eq!("PRIVMSG #forsen :hi\r\n", privmsg("#forsen", "hi").unwrap());
    }

    #[test]
    fn privmsg_length_counts_graphemes() {
        let max = "é".repeat(MAX_MESSAGE_LENGTH);
        assert!(privmsg("forsen", &max).is_ok());
        assert_eq!(
            Error::MessageTooLong(MAX_MESSAGE_LENGTH + 1),
            privmsg("forsen", &format!("{}a", max)).unwrap_err()
        );
    }

    #[test]
    fn privmsg_splits_line_breaks() {
        assert_eq!(
            "PRIVMSG #forsen :.timeout u 1 x\r\nPRIVMSG #forsen :PART #forsen\r\n",
            privmsg("#forsen", &timeout("u", 1, Some("x\r\nPART #forsen"))).unwrap()
        );
        assert_eq!("PRIVMSG #forsen :ab\r\n", privmsg("forsen", "a\rb\n\n").unwrap());
        assert_eq!("PRIVMSG #forsen :\r\n", privmsg("forsen", "\r\n").unwrap());
    }

    #[test]
    fn chat_commands() {
        assert_eq!(".timeout baduser 600", timeout("baduser", 600, None));
        assert_eq!(".timeout baduser 600 spam", timeout("baduser", 600, Some("spam")));
        assert_eq!(".ban baduser", ban("baduser", Some("")));
        assert_eq!(".ban baduser spam", ban("baduser", Some("spam")));
        assert_eq!(".unban baduser", unban("baduser"));
        assert_eq!(".slow 10", slow(10));
        assert_eq!(".followers 1 week", followers("1 week"));
        assert_eq!(".commercial 30", commercial(DEFAULT_COMMERCIAL_LENGTH));
        assert_eq!(".host targetchan", host("#targetchan"));
        assert_eq!(".mod user", mod_user("user"));
        assert_eq!("\x01ACTION waves\x01", action("waves"));
    }
}
