use std::collections::HashMap;
use std::ops::Deref;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Empty message")]
    Empty,
    #[error("Missing command")]
    MissingCommand,
    #[error("Unterminated tags")]
    UnterminatedTags,
}

pub type Result<T> = std::result::Result<T, Error>;

/// One tokenized IRC line.
///
/// Nothing here is interpreted yet; see [`crate::dispatch`] for that.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMessage {
    pub command: String,
    pub params: Vec<String>,
    pub tags: Tags,
    /// The raw prefix, e.g. `nick!user@host`. Empty if the line had none.
    pub source: String,
}

impl RawMessage {
    /// Parse a raw IRC line
    ///
    /// `[@tags ][:source ]COMMAND[ param0 param1 ... [:trailing param]]`
    ///
    /// A trailing `\r\n` is ignored.
    pub fn parse(line: &str) -> Result<RawMessage> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.trim().is_empty() {
            return Err(Error::Empty);
        }

        let (tags, remainder) = match line.strip_prefix('@') {
            Some(rest) => match rest.split_once(' ') {
                Some((tags, rest)) => (Tags::parse(tags), rest),
                None => return Err(Error::UnterminatedTags),
            },
            None => (Tags::default(), line),
        };
        let (source, remainder) = parse_source(remainder);
        let (command, remainder) = parse_command(remainder)?;
        let params = parse_params(remainder);

        Ok(RawMessage {
            command: command.into(),
            params,
            tags,
            source: source.into(),
        })
    }

    /// Returns the param at `index`, or an empty string if there isn't one.
    pub fn param(&self, index: usize) -> &str {
        self.params.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Returns (source, remainder)
fn parse_source(data: &str) -> (&str, &str) {
    let data = data.trim_start_matches(' ');
    match data.strip_prefix(':') {
        Some(rest) => match rest.split_once(' ') {
            Some((source, rest)) => (source, rest),
            None => (rest, ""),
        },
        None => ("", data),
    }
}

/// Returns (command, remainder)
fn parse_command(data: &str) -> Result<(&str, &str)> {
    let data = data.trim_start_matches(' ');
    let (cmd, remainder) = match data.split_once(' ') {
        Some(v) => v,
        None => (data, ""),
    };
    if cmd.is_empty() {
        return Err(Error::MissingCommand);
    }
    Ok((cmd, remainder))
}

/// Parse a params list
///
/// Valid form: `param0 param1 :trailing param`
fn parse_params(data: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut remainder = data;
    loop {
        remainder = remainder.trim_start_matches(' ');
        if remainder.is_empty() {
            break;
        }
        if let Some(trailing) = remainder.strip_prefix(':') {
            params.push(trailing.to_string());
            break;
        }
        match remainder.split_once(' ') {
            Some((param, rest)) => {
                params.push(param.to_string());
                remainder = rest;
            }
            None => {
                params.push(remainder.to_string());
                break;
            }
        }
    }
    params
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tags(HashMap<String, String>);

impl Deref for Tags {
    type Target = HashMap<String, String>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<HashMap<String, String>> for Tags {
    fn from(map: HashMap<String, String>) -> Self {
        Tags(map)
    }
}

impl<K: Into<String>, V: Into<String>> std::iter::FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Tags {
    /// Parses IRC tags in the form
    ///
    /// `key0=[value0];key1=[value1];...;keyN=[valueN]`
    ///
    /// `[value]`s are optional, and unescaped according to IRCv3.
    pub fn parse(data: &str) -> Tags {
        let mut map = HashMap::new();
        for tag in data.split(';').filter(|t| !t.is_empty()) {
            let (key, value) = match tag.split_once('=') {
                Some((key, value)) => (key, unescape(value)),
                None => (tag, String::new()),
            };
            map.insert(key.to_string(), value);
        }
        Tags(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parses a number
    pub fn get_number<N>(&self, key: &str) -> Option<N>
    where
        N: std::str::FromStr,
    {
        self.get(key).and_then(|v| v.parse::<N>().ok())
    }

}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            // a lone trailing backslash is dropped
            None => (),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_ping_without_source() {
        assert_eq!(
            RawMessage {
                command: "PING".into(),
                params: strings(&["tmi.twitch.tv"]),
                tags: Tags::default(),
                source: "".into(),
            },
            RawMessage::parse("PING :tmi.twitch.tv\r\n").unwrap()
        );
    }

    #[test]
    fn parse_join() {
        assert_eq!(
            RawMessage {
                command: "JOIN".into(),
                params: strings(&["#channel"]),
                tags: Tags::default(),
                source: "test!test@test.tmi.twitch.tv".into(),
            },
            RawMessage::parse(":test!test@test.tmi.twitch.tv JOIN #channel").unwrap()
        );
    }

    #[test]
    fn parse_full_privmsg() {
        let src = "\
            @badge-info=;\
            badges=;\
            color=#0000FF;\
            display-name=JuN1oRRRR;\
            emotes=;\
            id=e9d998c3-36f1-430f-89ec-6b887c28af36;\
            mod=0;\
            room-id=11148817;\
            tmi-sent-ts=1594545155039;\
            user-id=29803735 \
            :jun1orrrr!jun1orrrr@jun1orrrr.tmi.twitch.tv PRIVMSG #pajlada :dank cam\
        ";
        let msg = RawMessage::parse(src).unwrap();
        assert_eq!("PRIVMSG", msg.command);
        assert_eq!(strings(&["#pajlada", "dank cam"]), msg.params);
        assert_eq!("jun1orrrr!jun1orrrr@jun1orrrr.tmi.twitch.tv", msg.source);
        assert_eq!(Some("JuN1oRRRR"), msg.tags.get("display-name"));
        assert_eq!(Some(""), msg.tags.get("badges"));
        assert_eq!(Some(1594545155039i64), msg.tags.get_number("tmi-sent-ts"));
        assert_eq!(Some("0"), msg.tags.get("mod"));
        assert_eq!(10, msg.tags.len());
    }

    #[test]
    fn parse_host_target_trailing_keeps_spaces() {
        let msg = RawMessage::parse(":tmi.twitch.tv HOSTTARGET #host :targetchan 42").unwrap();
        assert_eq!(strings(&["#host", "targetchan 42"]), msg.params);
    }

    #[test]
    fn parse_numeric() {
        let msg = RawMessage::parse(":tmi.twitch.tv 421 justinfan123 WHOIS :Unknown command").unwrap();
        assert_eq!("421", msg.command);
        assert_eq!(strings(&["justinfan123", "WHOIS", "Unknown command"]), msg.params);
    }

    #[test]
    fn parse_escaped_tag_values() {
        let msg = RawMessage::parse(
            "@system-msg=5\\sraiders\\sfrom\\sx;note=a\\:b\\\\c :tmi.twitch.tv USERNOTICE #channel",
        )
        .unwrap();
        assert_eq!(Some("5 raiders from x"), msg.tags.get("system-msg"));
        assert_eq!(Some("a;b\\c"), msg.tags.get("note"));
        assert_eq!("", msg.param(1));
    }

    #[test]
    fn parse_tag_without_value() {
        let tags = Tags::parse("first-msg;emote-only=1");
        assert_eq!(Some(""), tags.get("first-msg"));
        assert_eq!(Some(1u8), tags.get_number("emote-only"));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Error::Empty, RawMessage::parse("\r\n").unwrap_err());
        assert_eq!(Error::UnterminatedTags, RawMessage::parse("@a=b;c=d").unwrap_err());
        assert_eq!(Error::MissingCommand, RawMessage::parse(":tmi.twitch.tv ").unwrap_err());
    }
}
