//! Twitch capability negotiation
//!
//! Twitch only sends tags, membership events and its own commands
//! (CLEARCHAT, ROOMSTATE, USERNOTICE, ...) to clients that request them.

use std::collections::BTreeSet;
use std::fmt;

use crate::write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    /// JOIN/PART and NAMES
    Membership,
    /// IRCv3 message tags
    Tags,
    /// Twitch-specific commands
    Commands,
    /// Echo of our own PRIVMSGs. Never advertised by Twitch, so it is
    /// always requested instead of waiting for the server to offer it.
    EchoMessage,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Membership,
        Capability::Tags,
        Capability::Commands,
        Capability::EchoMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Membership => "twitch.tv/membership",
            Capability::Tags => "twitch.tv/tags",
            Capability::Commands => "twitch.tv/commands",
            Capability::EchoMessage => "echo-message",
        }
    }

    pub fn from_name(name: &str) -> Option<Capability> {
        Capability::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// The capabilities requested during the handshake.
///
/// Every [`Capability`] is always wanted. Other names are only wanted if
/// they were added with [`CapabilitySet::with_extra`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapabilitySet {
    extra: BTreeSet<String>,
}

impl CapabilitySet {
    pub fn new() -> Self { Self::default() }

    pub fn with_extra<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra.extend(names.into_iter().map(Into::into));
        self
    }

    /// Should `name` be requested?
    pub fn wants(&self, name: &str) -> bool {
        Capability::from_name(name).is_some() || self.extra.contains(name)
    }

    /// Picks the names to request out of a `CAP LS` reply.
    ///
    /// Twitch capabilities are appended even if the server did not
    /// advertise them.
    pub fn select<'a>(&'a self, advertised: &[&'a str]) -> Vec<&'a str> {
        let mut selected: Vec<&str> = advertised
            .iter()
            // `CAP LS 302` values look like `name=value`
            .map(|&cap| cap.split_once('=').map(|(name, _)| name).unwrap_or(cap))
            .filter(|name| self.wants(name))
            .collect();
        for cap in Capability::ALL.iter() {
            if !selected.contains(&cap.as_str()) {
                selected.push(cap.as_str());
            }
        }
        selected
    }

    /// One `CAP REQ` line per selected capability, so that a NAK for one
    /// of them doesn't reject the rest.
    pub fn request_lines(&self, advertised: &[&str]) -> Vec<String> {
        self.select(advertised).into_iter().map(write::cap_req).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn wants_twitch_capabilities() {
        let caps = CapabilitySet::new();
        assert!(caps.wants("twitch.tv/membership"));
        assert!(caps.wants("twitch.tv/tags"));
        assert!(caps.wants("twitch.tv/commands"));
        assert!(caps.wants("echo-message"));
    }

    #[test]
    fn unknown_capability_defers_to_extra() {
        assert!(!CapabilitySet::new().wants("unknown-thing"));
        assert!(CapabilitySet::new()
            .with_extra(vec!["unknown-thing"])
            .wants("unknown-thing"));
    }

    #[test]
    fn select_from_advertised() {
        let caps = CapabilitySet::new();
        assert_eq!(
            vec![
                "twitch.tv/tags",
                "twitch.tv/commands",
                "twitch.tv/membership",
                "echo-message"
            ],
            caps.select(&["twitch.tv/tags", "sasl=PLAIN", "twitch.tv/commands", "twitch.tv/membership"])
        );
    }

    #[test]
    fn select_extra_only_when_advertised() {
        let caps = CapabilitySet::new().with_extra(vec!["sasl", "never-sent"]);
        assert_eq!(
            vec![
                "sasl",
                "twitch.tv/membership",
                "twitch.tv/tags",
                "twitch.tv/commands",
                "echo-message"
            ],
            caps.select(&["sasl=PLAIN,EXTERNAL", "unknown-thing"])
        );
    }

    #[test]
    fn request_lines() {
        assert_eq!(
            vec![
                "CAP REQ :twitch.tv/membership\r\n",
                "CAP REQ :twitch.tv/tags\r\n",
                "CAP REQ :twitch.tv/commands\r\n",
                "CAP REQ :echo-message\r\n",
            ],
            CapabilitySet::new().request_lines(&[])
        );
    }
}
