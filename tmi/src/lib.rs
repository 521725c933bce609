//! Twitch chat protocol adapter
//!
//! * [`irc`](./irc) - tokenizing raw IRC lines, with Twitch-specific extensions
//!   (not RFC2812 compliant)
//! * [`dispatch`](./dispatch) - classifying Twitch commands (PRIVMSG,
//!   ROOMSTATE, USERNOTICE, etc.) into typed events
//! * [`handler`](./handler) - the trait applications implement to receive
//!   events
//! * [`caps`](./caps) - Twitch capability negotiation
//! * [`write`](./write) - writing Twitch IRC messages and chat commands
//! * [`conn`](./conn) - TMI connection utility

pub mod caps;
pub mod conn;
pub mod dispatch;
pub mod event;
pub mod handler;
pub mod irc;
pub mod util;
pub mod write;

pub use caps::{Capability, CapabilitySet};
pub use conn::connect;
pub use conn::Config;
pub use conn::Connection;
pub use conn::Login;
pub use dispatch::Dispatcher;
pub use event::Event;
pub use handler::Handler;
pub use irc::{RawMessage, Tags};
pub use util::{Clock, FixedClock, SystemClock};
