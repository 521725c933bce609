//! Classifies [`RawMessage`]s into typed [`Event`]s and hands them to a
//! [`Handler`].
//!
//! Messages must be dispatched one at a time, in the order they were
//! received. [`Dispatcher::dispatch`] borrows the dispatcher mutably for
//! the whole handler call, so a connection loop can't accidentally
//! interleave two messages.

use anyhow::Result;

use crate::event::*;
use crate::handler::Handler;
use crate::irc::RawMessage;
use crate::util::{self, Clock, SystemClock};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command<'a> {
    /// Purge a user's messages, or the whole chat
    Clearchat,
    /// Channel starts or stops host mode
    HostTarget,
    /// Rejoins channels after a restart
    Reconnect,
    /// Identifies the channel's chat settings
    RoomState,
    /// Announces Twitch-specific events to the channel
    UserNotice,
    /// Identifies a user's chat settings or properties
    UserState,
    /// Message from a single user
    Whisper,
    /// General notices from the server
    Notice,
    /// Twitch Private Message
    Privmsg,
    /// `004`
    MyInfo,
    /// `421`
    UnknownCommand,
    /// Unknown command
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(cmd: &'a str) -> Command<'a> {
        match cmd {
            "CLEARCHAT" => Command::Clearchat,
            "HOSTTARGET" => Command::HostTarget,
            "RECONNECT" => Command::Reconnect,
            "ROOMSTATE" => Command::RoomState,
            "USERNOTICE" => Command::UserNotice,
            "USERSTATE" => Command::UserState,
            "WHISPER" => Command::Whisper,
            "NOTICE" => Command::Notice,
            "PRIVMSG" => Command::Privmsg,
            "004" => Command::MyInfo,
            "421" => Command::UnknownCommand,
            other => Command::Unknown(other),
        }
    }
}

/// Where a message goes
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Event(Event),
    MyInfo,
    UnknownCommand,
    Unrecognized,
}

pub struct Dispatcher<H, C = SystemClock> {
    handler: H,
    clock: C,
}

impl<H: Handler> Dispatcher<H> {
    pub fn new(handler: H) -> Self { Dispatcher::with_clock(handler, SystemClock) }
}

impl<H: Handler, C: Clock> Dispatcher<H, C> {
    pub fn with_clock(handler: H, clock: C) -> Self { Dispatcher { handler, clock } }

    pub fn handler(&self) -> &H { &self.handler }

    pub fn handler_mut(&mut self) -> &mut H { &mut self.handler }

    pub fn into_handler(self) -> H { self.handler }

    /// Classifies `msg` without calling the handler.
    pub fn route(&self, msg: &RawMessage) -> Route {
        let timestamp = util::timestamp(&msg.tags, &self.clock);
        let event = match Command::parse(&msg.command) {
            Command::Clearchat => clear_chat(timestamp, msg),
            Command::HostTarget => host_target(timestamp, msg),
            Command::Reconnect => Event::Reconnect(Reconnect { timestamp }),
            Command::RoomState => Event::RoomState(RoomState {
                timestamp,
                tags: msg.tags.clone(),
                channel: msg.param(0).into(),
            }),
            Command::UserNotice => Event::UserNotice(UserNotice {
                timestamp,
                tags: msg.tags.clone(),
                channel: msg.param(0).into(),
                message: msg.param(1).into(),
            }),
            Command::UserState => Event::UserState(UserState {
                timestamp,
                tags: msg.tags.clone(),
                channel: msg.param(0).into(),
            }),
            Command::Whisper => Event::Whisper(Whisper {
                timestamp,
                tags: msg.tags.clone(),
                user: util::parse_user(&msg.source).into(),
                message: msg.param(1).into(),
            }),
            Command::Notice => Event::Notice(Notice {
                timestamp,
                tags: msg.tags.clone(),
                channel: msg.param(0).into(),
                message: msg.param(1).into(),
            }),
            Command::Privmsg => Event::ChatMessage(ChatMessage {
                timestamp,
                tags: msg.tags.clone(),
                channel: msg.param(0).into(),
                user: util::parse_user(&msg.source).into(),
                message: msg.param(1).into(),
            }),
            Command::MyInfo => return Route::MyInfo,
            Command::UnknownCommand => return Route::UnknownCommand,
            Command::Unknown(_) => return Route::Unrecognized,
        };
        Route::Event(event)
    }

    /// Classifies `msg` and calls the matching handler method.
    ///
    /// Only handler errors are returned; malformed input never fails.
    pub async fn dispatch(&mut self, msg: &RawMessage) -> Result<()> {
        let route = self.route(msg);
        log::trace!("{} -> {:?}", msg.command, route);
        match route {
            Route::Event(event) => self.handler.on_event(event).await,
            Route::MyInfo => self.handler.on_my_info(msg).await,
            Route::UnknownCommand => self.handler.on_unknown_command(msg).await,
            Route::Unrecognized => self.handler.on_unrecognized(msg).await,
        }
    }
}

fn clear_chat(timestamp: i64, msg: &RawMessage) -> Event {
    let channel = msg.param(0).to_string();
    match msg.params.get(1) {
        Some(user) => Event::ChannelBan(ChannelBan {
            timestamp,
            tags: msg.tags.clone(),
            channel,
            user: user.clone(),
        }),
        None => Event::ClearedChat(ClearedChat {
            timestamp,
            tags: msg.tags.clone(),
            channel,
        }),
    }
}

/// `HOSTTARGET #host :<hostee|-> [<viewers|->]`
fn host_target(timestamp: i64, msg: &RawMessage) -> Event {
    let host = util::channel_name(msg.param(0)).to_string();
    let mut target = msg.param(1).split_whitespace();
    let hostee = target.next().unwrap_or("-");
    let viewers = target.next().and_then(|v| v.parse().ok()).unwrap_or(0);

    if hostee == "-" {
        Event::StopHosting(StopHosting {
            timestamp,
            host,
            viewers,
        })
    } else {
        Event::Hosting(Hosting {
            timestamp,
            host,
            hostee: hostee.into(),
            viewers,
        })
    }
}
