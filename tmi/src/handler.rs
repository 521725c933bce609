use anyhow::Result;
use async_trait::async_trait;

use crate::event::*;
use crate::irc::RawMessage;

/// Receives events from a [`Dispatcher`](crate::Dispatcher).
///
/// Every method defaults to doing nothing, so implementors only override
/// what they care about. Errors returned from a handler are passed back
/// to the caller of [`Dispatcher::dispatch`](crate::Dispatcher::dispatch)
/// as-is.
///
/// ```ignore
/// struct Printer;
///
/// #[async_trait]
/// impl Handler for Printer {
///     async fn on_message(&mut self, msg: ChatMessage) -> anyhow::Result<()> {
///         println!("{} {}: {}", msg.channel, msg.user, msg.text());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send {
    /// Called for every typed event. The default implementation forwards
    /// to the per-event methods below; overriding it bypasses them.
    async fn on_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::ClearedChat(e) => self.on_cleared_chat(e).await,
            Event::ChannelBan(e) => self.on_channel_ban(e).await,
            Event::Hosting(e) => self.on_hosting(e).await,
            Event::StopHosting(e) => self.on_stop_hosting(e).await,
            Event::Notice(e) => self.on_notice(e).await,
            Event::Reconnect(e) => self.on_reconnect(e).await,
            Event::RoomState(e) => self.on_roomstate(e).await,
            Event::UserNotice(e) => self.on_usernotice(e).await,
            Event::UserState(e) => self.on_userstate(e).await,
            Event::Whisper(e) => self.on_whisper(e).await,
            Event::ChatMessage(e) => self.on_message(e).await,
        }
    }

    async fn on_cleared_chat(&mut self, _event: ClearedChat) -> Result<()> { Ok(()) }

    async fn on_channel_ban(&mut self, _event: ChannelBan) -> Result<()> { Ok(()) }

    async fn on_hosting(&mut self, _event: Hosting) -> Result<()> { Ok(()) }

    async fn on_stop_hosting(&mut self, _event: StopHosting) -> Result<()> { Ok(()) }

    async fn on_notice(&mut self, _event: Notice) -> Result<()> { Ok(()) }

    async fn on_reconnect(&mut self, _event: Reconnect) -> Result<()> { Ok(()) }

    async fn on_roomstate(&mut self, _event: RoomState) -> Result<()> { Ok(()) }

    async fn on_usernotice(&mut self, _event: UserNotice) -> Result<()> { Ok(()) }

    async fn on_userstate(&mut self, _event: UserState) -> Result<()> { Ok(()) }

    async fn on_whisper(&mut self, _event: Whisper) -> Result<()> { Ok(()) }

    async fn on_message(&mut self, _event: ChatMessage) -> Result<()> { Ok(()) }

    /// `004` (RPL_MYINFO). Twitch's version of it doesn't follow RFC2812,
    /// so it is dropped by default.
    async fn on_my_info(&mut self, _msg: &RawMessage) -> Result<()> { Ok(()) }

    /// `421` (ERR_UNKNOWNCOMMAND). Twitch doesn't support WHO/WHOIS, so
    /// failures of those are dropped; anything else goes to
    /// [`Handler::on_unrecognized`].
    async fn on_unknown_command(&mut self, msg: &RawMessage) -> Result<()> {
        match msg.param(1) {
            "WHO" | "WHOIS" => Ok(()),
            _ => self.on_unrecognized(msg).await,
        }
    }

    /// Anything that isn't a Twitch event
    async fn on_unrecognized(&mut self, _msg: &RawMessage) -> Result<()> { Ok(()) }
}
