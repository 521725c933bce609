use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tmi::event::*;
use tmi::{Handler, RawMessage};

/// Logs every event, and remembers whether Twitch asked us to reconnect.
#[derive(Default)]
pub struct ChatLogger {
    reconnect_requested: bool,
}

impl ChatLogger {
    /// Returns `true` once per RECONNECT
    pub fn take_reconnect(&mut self) -> bool { std::mem::replace(&mut self.reconnect_requested, false) }
}

pub fn format_time(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "??:??:??".into(),
    }
}

#[async_trait]
impl Handler for ChatLogger {
    async fn on_cleared_chat(&mut self, e: ClearedChat) -> Result<()> {
        log::info!("[{}] {} chat was cleared", format_time(e.timestamp), e.channel);
        Ok(())
    }

    async fn on_channel_ban(&mut self, e: ChannelBan) -> Result<()> {
        match e.duration() {
            Some(seconds) => log::info!(
                "[{}] {} {} was timed out for {}s",
                format_time(e.timestamp),
                e.channel,
                e.user,
                seconds
            ),
            None => log::info!("[{}] {} {} was banned", format_time(e.timestamp), e.channel, e.user),
        }
        Ok(())
    }

    async fn on_hosting(&mut self, e: Hosting) -> Result<()> {
        log::info!(
            "[{}] #{} is hosting {} for {} viewers",
            format_time(e.timestamp),
            e.host,
            e.hostee,
            e.viewers
        );
        Ok(())
    }

    async fn on_stop_hosting(&mut self, e: StopHosting) -> Result<()> {
        log::info!("[{}] #{} stopped hosting", format_time(e.timestamp), e.host);
        Ok(())
    }

    async fn on_notice(&mut self, e: Notice) -> Result<()> {
        log::info!(
            "[{}] {} NOTICE ({}): {}",
            format_time(e.timestamp),
            e.channel,
            e.id().unwrap_or("-"),
            e.message
        );
        Ok(())
    }

    async fn on_reconnect(&mut self, e: Reconnect) -> Result<()> {
        log::warn!("[{}] Server requested reconnect", format_time(e.timestamp));
        self.reconnect_requested = true;
        Ok(())
    }

    async fn on_roomstate(&mut self, e: RoomState) -> Result<()> {
        log::debug!("[{}] {} ROOMSTATE {:?}", format_time(e.timestamp), e.channel, *e.tags);
        Ok(())
    }

    async fn on_usernotice(&mut self, e: UserNotice) -> Result<()> {
        log::info!(
            "[{}] {} {}: {}",
            format_time(e.timestamp),
            e.channel,
            e.system_message().unwrap_or_else(|| e.kind().unwrap_or("USERNOTICE")),
            e.message
        );
        Ok(())
    }

    async fn on_userstate(&mut self, e: UserState) -> Result<()> {
        log::debug!("[{}] {} USERSTATE {:?}", format_time(e.timestamp), e.channel, *e.tags);
        Ok(())
    }

    async fn on_whisper(&mut self, e: Whisper) -> Result<()> {
        log::info!("[{}] (whisper) {}: {}", format_time(e.timestamp), e.user, e.message);
        Ok(())
    }

    async fn on_message(&mut self, e: ChatMessage) -> Result<()> {
        if e.is_action() {
            log::info!("[{}] {} * {} {}", format_time(e.timestamp), e.channel, e.display_name(), e.text());
        } else {
            log::info!("[{}] {} {}: {}", format_time(e.timestamp), e.channel, e.display_name(), e.text());
        }
        Ok(())
    }

    async fn on_unrecognized(&mut self, msg: &RawMessage) -> Result<()> {
        log::debug!("Unhandled {} {}", msg.command, msg.params.join(" "));
        Ok(())
    }
}
