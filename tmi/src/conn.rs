//! Twitch chat connection
//!
//! * TLS connection to `irc.chat.twitch.tv`
//! * Capability handshake and authentication
//! * Ordered, line-based reading of [`RawMessage`]s
//! * Sending IRC commands and Twitch chat commands
//!
//! Answering PING, reconnecting, and rate limiting are left to the caller.
use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use thiserror::Error;
use tokio::{
    io::{split, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf},
    net::TcpStream,
};
use tokio_rustls::client::TlsStream;
use tokio_stream::wrappers::LinesStream;

use crate::{
    caps::CapabilitySet,
    irc::{self, RawMessage},
    write,
};

const TMI_URL_HOST: &str = "irc.chat.twitch.tv";
const TMI_TLS_PORT: u16 = 6697;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq)]
pub enum Login {
    Anonymous,
    Regular { login: String, token: String },
}

impl Default for Login {
    fn default() -> Self { Login::Anonymous }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub credentials: Login,
    pub capabilities: CapabilitySet,
    /// Applies to both the TLS connection and the handshake
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            credentials: Login::default(),
            capabilities: CapabilitySet::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Encountered an I/O error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Encountered an error while parsing: {0}")]
    Parse(#[from] irc::Error),
    #[error("Failed to write message: {0}")]
    Write(#[from] write::Error),
    #[error(transparent)]
    Generic(#[from] anyhow::Error),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Cannot whisper to '{0}', whispers are not supported")]
    WhisperUnsupported(String),
    #[error("Timed out")]
    Timeout,
    #[error("Stream closed")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

async fn connect_tls(host: &str, port: u16) -> Result<TlsStream<TcpStream>> {
    use tokio_rustls::{rustls::ClientConfig, webpki::DNSNameRef, TlsConnector};

    let mut config = ClientConfig::new();
    config.root_store = match rustls_native_certs::load_native_certs() {
        Ok(store) => store,
        Err((Some(partial), err)) => {
            log::warn!("Some native certificates could not be loaded: {}", err);
            partial
        }
        Err((None, err)) => return Err(err.into()),
    };
    let config = TlsConnector::from(Arc::new(config));
    let dnsname = DNSNameRef::try_from_ascii_str(host).map_err(|err| anyhow::anyhow!(err))?;
    let stream = TcpStream::connect((host, port)).await?;
    let out = config.connect(dnsname, stream).await?;

    Ok(out)
}

/// Connects to Twitch over TLS and performs the handshake.
pub async fn connect(config: Config) -> Result<Connection> {
    let stream = tokio::time::timeout(config.connect_timeout, connect_tls(TMI_URL_HOST, TMI_TLS_PORT))
        .await
        .or(Err(Error::Timeout))??;
    Connection::handshake(stream, &config).await
}

pub struct Reader<R> {
    stream: LinesStream<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> Reader<R> {
    pub fn new(read: R) -> Self {
        Reader {
            stream: LinesStream::new(BufReader::new(read).lines()),
        }
    }

    pub async fn next_line(&mut self) -> Result<String> {
        if let Some(line) = self.stream.next().await {
            Ok(line?)
        } else {
            Err(Error::StreamClosed)
        }
    }

    /// Next message, in the order they were received.
    ///
    /// Lines which fail to parse are logged and skipped.
    pub async fn next(&mut self) -> Result<RawMessage> {
        loop {
            let line = self.next_line().await?;
            match RawMessage::parse(&line) {
                Ok(message) => return Ok(message),
                Err(irc::Error::Empty) => continue,
                Err(err) => log::warn!("Skipping malformed line '{}': {}", line, err),
            }
        }
    }
}

pub struct Sender<W> {
    stream: W,
}

impl<W: AsyncWrite + Unpin> Sender<W> {
    pub fn new(write: W) -> Self { Sender { stream: write } }

    /// Sends a raw line. `message` should end with `\r\n`.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        if message.starts_with("PASS ") {
            log::debug!("< PASS oauth:<token>");
        } else {
            log::debug!("< {}", message.trim_end());
        }
        self.stream.write_all(message.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn join(&mut self, channel: &str) -> Result<()> { self.send(&write::join(channel)).await }

    pub async fn part(&mut self, channel: &str) -> Result<()> { self.send(&write::part(channel)).await }

    pub async fn pong(&mut self, arg: &str) -> Result<()> { self.send(&write::pong(arg)).await }

    pub async fn privmsg(&mut self, channel: &str, message: &str) -> Result<()> {
        let line = write::privmsg(channel, message)?;
        self.send(&line).await
    }

    /// Sends to a `#channel`. Anything else would be a whisper, which
    /// Twitch no longer accepts over IRC.
    pub async fn message(&mut self, target: &str, message: &str) -> Result<()> {
        if target.starts_with('#') {
            self.privmsg(target, message).await
        } else {
            Err(Error::WhisperUnsupported(target.into()))
        }
    }

    /// `/me <message>`
    pub async fn action(&mut self, target: &str, message: &str) -> Result<()> {
        self.message(target, &write::action(message)).await
    }

    pub async fn timeout(&mut self, channel: &str, user: &str, seconds: u64, reason: Option<&str>) -> Result<()> {
        self.privmsg(channel, &write::timeout(user, seconds, reason)).await
    }

    pub async fn ban(&mut self, channel: &str, user: &str, reason: Option<&str>) -> Result<()> {
        self.privmsg(channel, &write::ban(user, reason)).await
    }

    pub async fn unban(&mut self, channel: &str, user: &str) -> Result<()> {
        self.privmsg(channel, &write::unban(user)).await
    }

    pub async fn slow(&mut self, channel: &str, seconds: u64) -> Result<()> {
        self.privmsg(channel, &write::slow(seconds)).await
    }

    pub async fn slow_off(&mut self, channel: &str) -> Result<()> { self.privmsg(channel, &write::slow_off()).await }

    pub async fn followers(&mut self, channel: &str, restrict: &str) -> Result<()> {
        self.privmsg(channel, &write::followers(restrict)).await
    }

    pub async fn followers_off(&mut self, channel: &str) -> Result<()> {
        self.privmsg(channel, &write::followers_off()).await
    }

    pub async fn subscribers(&mut self, channel: &str) -> Result<()> {
        self.privmsg(channel, &write::subscribers()).await
    }

    pub async fn subscribers_off(&mut self, channel: &str) -> Result<()> {
        self.privmsg(channel, &write::subscribers_off()).await
    }

    pub async fn clear(&mut self, channel: &str) -> Result<()> { self.privmsg(channel, &write::clear()).await }

    pub async fn r9kbeta(&mut self, channel: &str) -> Result<()> { self.privmsg(channel, &write::r9kbeta()).await }

    pub async fn r9kbeta_off(&mut self, channel: &str) -> Result<()> {
        self.privmsg(channel, &write::r9kbeta_off()).await
    }

    pub async fn emoteonly(&mut self, channel: &str) -> Result<()> { self.privmsg(channel, &write::emoteonly()).await }

    pub async fn emoteonly_off(&mut self, channel: &str) -> Result<()> {
        self.privmsg(channel, &write::emoteonly_off()).await
    }

    /// `seconds` defaults to [`write::DEFAULT_COMMERCIAL_LENGTH`]
    pub async fn commercial(&mut self, channel: &str, seconds: Option<u64>) -> Result<()> {
        let seconds = seconds.unwrap_or(write::DEFAULT_COMMERCIAL_LENGTH);
        self.privmsg(channel, &write::commercial(seconds)).await
    }

    pub async fn host(&mut self, channel: &str, target: &str) -> Result<()> {
        self.privmsg(channel, &write::host(target)).await
    }

    pub async fn unhost(&mut self, channel: &str) -> Result<()> { self.privmsg(channel, &write::unhost()).await }

    pub async fn mod_user(&mut self, channel: &str, user: &str) -> Result<()> {
        self.privmsg(channel, &write::mod_user(user)).await
    }

    pub async fn unmod_user(&mut self, channel: &str, user: &str) -> Result<()> {
        self.privmsg(channel, &write::unmod_user(user)).await
    }
}

pub struct Connection<S = TlsStream<TcpStream>> {
    pub reader: Reader<ReadHalf<S>>,
    pub sender: Sender<WriteHalf<S>>,
    capabilities: Vec<String>,
}

impl<S: AsyncRead + AsyncWrite> Connection<S> {
    /// Requests capabilities, logs in, and waits for `001`.
    pub async fn handshake(stream: S, config: &Config) -> Result<Connection<S>> {
        tokio::time::timeout(config.connect_timeout, Self::register(stream, config))
            .await
            .or(Err(Error::Timeout))?
    }

    async fn register(stream: S, config: &Config) -> Result<Connection<S>> {
        let (read, write) = split(stream);
        let mut reader = Reader::new(read);
        let mut sender = Sender::new(write);

        // 1. request capabilities
        // < CAP LS 302
        // > :tmi.twitch.tv CAP * LS :twitch.tv/tags twitch.tv/commands twitch.tv/membership
        // < CAP REQ :twitch.tv/membership
        // < CAP REQ :twitch.tv/tags
        // ...
        sender.send(&write::cap_ls()).await?;
        let advertised = list_capabilities(&mut reader).await?;
        let advertised: Vec<&str> = advertised.split_whitespace().collect();
        for line in config.capabilities.request_lines(&advertised) {
            sender.send(&line).await?;
        }
        // 2. authenticate
        match &config.credentials {
            Login::Anonymous => {
                use rand::Rng;
                // don't need PASS here
                let login = format!("justinfan{}", rand::thread_rng().gen_range(10000..99999));
                sender.send(&write::nick(&login)).await?;
            }
            Login::Regular { login, token } => {
                sender.send(&write::pass(token)).await?;
                sender.send(&write::nick(login)).await?;
            }
        }
        // 3. wait for CAP * ACK/NAK and the `001` welcome
        let mut capabilities = Vec::new();
        loop {
            let message = reader.next().await?;
            log::debug!("> {} {}", message.command, message.params.join(" "));
            match message.command.as_str() {
                "CAP" => match message.param(1) {
                    "ACK" => capabilities.extend(message.param(2).split_whitespace().map(String::from)),
                    "NAK" => log::warn!("Capability rejected: {}", message.param(2)),
                    _ => (),
                },
                // sent to `*` before login, e.g. "Login authentication failed"
                "NOTICE" if message.param(0) == "*" => {
                    return Err(Error::AuthenticationFailed(message.param(1).into()));
                }
                "001" => break,
                _ => (),
            }
        }
        log::info!("Connected with capabilities: {}", capabilities.join(" "));

        Ok(Connection {
            reader,
            sender,
            capabilities,
        })
    }

    /// Capabilities acknowledged by the server
    pub fn capabilities(&self) -> &[String] { &self.capabilities }
}

/// Reads a (possibly multi-line) `CAP * LS` reply
///
/// `CAP * LS * :<caps>` is followed by more lines, `CAP * LS :<caps>` is the last one.
async fn list_capabilities<R: AsyncRead + Unpin>(reader: &mut Reader<R>) -> Result<String> {
    let mut advertised = String::new();
    loop {
        let message = reader.next().await?;
        log::debug!("> {} {}", message.command, message.params.join(" "));
        match message.command.as_str() {
            "CAP" if message.param(1) == "LS" => {
                let more = message.param(2) == "*" && message.params.len() > 3;
                let caps = if more { message.param(3) } else { message.param(2) };
                advertised.push_str(caps);
                advertised.push(' ');
                if !more {
                    return Ok(advertised);
                }
            }
            "NOTICE" if message.param(0) == "*" => {
                return Err(Error::AuthenticationFailed(message.param(1).into()));
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio_test::io::Builder;

    use super::*;

    fn config() -> Config {
        Config {
            credentials: Login::Regular {
                login: "bot".into(),
                token: "token".into(),
            },
            ..Config::default()
        }
    }

    fn handshake_writes(builder: &mut Builder) -> &mut Builder {
        builder
            .write(b"CAP LS 302\r\n")
            .read(b":tmi.twitch.tv CAP * LS :twitch.tv/tags twitch.tv/commands twitch.tv/membership\r\n")
            .write(b"CAP REQ :twitch.tv/tags\r\n")
            .write(b"CAP REQ :twitch.tv/commands\r\n")
            .write(b"CAP REQ :twitch.tv/membership\r\n")
            .write(b"CAP REQ :echo-message\r\n")
            .write(b"PASS oauth:token\r\n")
            .write(b"NICK bot\r\n")
    }

    #[tokio::test]
    async fn handshake_collects_acknowledged_capabilities() {
        let mock = handshake_writes(&mut Builder::new())
            .read(b":tmi.twitch.tv CAP * ACK :twitch.tv/membership\r\n")
            .read(b":tmi.twitch.tv CAP * ACK :twitch.tv/tags\r\n")
            .read(b":tmi.twitch.tv CAP * ACK :twitch.tv/commands\r\n")
            .read(b":tmi.twitch.tv CAP * NAK :echo-message\r\n")
            .read(b":tmi.twitch.tv 001 bot :Welcome, GLHF!\r\n")
            .build();

        let conn = Connection::handshake(mock, &config()).await.unwrap();
        assert_eq!(
            &["twitch.tv/membership", "twitch.tv/tags", "twitch.tv/commands"],
            conn.capabilities()
        );
    }

    #[tokio::test]
    async fn handshake_requests_only_wanted_capabilities() {
        let config = Config {
            capabilities: CapabilitySet::new().with_extra(vec!["sasl"]),
            ..config()
        };
        let mock = Builder::new()
            .write(b"CAP LS 302\r\n")
            .read(b":tmi.twitch.tv CAP * LS * :twitch.tv/tags unknown-thing\r\n")
            .read(b":tmi.twitch.tv CAP * LS :sasl=PLAIN twitch.tv/commands\r\n")
            .write(b"CAP REQ :twitch.tv/tags\r\n")
            .write(b"CAP REQ :sasl\r\n")
            .write(b"CAP REQ :twitch.tv/commands\r\n")
            .write(b"CAP REQ :twitch.tv/membership\r\n")
            .write(b"CAP REQ :echo-message\r\n")
            .write(b"PASS oauth:token\r\n")
            .write(b"NICK bot\r\n")
            .read(b":tmi.twitch.tv CAP * ACK :twitch.tv/tags\r\n")
            .read(b":tmi.twitch.tv 001 bot :Welcome, GLHF!\r\n")
            .build();

        let conn = Connection::handshake(mock, &config).await.unwrap();
        assert_eq!(&["twitch.tv/tags"], conn.capabilities());
    }

    #[tokio::test]
    async fn sender_splits_line_breaks() {
        let mock = Builder::new()
            .write(b"PRIVMSG #forsen :.ban baduser x\r\nPRIVMSG #forsen :PART #forsen\r\n")
            .build();
        let mut sender = Sender::new(mock);
        sender.ban("#forsen", "baduser", Some("x\r\nPART #forsen")).await.unwrap();
    }

    #[tokio::test]
    async fn handshake_fails_on_login_notice() {
        let mock = handshake_writes(&mut Builder::new())
            .read(b":tmi.twitch.tv NOTICE * :Login authentication failed\r\n")
            .build();

        match Connection::handshake(mock, &config()).await {
            Err(Error::AuthenticationFailed(reason)) => assert_eq!("Login authentication failed", reason),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("handshake succeeded"),
        }
    }

    #[tokio::test]
    async fn handshake_fails_on_eof() {
        let mock = handshake_writes(&mut Builder::new()).build();
        assert!(matches!(
            Connection::handshake(mock, &config()).await,
            Err(Error::StreamClosed)
        ));
    }

    #[tokio::test]
    async fn reader_skips_malformed_lines() {
        let mock = Builder::new()
            .read(b"\r\n@unterminated=tags\r\n:tmi.twitch.tv RECONNECT\r\n")
            .build();
        let mut reader = Reader::new(mock);
        assert_eq!("RECONNECT", reader.next().await.unwrap().command);
        assert!(matches!(reader.next().await, Err(Error::StreamClosed)));
    }

    #[tokio::test]
    async fn sender_writes_chat_commands() {
        let mock = Builder::new()
            .write(b"PRIVMSG #forsen :.timeout baduser 600 spam\r\n")
            .write(b"PRIVMSG #forsen :\x01ACTION waves\x01\r\n")
            .write(b"PRIVMSG #forsen :.commercial 30\r\n")
            .build();
        let mut sender = Sender::new(mock);
        sender.timeout("forsen", "baduser", 600, Some("spam")).await.unwrap();
        sender.action("#forsen", "waves").await.unwrap();
        sender.commercial("#forsen", None).await.unwrap();
    }

    #[tokio::test]
    async fn sender_rejects_whispers() {
        let mut sender = Sender::new(Builder::new().build());
        assert!(matches!(
            sender.message("someone", "hi").await,
            Err(Error::WhisperUnsupported(user)) if user == "someone"
        ));
    }
}
