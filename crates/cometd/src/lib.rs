pub mod error;
pub mod message;

use core::{future::Future, time::Duration};
use message::{Advice, Message, Reconnect};
use serde_json::Value;
use std::collections::VecDeque;

pub use error::{Error, Result};

/// Delivers a batch of messages to the server and returns every message in its reply.
pub trait Transport {
    fn send(&self, batch: Vec<Message>) -> impl Future<Output = Result<Vec<Message>>> + Send;
}

/// Base pause before retrying a failed connect. Grows with each consecutive failure.
const RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRIES: u8 = 3;

/// Bayeux client speaking the long-polling connection type.
pub struct Client<T> {
    transport: T,
    client_id: Option<Box<str>>,
    next_id: u64,
    advice: Advice,
    /// Delay to observe before the next `/meta/connect`.
    backoff: Option<Duration>,
    subscriptions: Vec<Box<str>>,
    /// Events received alongside replies, in arrival order.
    pending: VecDeque<Message>,
    handshake_ext: Option<Value>,
    /// Set when the server asked for a new handshake that has not completed yet.
    needs_handshake: bool,
}

impl<T> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            client_id: None,
            next_id: 0,
            advice: Advice::default(),
            backoff: None,
            subscriptions: Vec::new(),
            pending: VecDeque::new(),
            handshake_ext: None,
            needs_handshake: false,
        }
    }

    /// Attaches an `ext` object to every handshake request.
    pub fn with_handshake_ext(mut self, ext: Value) -> Self {
        self.handshake_ext = Some(ext);
        self
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = &str> {
        self.subscriptions.iter().map(AsRef::as_ref)
    }

    /// Connect requests may be held open for the advised timeout, so we allow some slack on top.
    fn request_timeout(&self) -> Option<Duration> {
        let millis = self.advice.timeout?;
        Some(Duration::from_millis(millis + millis / 5))
    }

    fn reject(reply: Message) -> Error {
        let reason = reply.error.unwrap_or_else(|| Box::from("unknown error"));
        Error::Rejected { channel: reply.channel, reason }
    }
}

impl<T: Transport> Client<T> {
    /// Sends a single request and returns its reply. Unrelated events in the same batch are queued.
    async fn exchange(&mut self, mut message: Message) -> Result<Message> {
        if message.channel.as_ref() != message::HANDSHAKE {
            message.client_id = Some(self.client_id.clone().ok_or(Error::NoClientId)?);
        }

        let id: Box<str> = self.next_id.to_string().into();
        self.next_id += 1;
        message.id = Some(id.clone());
        let channel = message.channel.clone();

        let future = self.transport.send(Vec::from([message]));
        let batch = match self.request_timeout() {
            Some(duration) => tokio::time::timeout(duration, future).await.map_err(|_| Error::Timeout)??,
            None => future.await?,
        };

        let mut reply = None;
        for message in batch {
            if let Some(advice) = &message.advice {
                self.advice = advice.clone();
            }
            if reply.is_none() && message.is_reply_to(&channel, Some(&id)) {
                reply = Some(message);
            } else if message.is_event() {
                self.pending.push_back(message);
            } else {
                log::debug!("ignoring unsolicited message on {}", message.channel);
            }
        }

        reply.ok_or(Error::NoReply)
    }

    async fn request(&mut self, message: Message) -> Result<Message> {
        let reply = self.exchange(message).await?;
        if reply.is_failure() {
            return Err(Self::reject(reply));
        }
        Ok(reply)
    }

    /// Negotiates a client ID. Message IDs restart from zero.
    pub async fn handshake(&mut self) -> Result<()> {
        self.next_id = 0;
        self.client_id = None;

        let message = Message {
            version: Some(message::VERSION.into()),
            minimum_version: Some(message::VERSION.into()),
            supported_connection_types: Some(Vec::from([Box::from(message::LONG_POLLING)])),
            ext: self.handshake_ext.clone(),
            ..Message::new(message::HANDSHAKE)
        };
        let reply = self.request(message).await?;

        let supported = reply.supported_connection_types.as_deref().unwrap_or_default();
        log::debug!("server supports connection types {supported:?}");
        if !supported.iter().any(|kind| kind.as_ref() == message::LONG_POLLING) {
            return Err(Error::UnsupportedConnection);
        }

        let client_id = reply.client_id.ok_or(Error::NoClientId)?;
        log::info!("handshake complete with client ID {client_id}");
        self.client_id = Some(client_id);
        Ok(())
    }

    /// Performs the first `/meta/connect` after a handshake.
    pub async fn connect(&mut self) -> Result<()> {
        let message = Message { connection_type: Some(message::LONG_POLLING.into()), ..Message::new(message::CONNECT) };
        self.request(message).await?;
        Ok(())
    }

    pub async fn subscribe(&mut self, channel: &str) -> Result<()> {
        let message = Message { subscription: Some(channel.into()), ..Message::new(message::SUBSCRIBE) };
        self.request(message).await?;
        if !self.subscriptions.iter().any(|sub| sub.as_ref() == channel) {
            self.subscriptions.push(channel.into());
        }
        log::info!("subscribed to {channel}");
        Ok(())
    }

    pub async fn unsubscribe(&mut self, channel: &str) -> Result<()> {
        let message = Message { subscription: Some(channel.into()), ..Message::new(message::UNSUBSCRIBE) };
        self.request(message).await?;
        self.subscriptions.retain(|sub| sub.as_ref() != channel);
        log::info!("unsubscribed from {channel}");
        Ok(())
    }

    pub async fn publish(&mut self, channel: &str, data: Value) -> Result<Message> {
        let message = Message { data: Some(data), ..Message::new(channel) };
        self.request(message).await
    }

    /// Returns the next event, long-polling the server when none are queued.
    pub async fn receive(&mut self) -> Result<Message> {
        let mut failures = 0;
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(message);
            }

            match self.poll().await {
                Ok(()) => failures = 0,
                Err(err @ (Error::Transport | Error::Timeout | Error::Rejected { .. })) if failures < MAX_RETRIES => {
                    failures += 1;
                    let delay = RETRY_DELAY * u32::from(failures);
                    let delay = self.backoff.map_or(delay, |advised| advised.max(delay));
                    log::warn!("connect failed ({err}), retrying in {delay:?}");
                    self.backoff = Some(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Issues one `/meta/connect` and follows whatever advice comes back.
    async fn poll(&mut self) -> Result<()> {
        if let Some(delay) = self.backoff.take() {
            tokio::time::sleep(delay).await;
        }

        if self.needs_handshake {
            self.rehandshake().await?;
        }

        let message = Message { connection_type: Some(message::LONG_POLLING.into()), ..Message::new(message::CONNECT) };
        let reply = self.exchange(message).await?;
        self.backoff = self.advice.interval.filter(|&millis| millis > 0).map(Duration::from_millis);

        // An unknown client must handshake again even when the server gives no advice.
        let fallback = if reply.error_code() == Some(402) { Reconnect::Handshake } else { Reconnect::Retry };
        let reconnect = reply.advice.as_ref().and_then(|advice| advice.reconnect).unwrap_or(fallback);
        let reason = reply.error_message().unwrap_or("no reason given");

        match reconnect {
            Reconnect::None => {
                log::warn!("server advised not to reconnect");
                self.client_id = None;
                Err(Error::Disconnected)
            }
            Reconnect::Handshake => {
                log::warn!("server advised a new handshake: {reason}");
                self.needs_handshake = true;
                Ok(())
            }
            Reconnect::Retry if reply.is_failure() => Err(Self::reject(reply)),
            Reconnect::Retry => Ok(()),
        }
    }

    /// Handshakes and restores every subscription. The subscription list survives a failure so that the next attempt
    /// can restore it.
    async fn rehandshake(&mut self) -> Result<()> {
        self.handshake().await?;
        let channels = self.subscriptions.clone();
        for channel in channels.iter() {
            self.subscribe(channel).await?;
        }
        self.needs_handshake = false;
        Ok(())
    }

    /// Leaves the session. Failures are logged since there is nothing left to recover.
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.client_id.is_none() {
            return Ok(());
        }

        if let Err(err) = self.request(Message::new(message::DISCONNECT)).await {
            log::warn!("disconnect failed: {err}");
        }

        self.client_id = None;
        self.pending.clear();
        Ok(())
    }
}
