//! Push stream: turns a follower's subscription into Server-Sent Events.
//!
//! Frame sequence for one connection:
//!
//! ```text
//! retry: <ms>
//! event: start       data: {"url":..,"currentPage":..}   (snapshot)
//! event: changePage  data: {"page":..}                   (bus events)
//! event: keepAlive   data:                               (after a quiet period)
//! event: delete      data: {}                            (last frame)
//! ```
//!
//! The stream owns the [`Subscription`]. When the client goes away axum drops
//! the stream, and dropping the subscription deregisters it from the bus.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, Sse};
use futures::stream::{self, Stream};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::application::LiveSubscription;
use crate::domain::live::LiveEvent;
use crate::ports::Subscription;

/// Timing of a push stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushStreamConfig {
    /// Quiet time after which a keep-alive frame is sent.
    pub keep_alive: Duration,
    /// Reconnect hint sent as the first frame.
    pub retry: Duration,
}

/// One outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Retry(Duration),
    Event(LiveEvent),
}

impl Frame {
    /// The SSE encoding of this frame.
    pub fn to_sse(&self) -> Event {
        match self {
            Frame::Retry(retry) => Event::default().retry(*retry),
            Frame::Event(LiveEvent::KeepAlive) => Event::default().event("keepAlive").data(""),
            Frame::Event(event) => Event::default()
                .event(event.name())
                .data(event.body().to_string()),
        }
    }
}

/// Per-connection state machine behind the SSE body.
pub struct PushStream {
    retry: Option<Duration>,
    snapshot: Option<LiveEvent>,
    subscription: Subscription,
    keep_alive: Interval,
    finished: bool,
}

impl PushStream {
    pub fn new(attached: LiveSubscription, config: PushStreamConfig) -> Self {
        let mut keep_alive =
            time::interval_at(Instant::now() + config.keep_alive, config.keep_alive);
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            retry: Some(config.retry),
            snapshot: Some(attached.snapshot),
            subscription: attached.subscription,
            keep_alive,
            finished: false,
        }
    }

    /// Waits for the next frame. `None` ends the stream.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }
        if let Some(retry) = self.retry.take() {
            return Some(Frame::Retry(retry));
        }
        if let Some(snapshot) = self.snapshot.take() {
            self.keep_alive.reset();
            return Some(Frame::Event(snapshot));
        }

        tokio::select! {
            event = self.subscription.recv() => {
                let event = event?;
                self.keep_alive.reset();
                if event.is_terminal() {
                    self.finished = true;
                    self.subscription.cancel();
                }
                Some(Frame::Event(event))
            }
            _ = self.keep_alive.tick() => Some(Frame::Event(LiveEvent::KeepAlive)),
        }
    }

    /// The frames as an SSE-ready stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Event, Infallible>> + Send {
        stream::unfold(self, |mut push| async move {
            let frame = push.next_frame().await?;
            Some((Ok(frame.to_sse()), push))
        })
    }

    /// The frames as an axum response.
    pub fn into_sse(self) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
        Sse::new(self.into_stream())
    }
}
