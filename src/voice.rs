//! Voice state mirror.
//!
//! The voice SDK is an external collaborator that reports its progress through
//! callbacks. [`VoiceMirror`] folds those callbacks ([`VoiceEvent`]) into a
//! small state machine and publishes the two booleans the visualizer cares
//! about, [`VisualFlags`], to any number of subscribers.
//!
//! Subscribers never block: a [`Subscription`] just hands back the most recent
//! flags published since it was last read. Dropping a subscription is enough to
//! unsubscribe; the mirror prunes it on the next publish.
//!
//! ```ignore
//! let mut mirror = VoiceMirror::new();
//! let sub = mirror.subscribe();
//!
//! mirror.handle(VoiceEvent::StartRequested);
//! mirror.handle(VoiceEvent::CallStart);
//!
//! assert_eq!(sub.latest().map(|f| f.listening), Some(true));
//! ```

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use tracing::{debug, error};

/// Booleans the visual engine accepts from the voice collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisualFlags {
    /// A call is live.
    pub listening: bool,
    /// Speech is in progress.
    pub speaking: bool,
}

/// Interaction state mirrored from SDK callbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoiceState {
    #[default]
    Idle,
    Connecting,
    Listening,
    UserSpeaking,
    Processing,
}

impl VoiceState {
    /// Status line shown under the microphone button.
    pub fn status_label(self) -> Option<&'static str> {
        match self {
            VoiceState::Idle => None,
            VoiceState::Connecting => Some("Connecting..."),
            VoiceState::Listening => Some("Listening..."),
            VoiceState::UserSpeaking => Some("AI Speaking..."),
            VoiceState::Processing => Some("Listening..."),
        }
    }

    /// Flags derived from this state.
    pub fn flags(self) -> VisualFlags {
        VisualFlags {
            listening: matches!(
                self,
                VoiceState::Listening | VoiceState::UserSpeaking | VoiceState::Processing
            ),
            speaking: self == VoiceState::UserSpeaking,
        }
    }
}

/// Who produced a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Callbacks from the voice SDK, plus the two button actions.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    /// Microphone button pressed. Starts a call when idle, stops it otherwise.
    StartRequested,
    /// Starting the call failed before the SDK reported anything.
    StartFailed(String),
    /// Explicit stop.
    StopRequested,
    CallStart,
    CallEnd,
    SpeechStart,
    SpeechEnd,
    Transcript { role: Role, text: String },
    Error(String),
}

/// Receives flag updates from a [`VoiceMirror`].
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<VisualFlags>,
}

impl Subscription {
    /// Most recent flags published since the last call, if any.
    pub fn latest(&self) -> Option<VisualFlags> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(flags) => latest = Some(flags),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }
}

/// State machine over [`VoiceEvent`]s that publishes [`VisualFlags`].
#[derive(Debug, Default)]
pub struct VoiceMirror {
    state: VoiceState,
    transcript: String,
    subscribers: Vec<Sender<VisualFlags>>,
}

impl VoiceMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn flags(&self) -> VisualFlags {
        self.state.flags()
    }

    /// Latest assistant transcript, empty when nothing has been said.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// The button is disabled while a call is being set up.
    pub fn button_enabled(&self) -> bool {
        self.state != VoiceState::Connecting
    }

    /// Register a new subscriber. It immediately receives the current flags.
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        // The receiver is alive right here, so this send cannot fail.
        let _ = tx.send(self.flags());
        self.subscribers.push(tx);
        Subscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Apply one event and publish the resulting flags if they changed.
    pub fn handle(&mut self, event: VoiceEvent) {
        let before = self.flags();

        match event {
            VoiceEvent::StartRequested if self.state == VoiceState::Idle => {
                self.state = VoiceState::Connecting;
            }
            VoiceEvent::StartRequested | VoiceEvent::StopRequested => {
                self.state = VoiceState::Idle;
                self.transcript.clear();
            }
            VoiceEvent::StartFailed(reason) => {
                error!("failed to start call: {reason}");
                self.state = VoiceState::Idle;
            }
            VoiceEvent::CallStart => {
                self.state = VoiceState::Listening;
                self.transcript.clear();
            }
            VoiceEvent::CallEnd => self.state = VoiceState::Idle,
            VoiceEvent::SpeechStart => self.state = VoiceState::UserSpeaking,
            VoiceEvent::SpeechEnd => self.state = VoiceState::Processing,
            VoiceEvent::Transcript { role, text } => {
                if role == Role::Assistant {
                    self.transcript = text;
                }
            }
            VoiceEvent::Error(reason) => {
                error!("voice error: {reason}");
                self.state = VoiceState::Idle;
            }
        }

        debug!(state = ?self.state, "voice state updated");

        let after = self.flags();
        if after != before {
            self.publish(after);
        }
    }

    fn publish(&mut self, flags: VisualFlags) {
        self.subscribers.retain(|tx| tx.send(flags).is_ok());
    }
}
