use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::imaging_pipeline::common::ChannelKind;
use crate::imaging_pipeline::frame::Frame;

/// Pending wake-ups the consumer can fall behind by before producers start
/// dropping notifications. A dropped notification loses nothing: the
/// consumer always reads the latest frame.
pub const MAILBOX_CAPACITY: usize = 4;

/// Notification from a capture thread to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    FrameReady { channel: ChannelKind, sequence_id: u64 },
    Disconnected(ChannelKind),
}

/// Shared frame-ready mailbox for all channels of a rig.
pub fn event_mailbox() -> (Sender<ChannelEvent>, Receiver<ChannelEvent>) {
    crossbeam_channel::bounded(MAILBOX_CAPACITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelState {
    Live = 0,
    /// Terminal: the camera reported a permanent unplug
    Disconnected = 1,
    /// Terminal: torn down by the application
    Closed = 2,
}

impl ChannelState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ChannelState::Live,
            1 => ChannelState::Disconnected,
            _ => ChannelState::Closed,
        }
    }
}

/// Latest-frame slot shared between one capture thread and the consumer.
///
/// `submit` swaps in a new immutable snapshot under a lock held only for
/// the pointer swap; `latest` clones the snapshot pointer. A reader keeps
/// its snapshot alive for as long as it needs it, so it never observes a
/// buffer being overwritten by the next capture. Consumers that need to
/// mutate a frame clone it out of the snapshot.
pub struct AcquisitionChannel {
    kind: ChannelKind,
    latest: Mutex<Option<Arc<Frame>>>,
    state: AtomicU8,
    next_sequence: AtomicU64,
    events: Sender<ChannelEvent>,
}

impl AcquisitionChannel {
    pub fn new(kind: ChannelKind, events: Sender<ChannelEvent>) -> Self {
        Self {
            kind,
            latest: Mutex::new(None),
            state: AtomicU8::new(ChannelState::Live as u8),
            next_sequence: AtomicU64::new(1),
            events,
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn state(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_live(&self) -> bool {
        self.state() == ChannelState::Live
    }

    /// Publishes a freshly captured frame. Never blocks on the consumer.
    ///
    /// Returns `false`, dropping the frame, once the channel is terminal.
    pub fn submit(&self, mut frame: Frame) -> bool {
        if !self.is_live() {
            trace!(channel = %self.kind, "Frame submitted to terminal channel dropped");
            return false;
        }
        let sequence_id = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        frame.set_sequence_id(sequence_id);
        let snapshot = Arc::new(frame);
        {
            *self.latest.lock() = Some(snapshot);
        }

        match self.events.try_send(ChannelEvent::FrameReady {
            channel: self.kind,
            sequence_id,
        }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                trace!(channel = %self.kind, sequence_id, "Consumer behind, wake-up coalesced");
            }
            Err(TrySendError::Disconnected(_)) => {
                trace!(channel = %self.kind, "No consumer attached");
            }
        }
        true
    }

    /// Most recently submitted frame, if any.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.latest.lock().clone()
    }

    /// Moves a live channel to the terminal disconnected state.
    ///
    /// The notification is best effort; consumers also poll `state()` on
    /// every wake-up, and a full mailbox guarantees a pending wake-up.
    pub fn mark_disconnected(&self) {
        let switched = self
            .state
            .compare_exchange(
                ChannelState::Live as u8,
                ChannelState::Disconnected as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if switched {
            warn!(channel = %self.kind, "Channel disconnected");
            let _ = self.events.try_send(ChannelEvent::Disconnected(self.kind));
        }
    }

    /// Tears the channel down; later submissions are dropped.
    pub fn close(&self) {
        let _ = self.state.compare_exchange(
            ChannelState::Live as u8,
            ChannelState::Closed as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
