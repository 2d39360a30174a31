//! Discrete control events, carried from the control thread to the audio
//! thread without locks.
//!
//! Continuous values live in [`crate::params::SharedParams`]; anything that
//! must happen exactly once (a pluck) travels through a single-producer
//! single-consumer queue instead, so a burst of events is never collapsed
//! into one.

use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// Re-excite the string model
    Pluck,
}

/// Audio-side end of a control queue. Must not block or allocate.
pub trait ControlReceiver {
    fn pop(&mut self) -> Option<ControlEvent>;
}

#[cfg(feature = "rtrb")]
impl ControlReceiver for Consumer<ControlEvent> {
    fn pop(&mut self) -> Option<ControlEvent> {
        Consumer::pop(self).ok()
    }
}

/// Scripted events for offline rendering and tests.
impl ControlReceiver for VecDeque<ControlEvent> {
    fn pop(&mut self) -> Option<ControlEvent> {
        self.pop_front()
    }
}

/// Receiver for engines driven without a control thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControl;

impl ControlReceiver for NoControl {
    fn pop(&mut self) -> Option<ControlEvent> {
        None
    }
}

/// Control-thread end of the pluck queue.
#[cfg(feature = "rtrb")]
pub struct PluckHandle {
    tx: Producer<ControlEvent>,
}

#[cfg(feature = "rtrb")]
impl PluckHandle {
    /// Request a pluck. Returns `false` if the queue is full and the event
    /// was dropped.
    pub fn pluck(&mut self) -> bool {
        self.tx.push(ControlEvent::Pluck).is_ok()
    }

    /// Free slots left in the queue.
    pub fn slots(&self) -> usize {
        self.tx.slots()
    }
}

/// Create a pluck queue holding up to `capacity` pending events.
#[cfg(feature = "rtrb")]
pub fn control_channel(capacity: usize) -> (PluckHandle, Consumer<ControlEvent>) {
    let (tx, rx) = RingBuffer::<ControlEvent>::new(capacity.max(1));
    (PluckHandle { tx }, rx)
}
