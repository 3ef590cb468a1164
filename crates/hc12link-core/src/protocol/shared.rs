//! Decoder shared with a byte-delivery thread
//!
//! When bytes arrive on a different thread than the consumer (a serial reader
//! thread standing in for a receive interrupt), the decoder buffers must be
//! mutated atomically with respect to delivery. [`SharedDecoder`] keeps the
//! decoder behind a mutex so every push, read and re-arm is one critical
//! section.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DecoderState, FrameDecoder, ReceivedFrame};

/// Cloneable handle to a mutex-protected [`FrameDecoder`]
#[derive(Debug, Clone)]
pub struct SharedDecoder {
    inner: Arc<Mutex<FrameDecoder>>,
}

impl SharedDecoder {
    /// Wrap a decoder
    pub fn new(decoder: FrameDecoder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(decoder)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrameDecoder> {
        // A panicking holder cannot leave the decoder half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver one byte
    pub fn push(&self, byte: u8) -> DecoderState {
        self.lock().push(byte)
    }

    /// Deliver a run of bytes in one critical section
    pub fn feed(&self, bytes: &[u8]) -> DecoderState {
        self.lock().feed(bytes)
    }

    /// Current state
    pub fn state(&self) -> DecoderState {
        self.lock().state()
    }

    /// Detach the completed frame, if any, and re-arm
    pub fn take_frame(&self) -> Option<ReceivedFrame> {
        self.lock().take_frame()
    }

    /// Clear buffers and return to `Idle`
    pub fn rearm(&self) {
        self.lock().rearm();
    }

    /// Run `f` with exclusive access to the decoder
    pub fn with<R>(&self, f: impl FnOnce(&mut FrameDecoder) -> R) -> R {
        f(&mut self.lock())
    }
}
