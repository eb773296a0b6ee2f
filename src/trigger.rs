use std::sync::mpsc::{Receiver, TryRecvError};

use crate::{
    foundation::error::{FramecardError, FramecardResult},
    params::RenderInputs,
};

/// Serialises compositor passes over a stream of published snapshots.
///
/// At most one pass is in flight. Snapshots arriving meanwhile collapse into the newest
/// one, which becomes the single follow-up pass once the in-flight pass finishes.
pub struct RenderTrigger {
    rx: Receiver<RenderInputs>,
    pending: Option<RenderInputs>,
    in_flight: Option<u64>,
    coalesced: u64,
    disconnected: bool,
}

impl RenderTrigger {
    pub fn new(rx: Receiver<RenderInputs>) -> Self {
        Self {
            rx,
            pending: None,
            in_flight: None,
            coalesced: 0,
            disconnected: false,
        }
    }

    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(inputs) => {
                    if let Some(stale) = self.pending.replace(inputs) {
                        self.coalesced += 1;
                        tracing::debug!(revision = stale.revision, "pass coalesced");
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
    }

    /// The snapshot to render next, or `None` while a pass is in flight or nothing changed.
    pub fn next_pass(&mut self) -> Option<RenderInputs> {
        self.drain();
        if self.in_flight.is_some() {
            return None;
        }
        let inputs = self.pending.take()?;
        self.in_flight = Some(inputs.revision);
        Some(inputs)
    }

    /// Releases the in-flight slot taken by the pass for `revision`.
    pub fn finish_pass(&mut self, revision: u64) -> FramecardResult<()> {
        match self.in_flight {
            Some(r) if r == revision => {
                self.in_flight = None;
                Ok(())
            }
            Some(r) => Err(FramecardError::validation(format!(
                "finish_pass({revision}) while revision {r} is in flight"
            ))),
            None => Err(FramecardError::validation(format!(
                "finish_pass({revision}) with no pass in flight"
            ))),
        }
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// No pass in flight and no snapshot waiting.
    pub fn is_idle(&mut self) -> bool {
        self.drain();
        self.in_flight.is_none() && self.pending.is_none()
    }

    /// Number of snapshots superseded before they were rendered.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Whether the publishing store has gone away.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}
