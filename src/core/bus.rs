use tokio::sync::mpsc::{self, error::TrySendError};

/// Producer side of the redraw signal. Cheap to clone, never blocks.
#[derive(Clone, Debug)]
pub struct RedrawSignal {
    tx: mpsc::Sender<()>,
}

/// Consumer side of the redraw signal.
#[derive(Debug)]
pub struct RedrawListener {
    rx: mpsc::Receiver<()>,
}

/// Single-slot channel: a signal raised while another is still pending is
/// folded into it.
pub fn redraw_channel() -> (RedrawSignal, RedrawListener) {
    let (tx, rx) = mpsc::channel(1);
    (RedrawSignal { tx }, RedrawListener { rx })
}

impl RedrawSignal {
    /// Returns `true` if this call filled the slot, `false` if it was
    /// coalesced or nobody is listening anymore.
    pub fn notify(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => false,
            Err(TrySendError::Closed(())) => false,
        }
    }
}

impl RedrawListener {
    /// Waits for the next signal. `false` once every producer is gone.
    pub async fn wait(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }

    /// Consumes a pending signal without waiting.
    pub fn try_take(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}
