//! Signal handling for the capture loop

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

/// Stream of user interrupts (SIGINT).
///
/// The first interrupt is the stop intent for the running session; the
/// caller decides what further interrupts mean (typically force quit).
pub struct StopSignal {
    receiver: mpsc::Receiver<()>,
}

impl StopSignal {
    /// Register the SIGINT handler and return the interrupt stream
    pub fn listen() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);

        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            while sigint.recv().await.is_some() {
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self { receiver: rx })
    }

    /// Wait for the next interrupt
    pub async fn recv(&mut self) -> Option<()> {
        self.receiver.recv().await
    }
}
