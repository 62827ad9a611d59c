use tokio::sync::watch;
use tracing::info;

/// Owner side of the "is connected" signal.
#[derive(Debug)]
pub struct Connectivity {
    tx: watch::Sender<bool>,
}

/// Reader side handed to components that gate network calls on it.
#[derive(Debug, Clone)]
pub struct ConnectivityWatch {
    rx: watch::Receiver<bool>,
}

impl Connectivity {
    pub fn new(connected: bool) -> Self {
        let (tx, _) = watch::channel(connected);
        Self { tx }
    }

    pub fn set(&self, connected: bool) {
        self.tx.send_if_modified(|current| {
            if *current == connected {
                return false;
            }
            info!(
                "Connectivity changed: {}",
                if connected { "online" } else { "offline" }
            );
            *current = connected;
            true
        });
    }

    pub fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ConnectivityWatch {
        ConnectivityWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityWatch {
    pub fn is_connected(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits for the next change. Returns `None` once the owner is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn readers_see_latest_value() {
        let connectivity = Connectivity::default();
        let mut reader = connectivity.subscribe();
        assert!(reader.is_connected());

        connectivity.set(false);
        assert_eq!(reader.changed().await, Some(false));
        assert!(!reader.is_connected());
        assert!(!connectivity.is_connected());
    }

    #[tokio::test]
    async fn closed_signal_ends_changes() {
        let connectivity = Connectivity::new(false);
        let mut reader = connectivity.subscribe();
        drop(connectivity);
        assert_eq!(reader.changed().await, None);
        assert!(!reader.is_connected());
    }
}
