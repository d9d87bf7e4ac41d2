//! Connectivity monitor — tracks online/offline transitions.
//!
//! Purely event-driven: the initial status is supplied at construction
//! (read synchronously from the host environment by the platform layer) and
//! subsequent changes arrive via [`ConnectivityMonitor::set_online`], which
//! a platform signal adapter calls on OS/network events.  There is no
//! polling.
//!
//! The orchestrator reads [`is_online`](ConnectivityMonitor::is_online)
//! synchronously when routing a request; components that need to react to
//! transitions (e.g. an offline banner) use
//! [`subscribe`](ConnectivityMonitor::subscribe).

use tokio::sync::watch;

/// Process-wide connectivity state.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the host's current connectivity snapshot.
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx }
    }

    /// Current status snapshot.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Record a network signal from the platform layer.
    ///
    /// Subscribers are notified only on actual transitions; repeated
    /// signals with the same status are absorbed.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });
        if changed {
            log::info!("connectivity: now {}", if online { "online" } else { "offline" });
        }
    }

    /// Receiver that observes every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
