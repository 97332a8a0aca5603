//! Identity provider adapter.
//!
//! The session controller never caches who is signed in. It asks an
//! `IdentityProvider` at the moment it needs an identity, so a sign-out
//! between mount and submit is observed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Opaque student uid issued by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Yields the currently authenticated identity, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Identity decoded from the bearer token of the request being served.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity(pub Option<Identity>);

impl IdentityProvider for RequestIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}

/// Writing half of a reactive identity feed. Held by whatever observes
/// sign-in and sign-out.
#[derive(Debug)]
pub struct IdentityPublisher {
    tx: watch::Sender<Option<Identity>>,
}

/// Reading half of the feed. Cheap to clone; every clone sees the latest value.
#[derive(Debug, Clone)]
pub struct IdentityWatch {
    rx: watch::Receiver<Option<Identity>>,
}

/// Creates a feed that starts signed out.
pub fn identity_feed() -> (IdentityPublisher, IdentityWatch) {
    let (tx, rx) = watch::channel(None);
    (IdentityPublisher { tx }, IdentityWatch { rx })
}

impl IdentityPublisher {
    pub fn sign_in(&self, identity: Identity) {
        tracing::debug!(%identity, "identity signed in");
        self.tx.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            tracing::debug!("identity signed out");
        }
    }

    pub fn subscribe(&self) -> IdentityWatch {
        IdentityWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl IdentityWatch {
    /// Waits for the next sign-in or sign-out and returns the new value.
    /// Returns `None` as well once the publisher is gone.
    pub async fn changed(&mut self) -> Option<Identity> {
        match self.rx.changed().await {
            Ok(()) => self.rx.borrow_and_update().clone(),
            Err(_) => None,
        }
    }
}

impl IdentityProvider for IdentityWatch {
    fn current_identity(&self) -> Option<Identity> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_starts_signed_out() {
        let (_publisher, watch) = identity_feed();
        assert_eq!(watch.current_identity(), None);
    }

    #[test]
    fn test_readers_see_latest_value() {
        let (publisher, watch) = identity_feed();
        let late = publisher.subscribe();

        publisher.sign_in(Identity::new("first"));
        publisher.sign_in(Identity::new("second"));
        assert_eq!(watch.current_identity(), Some(Identity::new("second")));
        assert_eq!(late.current_identity(), Some(Identity::new("second")));

        publisher.sign_out();
        assert_eq!(watch.current_identity(), None);
    }

    #[tokio::test]
    async fn test_changed_reports_transitions() {
        let (publisher, mut watch) = identity_feed();

        let waiter = tokio::spawn(async move { watch.changed().await });
        publisher.sign_in(Identity::new("uid"));

        assert_eq!(waiter.await.unwrap(), Some(Identity::new("uid")));
    }

    #[test]
    fn test_request_identity() {
        assert_eq!(RequestIdentity::default().current_identity(), None);
        assert_eq!(
            RequestIdentity(Some(Identity::new("uid"))).current_identity(),
            Some(Identity::new("uid"))
        );
    }
}
