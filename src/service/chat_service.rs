//! Chat service: session lifecycle, matchmaking and relay.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;

use crate::domain::{
    ClientId, ConnectionHandle, OutboundMessage, PairingNotice, Payload, Registry, Session,
    SessionToken, WaitPools, find_partner,
};

/// What a connecting client was told, plus the token its receive loop
/// must present on teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Registered client identifier.
    pub id: ClientId,
    /// Stamp of this registration.
    pub token: SessionToken,
    /// Partner assigned at registration, if any.
    pub partner: Option<ClientId>,
    /// Tag that produced the pairing, if interest-based.
    pub matched_interest: Option<String>,
}

/// Outcome of a relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The payload was queued on the partner's connection.
    Delivered,
    /// No live partner, or its connection refused the write. Dropped
    /// without retry.
    Dropped,
}

/// Point-in-time counts over the registry and wait pools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatStats {
    /// Live sessions.
    pub connected: usize,
    /// Live sessions with a partner.
    pub paired: usize,
    /// Clients in the unconditional pool.
    pub waiting_unconditional: usize,
    /// Clients waiting per interest tag.
    pub waiting_by_interest: BTreeMap<String, usize>,
}

/// Read-only copy of one session's matchmaking fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// Client identifier.
    pub id: ClientId,
    /// Stamp of the current registration.
    pub token: SessionToken,
    /// Current partner, if paired.
    pub partner: Option<ClientId>,
    /// Interest tags in supplied order.
    pub interests: Vec<String>,
    /// Tag that produced the pairing, if interest-based.
    pub matched_interest: Option<String>,
    /// When this registration was made.
    pub connected_at: DateTime<Utc>,
}

/// Registry, wait pools and pairing RNG. Only reachable through the
/// [`ChatService`] lock.
#[derive(Debug)]
struct ChatState {
    registry: Registry,
    pools: WaitPools,
    rng: StdRng,
}

impl ChatState {
    /// Teardown protocol.
    ///
    /// Closes and removes the session for `id` and, when it was paired,
    /// closes and removes the partner too. With `token` set, a session
    /// carrying a different token is left alone. Returns whether anything
    /// was removed.
    fn teardown(&mut self, id: &ClientId, token: Option<SessionToken>) -> bool {
        let Some(current) = self.registry.get(id) else {
            return false;
        };
        if token.is_some_and(|t| t != current.token) {
            tracing::debug!(client_id = %id, "session already replaced; skipping teardown");
            return false;
        }
        let Some(session) = self.registry.remove(id) else {
            return false;
        };

        session.handle.close();
        self.pools.remove(&session.id, &session.interests);

        if let Some(partner_id) = &session.partner {
            let points_back = self
                .registry
                .get(partner_id)
                .is_some_and(|p| p.partner.as_ref() == Some(id));
            if points_back && let Some(partner) = self.registry.remove(partner_id) {
                partner.handle.close();
                self.pools.remove(&partner.id, &partner.interests);
                tracing::info!(client_id = %partner_id, partner_id = %id, "partner session closed");
            }
        }

        tracing::info!(
            client_id = %id,
            connected_secs = (Utc::now() - session.connected_at).num_seconds(),
            "client disconnected"
        );
        true
    }

    fn notify(&self, id: &ClientId) {
        let Some(session) = self.registry.get(id) else {
            return;
        };
        let notice = OutboundMessage::Pairing(PairingNotice {
            id: session.id.clone(),
            partner_id: session.partner.clone(),
            matched_interest: session.matched_interest.clone(),
        });
        if let Err(error) = session.handle.send(&notice) {
            tracing::warn!(client_id = %id, %error, "failed to send pairing notice");
        }
    }

    fn stats(&self) -> ChatStats {
        ChatStats {
            connected: self.registry.len(),
            paired: self
                .registry
                .sessions()
                .filter(|s| s.partner.is_some())
                .count(),
            waiting_unconditional: self.pools.unconditional().len(),
            waiting_by_interest: self.pools.interest_sizes(),
        }
    }
}

/// Orchestrates connect, relay and disconnect for all clients.
///
/// Every operation runs start to finish inside one [`Mutex`] over the
/// registry, the wait pools and the RNG, so no task ever observes a
/// half-formed pairing or a half-torn-down session. Writes to connections
/// happen under the lock too; [`ConnectionHandle::send`] only enqueues.
#[derive(Debug)]
pub struct ChatService {
    state: Mutex<ChatState>,
}

impl ChatService {
    /// Creates a service whose pairing RNG is seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a service with a deterministic pairing RNG.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(ChatState {
                registry: Registry::new(),
                pools: WaitPools::new(),
                rng,
            }),
        }
    }

    /// Registers a client and tries to pair it.
    ///
    /// An existing session under `id` is torn down first (reconnect path),
    /// which also ends that session's pairing. The new session is enqueued,
    /// matched if possible, and a [`PairingNotice`] is sent to the client
    /// and, when paired, to its partner.
    pub async fn connect(
        &self,
        id: ClientId,
        handle: Box<dyn ConnectionHandle>,
        interests: Vec<String>,
    ) -> Registration {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if state.teardown(&id, None) {
            tracing::info!(client_id = %id, "replaced stale session");
        }

        let token = SessionToken::new();
        state
            .registry
            .insert(Session::new(id.clone(), token, handle, interests.clone()));
        state.pools.enqueue(&id, &interests);

        let pairing = find_partner(&mut state.registry, &mut state.pools, &mut state.rng, &id);

        state.notify(&id);
        match &pairing {
            Some(pairing) => {
                state.notify(&pairing.partner);
                tracing::info!(
                    client_id = %id,
                    partner_id = %pairing.partner,
                    matched_interest = pairing.matched_interest.as_deref().unwrap_or_default(),
                    "clients paired"
                );
            }
            None => {
                tracing::info!(client_id = %id, interests = interests.len(), "client waiting");
            }
        }

        Registration {
            id,
            token,
            partner: pairing.as_ref().map(|p| p.partner.clone()),
            matched_interest: pairing.and_then(|p| p.matched_interest),
        }
    }

    /// Forwards `payload` from the session `from` registered under `token`
    /// to its current partner.
    ///
    /// Best effort, at most once: a replaced sender, a missing partner or a
    /// refused write drops the payload without surfacing anything to the
    /// sender.
    pub async fn relay(
        &self,
        from: &ClientId,
        token: SessionToken,
        payload: Payload,
    ) -> RelayOutcome {
        let state = self.state.lock().await;

        let Some(sender) = state.registry.get(from) else {
            tracing::trace!(client_id = %from, "sender gone; dropping message");
            return RelayOutcome::Dropped;
        };
        if sender.token != token {
            tracing::debug!(client_id = %from, "sender session replaced; dropping message");
            return RelayOutcome::Dropped;
        }
        let Some(partner_id) = sender.partner.as_ref() else {
            tracing::trace!(client_id = %from, "no partner; dropping message");
            return RelayOutcome::Dropped;
        };
        let Some(target) = state.registry.get(partner_id) else {
            tracing::trace!(client_id = %from, partner_id = %partner_id, "partner gone; dropping message");
            return RelayOutcome::Dropped;
        };

        match target.handle.send(&OutboundMessage::Relay(payload)) {
            Ok(()) => RelayOutcome::Delivered,
            Err(error) => {
                tracing::debug!(client_id = %from, partner_id = %partner_id, %error, "relay write failed");
                RelayOutcome::Dropped
            }
        }
    }

    /// Tears down the session registered for `id` under `token`.
    ///
    /// Idempotent: returns `false` if the session is already gone or was
    /// replaced by a reconnect.
    pub async fn disconnect(&self, id: &ClientId, token: SessionToken) -> bool {
        self.state.lock().await.teardown(id, Some(token))
    }

    /// Returns a copy of the session fields for `id`.
    pub async fn session_view(&self, id: &ClientId) -> Option<SessionView> {
        let state = self.state.lock().await;
        state.registry.get(id).map(|s| SessionView {
            id: s.id.clone(),
            token: s.token,
            partner: s.partner.clone(),
            interests: s.interests.clone(),
            matched_interest: s.matched_interest.clone(),
            connected_at: s.connected_at,
        })
    }

    /// Returns counts over the registry and wait pools.
    pub async fn snapshot(&self) -> ChatStats {
        self.state.lock().await.stats()
    }
}

impl Default for ChatService {
    fn default() -> Self {
        Self::new()
    }
}
