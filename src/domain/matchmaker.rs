//! Pairing algorithms.
//!
//! Two strategies, chosen by whether the new client supplied interest tags:
//!
//! - **Unconditional**: pick a uniformly random partner from the
//!   unconditional pool.
//! - **Interest**: walk the client's tags in supplied order; the first tag
//!   whose pool holds another eligible client wins, and the partner is
//!   picked uniformly at random from that pool.
//!
//! A candidate is eligible when it is not the client itself, is still
//! registered and is unpaired. On success both sessions point at each other
//! and both leave every pool they were waiting in.

use rand::Rng;
use rand::seq::SliceRandom;

use super::{ClientId, Registry, WaitPools};

/// Outcome of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    /// The partner chosen for the new client.
    pub partner: ClientId,
    /// Tag that produced the pairing, if interest-based.
    pub matched_interest: Option<String>,
}

/// Tries to pair the already-registered, already-enqueued `client`.
///
/// Returns `None` when no eligible candidate waits; the client then stays
/// in its pool(s). This is the normal "waiting for match" state, not an
/// error.
pub fn find_partner<R: Rng + ?Sized>(
    registry: &mut Registry,
    pools: &mut WaitPools,
    rng: &mut R,
    client: &ClientId,
) -> Option<Pairing> {
    let session = registry.get(client)?;
    if session.partner.is_some() {
        return None;
    }

    let pairing = if session.has_interests() {
        select_by_interest(registry, pools, rng, client, &session.interests)
    } else {
        select_unconditional(registry, pools, rng, client)
    }?;

    link(registry, pools, client, &pairing);
    Some(pairing)
}

fn select_unconditional<R: Rng + ?Sized>(
    registry: &Registry,
    pools: &WaitPools,
    rng: &mut R,
    client: &ClientId,
) -> Option<Pairing> {
    let partner = pick(registry, pools.unconditional(), rng, client)?;
    Some(Pairing {
        partner,
        matched_interest: None,
    })
}

fn select_by_interest<R: Rng + ?Sized>(
    registry: &Registry,
    pools: &WaitPools,
    rng: &mut R,
    client: &ClientId,
    interests: &[String],
) -> Option<Pairing> {
    interests.iter().find_map(|tag| {
        let partner = pick(registry, pools.interest(tag), rng, client)?;
        tracing::debug!(%client, %partner, interest = %tag, "interest match");
        Some(Pairing {
            partner,
            matched_interest: Some(tag.clone()),
        })
    })
}

/// Uniformly picks an eligible candidate from `pool`, never `client`.
fn pick<R: Rng + ?Sized>(
    registry: &Registry,
    pool: &[ClientId],
    rng: &mut R,
    client: &ClientId,
) -> Option<ClientId> {
    let candidates: Vec<&ClientId> = pool
        .iter()
        .filter(|id| *id != client)
        .filter(|id| registry.get(id).is_some_and(|s| s.partner.is_none()))
        .collect();
    candidates.choose(rng).map(|id| (*id).clone())
}

/// Records the pairing symmetrically and vacates both sides' pools.
fn link(registry: &mut Registry, pools: &mut WaitPools, client: &ClientId, pairing: &Pairing) {
    for (me, other) in [(client, &pairing.partner), (&pairing.partner, client)] {
        if let Some(session) = registry.get_mut(me) {
            session.partner = Some(other.clone());
            session.matched_interest.clone_from(&pairing.matched_interest);
            pools.remove(me, &session.interests);
        }
    }
}
