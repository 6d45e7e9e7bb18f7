//! Feasibility filter.
//!
//! Decides which (owned, candidate) pairs are legal one-for-one swaps under
//! the bank budget and the per-club quota.

use tracing::debug;

use crate::types::{Budget, ClubQuota, Player, Squad, Universe};

/// A legal swap before scoring.
#[derive(Debug, Clone, Copy)]
pub struct FeasiblePair<'a> {
    pub sell: &'a Player,
    pub buy: &'a Player,
}

/// Enumerate every legal one-for-one swap.
///
/// Pairs come out in squad order, then ascending universe id. Callers must
/// not rely on that order; the ranker imposes its own.
pub fn feasible_swaps<'a>(
    squad: &'a Squad,
    universe: &'a Universe,
    budget: Budget,
) -> Vec<FeasiblePair<'a>> {
    let quota = squad.club_quota();
    let mut pairs = Vec::new();

    for sell in squad.players() {
        let before = pairs.len();
        let available_budget = budget.saturating_add(sell.cost);
        let adjusted = quota.after_sale(sell.club);

        pairs.extend(
            candidate_pool(sell, squad, universe)
                .filter(|buy| is_affordable(buy, available_budget))
                .filter(|buy| fits_quota(buy, &adjusted))
                .map(|buy| FeasiblePair { sell, buy }),
        );

        debug!(
            sell = %sell.display_name,
            available_budget,
            feasible = pairs.len() - before,
            "Feasible replacements enumerated"
        );
    }

    pairs
}

/// Unowned, selectable players in the same position as `sell`.
fn candidate_pool<'a>(
    sell: &'a Player,
    squad: &'a Squad,
    universe: &'a Universe,
) -> impl Iterator<Item = &'a Player> + 'a {
    universe.players().iter().filter(move |p| {
        !squad.owns(p.id) && p.position == sell.position && p.availability.is_selectable()
    })
}

/// Budget check. Inclusive: a candidate costing exactly the available
/// budget is affordable.
fn is_affordable(buy: &Player, available_budget: Budget) -> bool {
    buy.cost <= available_budget
}

/// `adjusted` must already have the outgoing player's club decremented.
fn fits_quota(buy: &Player, adjusted: &ClubQuota) -> bool {
    adjusted.has_room_for(buy.club)
}
