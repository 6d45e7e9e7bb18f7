//! Message rendering for recommendations.
//!
//! Currency is stored in tenths of £m and displayed with one decimal;
//! projected-score deltas get two decimals and an explicit sign.

use crate::types::{ClubId, Recommendation, SwapCandidate, Tenths, Universe};

pub const HEADER: &str = "💡 *Transfer options for this GW*:";
pub const NO_UPGRADES: &str =
    "🤷 *No positive-gain transfers this GW.* Your squad is already the best single-swap option.";

/// `84` → `"£8.4m"`.
pub fn format_price(tenths: Tenths) -> String {
    format!("£{:.1}m", tenths as f64 / 10.0)
}

/// `1.234` → `"+1.23"`.
pub fn format_delta(delta: f64) -> String {
    format!("{delta:+.2}")
}

/// Backslash-escape the characters Telegram's legacy Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Display name, suffixed with the club short name when known.
fn player_label(name: &str, club: Option<&str>) -> String {
    let name = escape_markdown(name);
    match club {
        Some(c) if !c.is_empty() => format!("{name} ({})", escape_markdown(c)),
        _ => name,
    }
}

/// One numbered line per swap.
pub fn format_swap_line(rank: usize, swap: &SwapCandidate, universe: Option<&Universe>) -> String {
    let club = |id: ClubId| universe.and_then(|u| u.club_name(id));
    format!(
        "{rank}. *{}* → *{}* _(ΔxP {}, {} → {})_",
        player_label(&swap.sell.display_name, club(swap.sell.club)),
        player_label(&swap.buy.display_name, club(swap.buy.club)),
        format_delta(swap.score_delta),
        format_price(swap.sell_cost),
        format_price(swap.buy_cost),
    )
}

/// Full message body, Markdown-formatted.
pub fn format_message(rec: &Recommendation, universe: Option<&Universe>) -> String {
    match rec {
        Recommendation::NoUpgrades => NO_UPGRADES.to_string(),
        Recommendation::Swaps(swaps) => {
            let mut lines = Vec::with_capacity(swaps.len() + 1);
            lines.push(HEADER.to_string());
            lines.extend(
                swaps
                    .iter()
                    .enumerate()
                    .map(|(i, s)| format_swap_line(i + 1, s, universe)),
            );
            lines.join("\n")
        }
    }
}
