//! Vote aggregation and ranking.
//!
//! Everything here is a pure function over a snapshot of pairs and tallies.
//! Results must be recomputed after every successful vote.

use crate::errors::EmptyInputError;
use crate::models::{
    DesignPair, RankedEntry, ResultEntry, ResultsResponse, Side, TopPick, VoteTally,
};
use chrono::Local;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub original: u64,
    pub ai: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TotalVotes,
    OriginalVotes,
    AiVotes,
    OriginalShare,
    AiShare,
}

pub fn total_votes(tally: &VoteTally) -> u64 {
    tally.original.saturating_add(tally.ai)
}

/// Whole-number percentages for each side.
///
/// Each side is rounded on its own (half up), so the pair can sum to 99 or 101.
pub fn percentage_split(tally: &VoteTally) -> (u8, u8) {
    let total = total_votes(tally);
    if total == 0 {
        return (0, 0);
    }
    (
        rounded_percent(tally.original, total),
        rounded_percent(tally.ai, total),
    )
}

fn rounded_percent(count: u64, total: u64) -> u8 {
    let count = u128::from(count);
    let total = u128::from(total);
    ((200 * count + total) / (2 * total)) as u8
}

/// Fraction of the pair's votes that went to `side`; 0.0 with no votes.
pub fn share(tally: &VoteTally, side: Side) -> f64 {
    let total = total_votes(tally);
    if total == 0 {
        0.0
    } else {
        tally.count(side) as f64 / total as f64
    }
}

pub fn aggregate_totals<'a>(tallies: impl IntoIterator<Item = &'a VoteTally>) -> Totals {
    tallies.into_iter().fold(Totals::default(), |acc, tally| {
        let original = acc.original.saturating_add(tally.original);
        let ai = acc.ai.saturating_add(tally.ai);
        Totals {
            original,
            ai,
            total: original.saturating_add(ai),
        }
    })
}

/// Unrounded percentage of all votes cast for each side.
pub fn overall_split(totals: &Totals) -> (f64, f64) {
    if totals.total == 0 {
        return (0.0, 0.0);
    }
    let total = totals.total as f64;
    (
        totals.original as f64 / total * 100.0,
        totals.ai as f64 / total * 100.0,
    )
}

/// Joins pairs with their tallies in catalog order. Pairs without a row get zero votes.
pub fn join_tallies(pairs: &[DesignPair], tallies: &BTreeMap<String, VoteTally>) -> Vec<RankedEntry> {
    pairs
        .iter()
        .map(|pair| {
            let votes = tallies.get(&pair.id).copied().unwrap_or_default();
            RankedEntry {
                pair: pair.clone(),
                total: total_votes(&votes),
                original_share: share(&votes, Side::Original),
                votes,
            }
        })
        .collect()
}

pub fn rank_by_total(entries: &[RankedEntry]) -> Vec<RankedEntry> {
    top_n(entries, entries.len(), SortKey::TotalVotes)
}

/// The entry with the highest share of votes for `side`. First in input order wins ties.
pub fn top_by_preference(entries: &[RankedEntry], side: Side) -> Result<&RankedEntry, EmptyInputError> {
    let key = match side {
        Side::Original => SortKey::OriginalShare,
        Side::Ai => SortKey::AiShare,
    };
    // max_by keeps the last maximum; fold keeps the first.
    entries
        .iter()
        .fold(None, |best: Option<&RankedEntry>, entry| match best {
            Some(current) if compare(entry, current, key) != Ordering::Greater => Some(current),
            _ => Some(entry),
        })
        .ok_or(EmptyInputError)
}

/// The `n` highest entries under `key`, descending, ties in input order.
pub fn top_n(entries: &[RankedEntry], n: usize, key: SortKey) -> Vec<RankedEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| compare(b, a, key));
    sorted.truncate(n);
    sorted
}

fn compare(a: &RankedEntry, b: &RankedEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::TotalVotes => total_votes(&a.votes).cmp(&total_votes(&b.votes)),
        SortKey::OriginalVotes => a.votes.original.cmp(&b.votes.original),
        SortKey::AiVotes => a.votes.ai.cmp(&b.votes.ai),
        SortKey::OriginalShare => compare_share(&a.votes, &b.votes, Side::Original),
        SortKey::AiShare => compare_share(&a.votes, &b.votes, Side::Ai),
    }
}

// Compares count/total fractions exactly by cross-multiplying.
fn compare_share(a: &VoteTally, b: &VoteTally, side: Side) -> Ordering {
    let (a_num, a_den) = share_fraction(a, side);
    let (b_num, b_den) = share_fraction(b, side);
    (a_num * b_den).cmp(&(b_num * a_den))
}

fn share_fraction(tally: &VoteTally, side: Side) -> (u128, u128) {
    match total_votes(tally) {
        0 => (0, 1),
        total => (u128::from(tally.count(side)), u128::from(total)),
    }
}

pub fn build_results(entries: &[RankedEntry]) -> ResultsResponse {
    let totals = aggregate_totals(entries.iter().map(|entry| &entry.votes));
    let (original_pct, ai_pct) = overall_split(&totals);

    let ranked = rank_by_total(entries)
        .into_iter()
        .map(|entry| {
            let (pct_original, pct_ai) = percentage_split(&entry.votes);
            ResultEntry {
                id: entry.pair.id,
                name: entry.pair.name,
                price: entry.pair.price,
                original_image_url: entry.pair.original_image_url,
                ai_image_url: entry.pair.ai_image_url,
                original: entry.votes.original,
                ai: entry.votes.ai,
                total: entry.total,
                pct_original,
                pct_ai,
            }
        })
        .collect();

    ResultsResponse {
        generated_at: Local::now().to_rfc3339(),
        total_votes: totals.total,
        total_original: totals.original,
        total_ai: totals.ai,
        original_pct,
        ai_pct,
        top_original: top_by_preference(entries, Side::Original)
            .ok()
            .map(|entry| top_pick(entry, Side::Original)),
        top_ai: top_by_preference(entries, Side::Ai)
            .ok()
            .map(|entry| top_pick(entry, Side::Ai)),
        ranked,
    }
}

fn top_pick(entry: &RankedEntry, side: Side) -> TopPick {
    let image_url = match side {
        Side::Original => &entry.pair.original_image_url,
        Side::Ai => &entry.pair.ai_image_url,
    };
    TopPick {
        id: entry.pair.id.clone(),
        name: entry.pair.name.clone(),
        description: entry.pair.description.clone(),
        image_url: image_url.clone(),
        share_pct: share(&entry.votes, side) * 100.0,
    }
}
