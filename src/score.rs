//! Query engine: scores every entry of one repository snapshot against a
//! search string, in parallel, and returns ranked hits.

use neo_frizbee::Scoring;
use rayon::prelude::*;

use crate::types::{MatcherKind, ProgramEntry, QueryContext, Score};

/// Score all entries against the query. Each entry is scored independently
/// and exactly once; ties are broken by original repository order. Only hits
/// with a positive total survive.
pub fn match_and_score_entries<'a>(
    entries: &'a [ProgramEntry],
    context: &QueryContext,
) -> Vec<(&'a ProgramEntry, Score)> {
    let query = context.raw_query.trim();
    if entries.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let has_uppercase = query.chars().any(char::is_uppercase);
    let options = neo_frizbee::Config {
        prefilter: true,
        // a typo budget larger than the needle itself makes no sense
        max_typos: Some(context.max_typos.min(query.len() as u16)),
        sort: false,
        scoring: Scoring {
            capitalization_bonus: if has_uppercase { 8 } else { 0 },
            matching_case_bonus: if has_uppercase { 4 } else { 0 },
            ..Default::default()
        },
    };
    let query_lower = query.to_lowercase();

    let scored: Vec<(usize, &ProgramEntry, Score)> = entries
        .par_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            score_entry(entry, query, &query_lower, &options).map(|score| (index, entry, score))
        })
        .collect();

    rank(scored, context.limit)
}

/// Pure per-entry relevance function. `None` means "excluded from results".
fn score_entry(
    entry: &ProgramEntry,
    query: &str,
    query_lower: &str,
    options: &neo_frizbee::Config,
) -> Option<Score> {
    let name_score = best_match(query, &entry.name, options);
    let stem_score = best_match(query, &entry.stem_lower, options);

    let mut base_score = name_score.max(stem_score);
    let mut match_type = "fuzzy_name";

    if base_score == 0 {
        let description_score = entry
            .description
            .as_deref()
            .map(|description| best_match(query, description, options))
            .unwrap_or(0);
        if description_score == 0 {
            return None;
        }
        base_score = (description_score / 4).max(1);
        match_type = "description";
    }

    let mut name_bonus = 0;
    let mut exact_bonus = 0;
    let mut exact_match = false;

    match entry.matcher {
        MatcherKind::ExecutableName => {
            // An exact executable-name hit ("notepad" for notepad.exe) beats
            // any fuzzy display-name match.
            if entry.stem_lower == query_lower || entry.name_lower == query_lower {
                exact_match = true;
                exact_bonus = 128 + base_score * 2 / 5;
                match_type = "exact_name";
            }
        }
        MatcherKind::DisplayName => {
            if entry.name_lower == query_lower {
                exact_match = true;
                exact_bonus = base_score * 2 / 5;
                match_type = "exact_name";
            } else if stem_score > name_score {
                name_bonus = (base_score / 6).min(30);
            }
        }
    }

    let total = base_score
        .saturating_add(name_bonus)
        .saturating_add(exact_bonus);

    (total > 0).then_some(Score {
        total,
        base_score,
        name_bonus,
        exact_bonus,
        exact_match,
        match_type,
    })
}

#[inline]
fn best_match(query: &str, haystack: &str, options: &neo_frizbee::Config) -> i32 {
    if haystack.is_empty() {
        return 0;
    }
    neo_frizbee::match_list(query, &[haystack], options)
        .first()
        .map(|m| m.score as i32)
        .unwrap_or(0)
}

/// Sort descending by total with a stable tie-break on the original index,
/// then apply the result limit (0 = unlimited).
fn rank<'a>(
    mut scored: Vec<(usize, &'a ProgramEntry, Score)>,
    limit: usize,
) -> Vec<(&'a ProgramEntry, Score)> {
    scored.sort_unstable_by(|a, b| b.2.total.cmp(&a.2.total).then_with(|| a.0.cmp(&b.0)));
    if limit > 0 {
        scored.truncate(limit);
    }
    scored
        .into_iter()
        .map(|(_, entry, score)| (entry, score))
        .collect()
}
