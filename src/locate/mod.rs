//! Tiered text location.
//!
//! PDF producers split logical strings across show operations in ways that
//! survive into the extracted runs, so a single exact comparison misses
//! real-world matches. The locator tries four tiers in order and the first
//! success wins, which keeps exact matches from ever losing to looser ones.

use crate::extract::GlyphRun;
use crate::fonts::{self, FontStyle};
use log::debug;

/// Minimum run length for the reverse-containment tier, so one-letter runs
/// cannot claim arbitrary searches.
pub const MIN_CONTAINED_RUN_LEN: usize = 3;

/// Number of leading characters compared by the prefix tier.
pub const PREFIX_PROBE_LEN: usize = 4;

/// Fraction of the search string the fuzzy tier must find in a run.
pub const FUZZY_SEARCH_FRACTION: f32 = 0.5;

/// Fraction of the run the fuzzy tier must find in the search string.
pub const FUZZY_RUN_FRACTION: f32 = 0.8;

/// Matching strategy that accepted a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Run text contains the search string
    Contains,
    /// Search string contains the whole run text
    ContainedIn,
    /// Run text starts with the search prefix
    Prefix,
    /// Character-overlap score cleared the fuzzy threshold
    Fuzzy,
}

/// A located run, with where in its text the search matched.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    /// Owning copy of the matched run
    pub run: GlyphRun,
    /// Byte offset of the match start within the run text; 0 for tiers that
    /// match the run as a whole
    pub offset: usize,
    /// Byte length of the matched slice of the run text
    pub length: usize,
    /// Tier that accepted the match
    pub tier: MatchTier,
}

impl TextMatch {
    /// The run narrowed to the matched span.
    ///
    /// A mid-run match must not claim the whole line: the anchor moves right
    /// by the measured width of the unmatched prefix and the width shrinks
    /// to the matched text, so a cover placed over the result hides only
    /// what is being replaced. Whole-run matches come back unchanged, their
    /// measured width intact.
    pub fn matched_run(&self) -> GlyphRun {
        let mut run = self.run.clone();
        if self.offset == 0 && self.length >= run.text.len() {
            return run;
        }
        let base14 = FontStyle::from_font_name(&run.font_name).base14_name();
        let prefix = &self.run.text[..self.offset];
        let matched = &self.run.text[self.offset..self.offset + self.length];
        run.x += fonts::text_width(prefix, base14, run.font_size);
        run.width = fonts::text_width(matched, base14, run.font_size);
        run
    }
}

/// Locate `search` among the page's glyph runs.
///
/// Tiers run strictly in order over all runs; within a tier the first run in
/// content-stream order wins, except the fuzzy tier which takes the
/// best-scoring run above threshold.
pub fn locate(runs: &[GlyphRun], search: &str) -> Option<TextMatch> {
    if search.is_empty() || runs.is_empty() {
        return None;
    }

    // Tier 1: run contains search
    for run in runs {
        if let Some(offset) = run.text.find(search) {
            debug!("matched {:?} in run {} (contains)", search, run.id);
            return Some(TextMatch {
                run: run.clone(),
                offset,
                length: search.len(),
                tier: MatchTier::Contains,
            });
        }
    }

    // Tier 2: search contains the run, run long enough to be meaningful
    for run in runs {
        if run.text.chars().count() >= MIN_CONTAINED_RUN_LEN && search.contains(&run.text) {
            debug!("matched {:?} in run {} (contained-in)", search, run.id);
            return Some(TextMatch {
                run: run.clone(),
                offset: 0,
                length: run.text.len(),
                tier: MatchTier::ContainedIn,
            });
        }
    }

    // Tier 3: run starts with the search prefix
    let probe: String = search.chars().take(PREFIX_PROBE_LEN).collect();
    for run in runs {
        if run.text.starts_with(&probe) {
            debug!("matched {:?} in run {} (prefix {:?})", search, run.id, probe);
            return Some(TextMatch {
                run: run.clone(),
                offset: 0,
                length: run.text.len(),
                tier: MatchTier::Prefix,
            });
        }
    }

    // Tier 4: character overlap
    let mut best: Option<(&GlyphRun, usize)> = None;
    for run in runs {
        let count = overlap_count(search, &run.text);
        let search_len = search.chars().count() as f32;
        let run_len = run.text.chars().count() as f32;
        let threshold = (FUZZY_SEARCH_FRACTION * search_len).min(FUZZY_RUN_FRACTION * run_len);
        if (count as f32) >= threshold && best.map_or(true, |(_, c)| count > c) {
            best = Some((run, count));
        }
    }
    if let Some((run, count)) = best {
        debug!(
            "matched {:?} in run {} (fuzzy, {} chars overlap)",
            search, run.id, count
        );
        return Some(TextMatch {
            run: run.clone(),
            offset: 0,
            length: run.text.len(),
            tier: MatchTier::Fuzzy,
        });
    }

    debug!("no run matched {:?}", search);
    None
}

/// Number of search characters present in the run text.
fn overlap_count(search: &str, run_text: &str) -> usize {
    search.chars().filter(|&c| run_text.contains(c)).count()
}
