//! Run compositor: merge overlapping style runs into a tiling of the source.
//!
//! Every run boundary becomes a cut point. Each interval between adjacent
//! cut points carries the runs covering it, ordered so that enclosing runs
//! come first. The renderer can then open and close elements with a plain
//! stack and never produce crossed tags.

use crate::error::RunError;
use crate::model::{ComposedSpan, Composition, RunCategory, RunKind, StyleRun};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

/// Where link-category runs (links, anchors) nest relative to lexical runs
/// when both cover the same interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NestingPolicy {
    /// `<span class="keyword"><a href=..>..</a></span>`
    #[default]
    LinksInnermost,
    /// `<a href=..><span class="keyword">..</span></a>`
    LinksOutermost,
}

impl NestingPolicy {
    fn rank(self, category: RunCategory) -> u8 {
        match (self, category) {
            (NestingPolicy::LinksInnermost, RunCategory::Lexical) => 0,
            (NestingPolicy::LinksInnermost, RunCategory::Link) => 1,
            (NestingPolicy::LinksOutermost, RunCategory::Link) => 0,
            (NestingPolicy::LinksOutermost, RunCategory::Lexical) => 1,
        }
    }
}

/// Compose the union of all producers' runs for one file.
///
/// `runs` must be in production order (all of the first producer's runs,
/// then the next producer's); that order breaks the final ties. Identical
/// runs (same range, same kind) collapse into one.
pub fn compose(
    source: &str,
    runs: &[StyleRun],
    policy: NestingPolicy,
) -> Result<Composition, RunError> {
    let len = source.len();

    let mut table: Vec<StyleRun> = Vec::with_capacity(runs.len());
    let mut seen: HashSet<(usize, usize, &RunKind)> = HashSet::with_capacity(runs.len());
    for run in runs {
        run.validate(source)?;
        if seen.insert((run.start, run.end, &run.kind)) {
            table.push(run.clone());
        }
    }

    let mut cuts: BTreeSet<usize> = BTreeSet::new();
    cuts.insert(0);
    cuts.insert(len);
    for run in &table {
        cuts.insert(run.start);
        cuts.insert(run.end);
    }
    let cuts: Vec<usize> = cuts.into_iter().collect();

    // Spanning runs sorted by start; the sweep pulls them in as it passes.
    let mut by_start: Vec<usize> = (0..table.len()).filter(|&i| !table[i].is_empty()).collect();
    by_start.sort_by_key(|&i| (table[i].start, i));
    let mut pending = by_start.into_iter().peekable();

    let mut markers: Vec<usize> = (0..table.len()).filter(|&i| table[i].is_empty()).collect();
    markers.sort_by_key(|&i| (table[i].start, i));
    let mut markers = markers.into_iter().peekable();

    let mut spans = Vec::with_capacity(cuts.len());
    let mut live: Vec<usize> = Vec::new();

    for window in cuts.windows(2) {
        let (start, end) = (window[0], window[1]);

        live.retain(|&i| table[i].end > start);
        while let Some(&i) = pending.peek() {
            if table[i].start > start {
                break;
            }
            live.push(i);
            pending.next();
        }

        let mut active = live.clone();
        active.sort_by_key(|&i| {
            let run = &table[i];
            (policy.rank(run.category()), run.start, Reverse(run.end), i)
        });

        let mut here = Vec::new();
        while let Some(&i) = markers.peek() {
            if table[i].start != start {
                break;
            }
            here.push(i);
            markers.next();
        }

        spans.push(ComposedSpan {
            start,
            end,
            active,
            markers: here,
        });
    }

    // Whatever is left sits at end of file.
    let trailing: Vec<usize> = markers.collect();

    Ok(Composition {
        runs: table,
        spans,
        trailing,
    })
}
