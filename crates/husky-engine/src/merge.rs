//! Filter, rank and cap retrieval results, then flatten them into prompt
//! context.

use std::cmp::Ordering;

use husky_types::{MergePolicy, RetrievalResult};

/// Results eligible under `policy`, best first.
///
/// Both bounds are strict: a result scoring exactly the threshold, or whose
/// text is exactly `min_text_len` characters long, is dropped. The sort is
/// stable, so equal scores keep their retrieval order. Length is counted
/// on `text` as normalized by [`crate::retrieval::normalize_point`], which
/// trims surrounding whitespace from the stored body.
pub fn select(results: Vec<RetrievalResult>, policy: &MergePolicy) -> Vec<RetrievalResult> {
    let mut eligible: Vec<RetrievalResult> = results
        .into_iter()
        .filter(|r| r.score > policy.threshold && r.text.chars().count() > policy.min_text_len)
        .collect();

    eligible.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    eligible.truncate(policy.cap);
    eligible
}

/// One context line per result, directory pool first
pub fn context_lines(directory: &[RetrievalResult], non_directory: &[RetrievalResult]) -> Vec<String> {
    directory
        .iter()
        .chain(non_directory)
        .map(RetrievalResult::context_line)
        .collect()
}

pub fn merge_context(directory: &[RetrievalResult], non_directory: &[RetrievalResult]) -> String {
    context_lines(directory, non_directory).join("\n")
}
