//! Concurrency Filter (§4.5): enforces `max_concurrent` open positions via a
//! single forward pass over sorted entry/exit index pairs.

/// `max_concurrent <= 0` disables filtering (every candidate admitted).
/// Candidates and `exit_indices` must be the same length, sorted ascending
/// by entry index.
pub fn filter_concurrent(
    entry_indices: &[usize],
    exit_indices: &[usize],
    max_concurrent: i64,
) -> Vec<bool> {
    let n = entry_indices.len();
    let mut admitted = vec![false; n];
    if max_concurrent <= 0 {
        return vec![true; n];
    }
    let max_concurrent = max_concurrent as usize;

    let mut open: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        let entry = entry_indices[i];
        open.retain(|&(_, exit)| exit > entry);
        if open.len() < max_concurrent {
            admitted[i] = true;
            open.push((entry, exit_indices[i]));
        }
    }
    admitted
}
