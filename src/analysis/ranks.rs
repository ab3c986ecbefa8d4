use std::cmp::Ordering;

/// 1-based ranks, ties share the average of the ranks they span
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let order = sorted_indices(values);
    let mut ranks = vec![0.0; values.len()];

    let mut start = 0;
    while start < order.len() {
        let end = tie_run_end(values, &order, start);
        // ranks start..end (0-based) become (start+1 + end) / 2
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }

    ranks
}

fn sorted_indices(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| compare(values[a], values[b]));
    order
}

fn tie_run_end(values: &[f64], order: &[usize], start: usize) -> usize {
    let first = values[order[start]];
    order[start..]
        .iter()
        .position(|&idx| compare(values[idx], first) != Ordering::Equal)
        .map_or(order.len(), |offset| start + offset)
}

fn compare(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}
