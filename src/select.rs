//! Partial ascending selection of the tuples closest to exhaustion

/// Move the `top_n` smallest items (by `key`) to the front of `items`, in
/// ascending order, and return how many positions were resolved.
///
/// `top_n` is clamped to `items.len()`. Items with equal keys keep their
/// relative order, so the earliest discovered tuple wins a tie. Positions
/// after the returned count are left in their original relative order.
pub fn select_top_n<T, K, F>(items: &mut [T], top_n: usize, mut key: F) -> usize
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    let top_n = top_n.min(items.len());

    for i in 0..top_n {
        let mut min_index = i;
        let mut min_key = key(&items[i]);
        for (j, item) in items.iter().enumerate().skip(i + 1) {
            let candidate = key(item);
            // strict comparison: a later equal key never overtakes
            if candidate < min_key {
                min_index = j;
                min_key = candidate;
            }
        }
        if min_index != i {
            items[i..=min_index].rotate_right(1);
        }
    }

    top_n
}
