use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::types::Rect;

/// Candidate cut positions for one region, one sorted sequence per axis.
pub type CandidatePair = (Vec<u32>, Vec<u32>);

/// Precomputed normal points for one container/item pair.
///
/// A normal point is a coordinate of the form `r*l + s*w` for non-negative
/// `r`, `s`; only such coordinates can be optimal guillotine-cut locations,
/// which shrinks the cut search space from `O(D)` to `O((D/l)*(D/w))` per
/// axis. The full per-axis sets are built once at construction and are
/// immutable afterwards; per-region queries only filter them.
#[derive(Debug)]
pub struct CoordGenerator {
    item: Rect,
    min_side: u32,
    full_x: Vec<u32>,
    full_y: Vec<u32>,
    // Filtered prefixes per (length, width) query. Guarded so that concurrent
    // first-time lookups for the same key cannot race.
    memo: Mutex<HashMap<(u32, u32), Arc<CandidatePair>>>,
}

impl CoordGenerator {
    pub fn new(container: Rect, item: Rect) -> Self {
        let min_side = item.length.min(item.width);
        Self {
            item,
            min_side,
            full_x: normal_points(container.length, item, min_side),
            full_y: normal_points(container.width, item, min_side),
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Cut candidates for a `length` x `width` region: the prefixes of the
    /// full per-axis sets not exceeding `length - w` (resp. `width - w`),
    /// where `w` is the minimal item side. Empty on both axes when the region
    /// cannot hold the item in any orientation.
    pub fn candidates(&self, length: u32, width: u32) -> Arc<CandidatePair> {
        if length < self.min_side || width < self.min_side {
            return Arc::new((Vec::new(), Vec::new()));
        }

        let key = (length, width);
        let mut memo = self.memo.lock().unwrap();
        if let Some(cached) = memo.get(&key) {
            return Arc::clone(cached);
        }

        let x_end = self.full_x.partition_point(|&v| v <= length - self.min_side);
        let y_end = self.full_y.partition_point(|&v| v <= width - self.min_side);
        let entry = Arc::new((
            self.full_x[..x_end].to_vec(),
            self.full_y[..y_end].to_vec(),
        ));
        memo.insert(key, Arc::clone(&entry));
        entry
    }

    /// Upper bound on the item count for a `length` x `width` region,
    /// restricted to normal points: `floor(L* * W* / (l * w))` for the
    /// largest precomputed candidates `L* <= length`, `W* <= width`.
    ///
    /// Tighter than the plain area bound for most sub-regions. The full sets
    /// are truncated at `container - w`, so for regions near container size
    /// this can drop below the lower bound; the solver's equality checks
    /// simply never fire there.
    pub fn upper_bound(&self, length: u32, width: u32) -> u64 {
        if length < self.min_side || width < self.min_side {
            return 0;
        }

        let x_end = self.full_x.partition_point(|&v| v <= length);
        if x_end == 0 {
            return 0;
        }
        let y_end = self.full_y.partition_point(|&v| v <= width);
        if y_end == 0 {
            return 0;
        }

        let l_star = self.full_x[x_end - 1] as u64;
        let w_star = self.full_y[y_end - 1] as u64;
        (l_star * w_star) / self.item.area()
    }

    #[cfg(test)]
    fn memo_len(&self) -> usize {
        self.memo.lock().unwrap().len()
    }
}

/// All values `r*l + s*w <= max - min_side`, sorted ascending, deduplicated.
fn normal_points(max: u32, item: Rect, min_side: u32) -> Vec<u32> {
    if max < min_side {
        return Vec::new();
    }
    let limit = max - min_side;

    let mut unique = BTreeSet::new();
    for r in 0..=max / item.length {
        for s in 0..=max / item.width {
            let value = r * item.length + s * item.width;
            if value <= limit {
                unique.insert(value);
            }
        }
    }
    unique.into_iter().collect()
}
