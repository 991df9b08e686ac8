use tap::Tap;

use super::{NodeIndex, Tree};

use crate::calc::Calculator;
use crate::error::{Error, Result};
use crate::primitive::Envelope;

/// Cut points are searched within this fraction range of the sorted entry list.
const CUT_WINDOW: (f64, f64) = (0.2, 0.8);

impl<T, C: Calculator> Tree<T, C> {
    /// Grafts every pair of overlapping leaf children of `node`.
    pub(super) fn graft_overlapping_leaves(&mut self, node: NodeIndex) -> Result<()> {
        let leaves: Vec<_> = self.nodes[node]
            .children()
            .iter()
            .copied()
            .filter(|&c| self.nodes[c].is_leaf())
            .collect();

        for (i, &a) in leaves.iter().enumerate() {
            for &b in &leaves[i + 1..] {
                let overlap = self
                    .calc
                    .overlap(&self.nodes[a].boundary, &self.nodes[b].boundary);

                if overlap > 0. {
                    self.graft(a, b)?;
                }
            }
        }

        Ok(())
    }

    /// Redistributes the entries of two sibling leaves along the widest axis of their
    /// combined boundary, cutting where the two resulting boundaries overlap the least.
    ///
    /// Entry count is conserved. Either leaf may be left over capacity, in which case the
    /// caller splits it.
    pub(super) fn graft(&mut self, a: NodeIndex, b: NodeIndex) -> Result<()> {
        debug_assert!(self.nodes[a].is_leaf() && self.nodes[b].is_leaf());

        let total = self.nodes[a].len() + self.nodes[b].len();
        if total < 2 {
            return Err(Error::GraftUnderflow(total));
        }

        let axis = self.nodes[a]
            .boundary
            .union(&self.nodes[b].boundary)
            .widest_axis();

        let mut pool = self.nodes[a].take_entries();
        pool.append(&mut self.nodes[b].take_entries());

        let mut pool = {
            let compare = self.calc.sort_comparator(axis, true, false);
            let sorted =
                { pool }.tap_mut(|x| x.sort_by(|p, q| compare(&p.envelope, &q.envelope)));
            sorted
        };

        let cut = best_cut(&pool, |e| &e.envelope, &self.calc, self.param.min_fill());
        let tail = pool.split_off(cut);

        log::trace!(
            "grafted {total} entries along axis {axis}: {}/{}",
            pool.len(),
            tail.len()
        );

        for (leaf, entries) in [(a, pool), (b, tail)] {
            if let Some(slot) = self.nodes[leaf].kind.as_leaf_mut() {
                *slot = entries;
            }
            self.refresh_boundary(leaf);
        }

        Ok(())
    }
}

/// Index `k` such that `items[..k]` and `items[k..]` overlap the least, for `k` inside
/// the cut window. Each side keeps at least `min_fill` items when the list is long
/// enough for that. Ties go to the more balanced cut.
pub(crate) fn best_cut<E, F>(
    items: &[E],
    envelope: F,
    calc: &impl Calculator,
    min_fill: usize,
) -> usize
where
    F: Fn(&E) -> &Envelope,
{
    let Some(first) = items.first() else {
        return 0;
    };

    let n = items.len();

    let window_lo = ((n as f64 * CUT_WINDOW.0).floor() as usize).max(1);
    let window_hi = ((n as f64 * CUT_WINDOW.1).ceil() as usize).min(n - 1);

    let mut lo = window_lo.max(min_fill);
    let mut hi = window_hi.min(n.saturating_sub(min_fill));
    if lo > hi {
        (lo, hi) = (window_lo, window_hi);
    }

    // prefix[k] covers items[..k], suffix[k] covers items[k..]
    let dimension = envelope(first).dimension();
    let mut prefix = vec![Envelope::empty(dimension)];
    let mut suffix = vec![Envelope::empty(dimension)];

    for item in items {
        let next = prefix[prefix.len() - 1].union(envelope(item));
        prefix.push(next);
    }
    for item in items.iter().rev() {
        let next = suffix[suffix.len() - 1].union(envelope(item));
        suffix.push(next);
    }
    suffix.reverse();

    let imbalance = |k: usize| (2 * k).abs_diff(n);

    (lo..=hi)
        .map(|k| (k, calc.overlap(&prefix[k], &suffix[k])))
        .min_by(|(k1, o1), (k2, o2)| {
            o1.total_cmp(o2)
                .then_with(|| imbalance(*k1).cmp(&imbalance(*k2)))
        })
        .map_or(n / 2, |(k, _)| k)
}
