use std::cmp::Ordering;

use derive_more::Display;

use super::{Node, NodeIndex, NodeKind, Tree};

use crate::calc::Calculator;
use crate::error::{Error, Result};
use crate::primitive::Envelope;

/// How the two seed elements of a split are picked.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitPolicy {
    /// The pair of elements lying furthest apart, as measured by
    /// [`Calculator::distance`].
    #[default]
    Linear,

    /// The pair of elements which would waste the most space if grouped together, that
    /// is, maximizing `space(a ∪ b) - space(a) - space(b)`.
    Quadratic,
}

/* ---------------------------------------- Node Split ---------------------------------------- */

impl<T, C: Calculator> Tree<T, C> {
    /// Splits `node` into two detached nodes which partition its elements, and disposes
    /// the original. Internal halves left with a single child collapse into that child.
    pub(super) fn split_node(&mut self, node: NodeIndex) -> Result<(NodeIndex, NodeIndex)> {
        let len = self.nodes[node].len();
        if len < 2 {
            return Err(Error::SplitUnderflow(len));
        }

        let Some(Node { kind, .. }) = self.nodes.remove(node) else {
            unreachable!("split target vanished")
        };

        let policy = self.param.split_policy;
        let min_fill = self.param.min_fill();

        match kind {
            NodeKind::Leaf(entries) => {
                let [minus, plus] =
                    distribute(entries, |e| &e.envelope, &self.calc, policy, min_fill)?;

                Ok((self.make_leaf(minus), self.make_leaf(plus)))
            }
            NodeKind::Internal(children) => {
                let items = children
                    .into_iter()
                    .map(|c| (self.nodes[c].boundary.clone(), c))
                    .collect();

                let [minus, plus] =
                    distribute(items, |(e, _)| e, &self.calc, policy, min_fill)?;

                let minus = minus.into_iter().map(|(_, c)| c).collect();
                let plus = plus.into_iter().map(|(_, c)| c).collect();

                Ok((self.make_internal(minus), self.make_internal(plus)))
            }
        }
    }
}

/* ----------------------------------------- Algorithm ------------------------------------------ */

/// Partitions `items` into two groups.
///
/// Both groups start from a seed picked by `policy`; every other item goes to the group
/// whose boundary grows the least by taking it, the smaller group winning ties. A group
/// which could no longer reach `min_fill` items otherwise takes all that remain.
pub(crate) fn distribute<E, F>(
    mut items: Vec<E>,
    envelope: F,
    calc: &impl Calculator,
    policy: SplitPolicy,
    min_fill: usize,
) -> Result<[Vec<E>; 2]>
where
    F: Fn(&E) -> &Envelope,
{
    let total = items.len();
    if total < 2 {
        return Err(Error::SplitUnderflow(total));
    }

    let (i, j) = pick_seeds(&items, &envelope, calc, policy);
    debug_assert!(i < j);

    let seed_plus = items.remove(j);
    let seed_minus = items.remove(i);

    let mut bounds = [envelope(&seed_minus).clone(), envelope(&seed_plus).clone()];
    let mut groups = [vec![seed_minus], vec![seed_plus]];
    let mut remaining = items.len();

    for item in items {
        let env = envelope(&item);

        let side = if groups[0].len() + remaining <= min_fill {
            0
        } else if groups[1].len() + remaining <= min_fill {
            1
        } else {
            let grow_minus = calc.enlargement(&bounds[0], env);
            let grow_plus = calc.enlargement(&bounds[1], env);

            match grow_minus.total_cmp(&grow_plus) {
                Ordering::Less => 0,
                Ordering::Greater => 1,
                Ordering::Equal if groups[1].len() < groups[0].len() => 1,
                Ordering::Equal => 0,
            }
        };

        bounds[side].extend(env);
        groups[side].push(item);
        remaining -= 1;
    }

    log::trace!(
        "{policy} split of {total} elements into {}/{}",
        groups[0].len(),
        groups[1].len()
    );

    Ok(groups)
}

/// Index pair `(i, j)` with `i < j` of the best seed candidates.
fn pick_seeds<E, F>(
    items: &[E],
    envelope: &F,
    calc: &impl Calculator,
    policy: SplitPolicy,
) -> (usize, usize)
where
    F: Fn(&E) -> &Envelope,
{
    let mut best: Option<(usize, usize, f64)> = None;

    for i in 0..items.len() {
        for j in i + 1..items.len() {
            let (a, b) = (envelope(&items[i]), envelope(&items[j]));

            let score = match policy {
                SplitPolicy::Linear => calc.distance(a, b),
                SplitPolicy::Quadratic => {
                    calc.space(&a.union(b)) - calc.space(a) - calc.space(b)
                }
            };

            if best.map_or(true, |(.., s)| score > s) {
                best = Some((i, j, score));
            }
        }
    }

    match best {
        Some((i, j, _)) => (i, j),
        None => unreachable!("seed selection exhausted every candidate pair"),
    }
}
