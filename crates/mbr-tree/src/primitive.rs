/* ---------------------------------------------------------------------------------------------- */
/*                                            ENVELOPE                                            */
/* ---------------------------------------------------------------------------------------------- */

use crate::error::{Error, Result};

pub type AxisIndex = usize;

/// An n-dimensional axis-aligned box, the minimum bounding rectangle of whatever the
/// caller indexes.
///
/// An envelope either covers at least one point (`lower[i] <= upper[i]` on every axis)
/// or is *empty*, in which case it is the neutral element of [`Envelope::union`]. Empty
/// envelopes are stored as `+inf..-inf` on every axis, so that extending one by any other
/// envelope naturally yields the other.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Envelope {
    /// Creates a new envelope from two corner points.
    ///
    /// The corners are normalized per axis, so that the lower bound is always less than
    /// or equal to the upper bound. Fails if the corners disagree on dimension, or if any
    /// coordinate is NaN.
    pub fn new(p1: impl Into<Vec<f64>>, p2: impl Into<Vec<f64>>) -> Result<Self> {
        let mut lower = p1.into();
        let mut upper = p2.into();

        if lower.len() != upper.len() {
            return Err(Error::DimensionMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }

        for (axis, (a, b)) in lower.iter_mut().zip(upper.iter_mut()).enumerate() {
            if let Some(value) = [*a, *b].into_iter().find(|x| x.is_nan()) {
                return Err(Error::InvalidCoordinate { axis, value });
            }

            if a > b {
                std::mem::swap(a, b);
            }
        }

        Ok(Self { lower, upper })
    }

    /// Zero-span envelope around a single point.
    pub fn point(p: impl Into<Vec<f64>>) -> Result<Self> {
        let p = p.into();
        Self::new(p.clone(), p)
    }

    /// The empty envelope of given dimension; covers no point at all.
    pub fn empty(dimension: usize) -> Self {
        Self {
            lower: vec![f64::INFINITY; dimension],
            upper: vec![f64::NEG_INFINITY; dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// True if this envelope covers no point. A zero-span (point or line) envelope is
    /// *not* empty.
    pub fn is_empty(&self) -> bool {
        self.lower.iter().zip(&self.upper).any(|(a, b)| a > b)
    }

    /// Length of the envelope along `axis`; zero for empty envelopes.
    pub fn span(&self, axis: AxisIndex) -> f64 {
        (self.upper[axis] - self.lower[axis]).max(0.)
    }

    pub fn center(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(a, b)| (a + b) / 2.)
            .collect()
    }

    /// The axis with the largest span. Ties resolve to the lowest axis index.
    pub fn widest_axis(&self) -> AxisIndex {
        (0..self.dimension()).fold(0, |best, axis| {
            if self.span(axis) > self.span(best) {
                axis
            } else {
                best
            }
        })
    }

    /// Grows this envelope to cover `other` as well. Empty envelopes are skipped.
    pub fn extend(&mut self, other: &Self) {
        debug_assert_eq!(self.dimension(), other.dimension());

        if other.is_empty() {
            return;
        }

        for i in 0..self.lower.len() {
            self.lower[i] = self.lower[i].min(other.lower[i]);
            self.upper[i] = self.upper[i].max(other.upper[i]);
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.extend(other);
        result
    }

    /// Intersection of two envelopes, which may be empty.
    pub fn intersection(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dimension(), other.dimension());

        let mut lower = self.lower.clone();
        let mut upper = self.upper.clone();

        for i in 0..lower.len() {
            lower[i] = lower[i].max(other.lower[i]);
            upper[i] = upper[i].min(other.upper[i]);
        }

        Self { lower, upper }
    }

    /// Closed-interval intersection test; touching boundaries count as intersecting.
    pub fn intersects(&self, other: &Self) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());

        if self.is_empty() || other.is_empty() {
            return false;
        }

        for i in 0..self.lower.len() {
            if other.upper[i] < self.lower[i] || self.upper[i] < other.lower[i] {
                return false;
            }
        }
        true
    }

    /// True if `other` lies entirely within this envelope, boundaries included.
    pub fn contains(&self, other: &Self) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());

        if self.is_empty() || other.is_empty() {
            return false;
        }

        for i in 0..self.lower.len() {
            if other.lower[i] < self.lower[i] || self.upper[i] < other.upper[i] {
                return false;
            }
        }
        true
    }
}

/* ---------------------------------------------------------------------------------------------- */
/*                                        COORDINATE SPACE                                        */
/* ---------------------------------------------------------------------------------------------- */

/// The coordinate space every envelope stored in a tree shares.
///
/// The tree itself only cares about the dimension. The reference system identifier is
/// carried for the surrounding store; transforming between reference systems is the
/// caller's business.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Space {
    pub dimension: usize,
    pub crs: Option<String>,
}

impl Space {
    pub fn cartesian(dimension: usize) -> Self {
        Self {
            dimension,
            crs: None,
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Rejects envelopes which do not live in this space.
    pub fn check(&self, envelope: &Envelope) -> Result<()> {
        if envelope.dimension() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: envelope.dimension(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod __test {
    use super::*;

    fn rect(p1: [f64; 2], p2: [f64; 2]) -> Envelope {
        Envelope::new(p1, p2).unwrap()
    }

    #[test]
    fn corners_are_normalized() {
        let e = rect([4., 1.], [2., 3.]);
        assert_eq!(e.lower(), &[2., 1.]);
        assert_eq!(e.upper(), &[4., 3.]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            Envelope::new([0., 0.], [1., 1., 1.]),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert!(matches!(
            Envelope::new([0., f64::NAN], [1., 1.]),
            Err(Error::InvalidCoordinate { axis: 1, .. })
        ));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = rect([0., 0.], [1., 1.]);
        let b = rect([1., 1.], [2., 2.]);
        let c = rect([1.5, 0.], [2., 0.5]);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&Envelope::point([0.5, 0.5]).unwrap()));
    }

    #[test]
    fn empty_is_neutral() {
        let a = rect([0., 0.], [1., 2.]);
        let empty = Envelope::empty(2);

        assert!(empty.is_empty());
        assert!(!Envelope::point([3., 3.]).unwrap().is_empty());
        assert_eq!(empty.union(&a), a);
        assert_eq!(a.union(&empty), a);
        assert!(!empty.intersects(&a));
        assert!(!a.contains(&empty));
        assert_eq!(empty.span(0), 0.);
    }

    #[test]
    fn containment_and_intersection() {
        let outer = rect([0., 0.], [10., 10.]);
        let inner = rect([2., 2.], [10., 4.]);
        let cross = rect([5., -5.], [6., 5.]);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&cross));
        assert_eq!(outer.intersection(&cross), rect([5., 0.], [6., 5.]));
        assert!(inner.intersection(&rect([20., 20.], [30., 30.])).is_empty());
    }

    #[test]
    fn widest_axis() {
        assert_eq!(rect([0., 0.], [1., 3.]).widest_axis(), 1);
        assert_eq!(rect([0., 0.], [2., 2.]).widest_axis(), 0);
        assert_eq!(rect([0., 0.], [1., 1.]).center(), vec![0.5, 0.5]);
    }

    #[test]
    fn space_checks_dimension() {
        let space = Space::cartesian(3).with_crs("EPSG:4979");
        assert_eq!(space.crs.as_deref(), Some("EPSG:4979"));
        assert!(space.check(&Envelope::empty(3)).is_ok());
        assert!(space.check(&rect([0., 0.], [1., 1.])).is_err());
    }
}
