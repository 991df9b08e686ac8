use std::cmp::Ordering;

use crate::primitive::{AxisIndex, Envelope};

/* ---------------------------------------------------------------------------------------------- */
/*                                           CALCULATOR                                           */
/* ---------------------------------------------------------------------------------------------- */

/// Geometric cost metrics the tree algorithms are parameterized with.
///
/// Every method is a pure function of its arguments. Empty envelopes must produce zero
/// for [`Calculator::space`], [`Calculator::overlap`] and [`Calculator::enlargement`];
/// zero-span envelopes (points, segments) are legitimate input and simply have no
/// volume.
pub trait Calculator {
    /// Distance between two envelopes. Only used to pick the most distant seed pair of
    /// a linear split, so it need not be a true metric.
    fn distance(&self, a: &Envelope, b: &Envelope) -> f64;

    /// Hyper-volume (area in 2D) of an envelope.
    fn space(&self, e: &Envelope) -> f64;

    /// Hyper-volume of the intersection of two envelopes; zero if disjoint.
    fn overlap(&self, a: &Envelope, b: &Envelope) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.;
        }

        self.space(&a.intersection(b))
    }

    /// Marginal cost of growing `original` until it also covers `candidate`.
    fn enlargement(&self, original: &Envelope, candidate: &Envelope) -> f64 {
        if original.is_empty() || candidate.is_empty() {
            return 0.;
        }

        // Clamped, since float rounding can make the difference slightly negative.
        (self.space(&original.union(candidate)) - self.space(original)).max(0.)
    }

    /// Orders envelopes by the lower (or upper) bound of a single axis.
    fn sort_comparator(
        &self,
        axis: AxisIndex,
        ascending: bool,
        by_upper_bound: bool,
    ) -> impl Fn(&Envelope, &Envelope) -> Ordering {
        move |a, b| {
            let (x, y) = if by_upper_bound {
                (a.upper()[axis], b.upper()[axis])
            } else {
                (a.lower()[axis], b.lower()[axis])
            };

            if ascending {
                x.total_cmp(&y)
            } else {
                y.total_cmp(&x)
            }
        }
    }
}

/* ------------------------------------------ Defaults ------------------------------------------ */

/// Takes every axis of the envelope into account: area in 2D, volume in 3D, and so on.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanCalculator;

/// Considers the first two axes only, e.g. geographic boxes carrying extra elevation or
/// time axes which should not weigh on the planar cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct Calculator2D;

/// Considers the first three axes only.
#[derive(Clone, Copy, Debug, Default)]
pub struct Calculator3D;

impl Calculator for EuclideanCalculator {
    fn distance(&self, a: &Envelope, b: &Envelope) -> f64 {
        center_distance(a, b, a.dimension())
    }

    fn space(&self, e: &Envelope) -> f64 {
        volume(e, e.dimension())
    }
}

impl Calculator for Calculator2D {
    fn distance(&self, a: &Envelope, b: &Envelope) -> f64 {
        center_distance(a, b, 2)
    }

    fn space(&self, e: &Envelope) -> f64 {
        volume(e, 2)
    }
}

impl Calculator for Calculator3D {
    fn distance(&self, a: &Envelope, b: &Envelope) -> f64 {
        center_distance(a, b, 3)
    }

    fn space(&self, e: &Envelope) -> f64 {
        volume(e, 3)
    }
}

fn volume(e: &Envelope, axes: usize) -> f64 {
    if e.is_empty() {
        return 0.;
    }

    (0..axes.min(e.dimension())).map(|i| e.span(i)).product()
}

fn center_distance(a: &Envelope, b: &Envelope, axes: usize) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.;
    }

    let (ca, cb) = (a.center(), b.center());
    ca.iter()
        .zip(&cb)
        .take(axes)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod __test {
    use super::*;

    fn cube(p1: [f64; 3], p2: [f64; 3]) -> Envelope {
        Envelope::new(p1, p2).unwrap()
    }

    #[test]
    fn space_per_calculator() {
        let e = cube([0., 0., 0.], [2., 3., 4.]);

        assert_eq!(EuclideanCalculator.space(&e), 24.);
        assert_eq!(Calculator2D.space(&e), 6.);
        assert_eq!(Calculator3D.space(&e), 24.);
        assert_eq!(EuclideanCalculator.space(&Envelope::empty(3)), 0.);
        assert_eq!(Calculator2D.space(&cube([1., 1., 1.], [1., 5., 5.])), 0.);
    }

    #[test]
    fn overlap_and_enlargement() {
        let calc = Calculator2D;
        let a = Envelope::new([0., 0.], [2., 2.]).unwrap();
        let b = Envelope::new([1., 1.], [3., 3.]).unwrap();
        let far = Envelope::new([5., 5.], [6., 6.]).unwrap();

        assert_eq!(calc.overlap(&a, &b), 1.);
        assert_eq!(calc.overlap(&a, &far), 0.);
        assert_eq!(calc.enlargement(&a, &b), 5.);
        assert_eq!(calc.enlargement(&a, &Envelope::point([1., 1.]).unwrap()), 0.);
        assert_eq!(calc.enlargement(&a, &Envelope::empty(2)), 0.);
        assert_eq!(calc.enlargement(&Envelope::empty(2), &a), 0.);
    }

    #[test]
    fn distance_between_centers() {
        let a = Envelope::new([0., 0.], [2., 2.]).unwrap();
        let b = Envelope::new([3., 4.], [5., 6.]).unwrap();

        assert_eq!(EuclideanCalculator.distance(&a, &b), 5.);
        assert_eq!(Calculator2D.distance(&a, &a), 0.);
    }

    #[test]
    fn comparator_orders_by_bound() {
        let calc = EuclideanCalculator;
        let mut items = vec![
            Envelope::new([3., 0.], [4., 1.]).unwrap(),
            Envelope::new([0., 0.], [9., 1.]).unwrap(),
            Envelope::new([1., 0.], [2., 1.]).unwrap(),
        ];

        items.sort_by(calc.sort_comparator(0, true, false));
        assert_eq!(
            items.iter().map(|e| e.lower()[0]).collect::<Vec<_>>(),
            [0., 1., 3.]
        );

        items.sort_by(calc.sort_comparator(0, false, true));
        assert_eq!(
            items.iter().map(|e| e.upper()[0]).collect::<Vec<_>>(),
            [9., 4., 2.]
        );
    }
}
