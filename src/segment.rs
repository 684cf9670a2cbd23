// src/segment.rs - Region tree and merge-cost arithmetic

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Number of colour bands carried by every pixel (red, green, blue)
pub const BANDS: usize = 3;

/// Colour vector of one pixel, one value per band
pub type Colour = [f64; BANDS];

/// Pixel coordinate inside the segmentation block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pooled per-band statistics of a segment.
///
/// `m2` is the sum of squared deviations from the mean, so the population
/// variance of a band is `m2 / count`. Two sets of statistics are combined
/// with the pairwise update, which keeps the variance of identical colours
/// at exactly zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStats {
    count: usize,
    mean: Colour,
    m2: Colour,
}

impl BandStats {
    fn single(colour: Colour) -> Self {
        Self {
            count: 1,
            mean: colour,
            m2: [0.0; BANDS],
        }
    }

    /// Statistics of the union of two disjoint sample sets.
    ///
    /// Every operation is written in a form that is commutative in floating
    /// point, so `combine(a, b) == combine(b, a)` bit for bit.
    pub fn combine(a: &BandStats, b: &BandStats) -> Self {
        let count = a.count + b.count;
        let (na, nb) = (a.count as f64, b.count as f64);
        let n = count as f64;
        let weight = (na * nb) / n;

        let mut mean = [0.0; BANDS];
        let mut m2 = [0.0; BANDS];
        for band in 0..BANDS {
            let delta = b.mean[band] - a.mean[band];
            mean[band] = (a.mean[band] * na + b.mean[band] * nb) / n;
            m2[band] = (a.m2[band] + b.m2[band]) + delta * delta * weight;
        }

        Self { count, mean, m2 }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Colour {
        self.mean
    }

    /// Population standard deviation of each band
    pub fn std_dev(&self) -> Colour {
        let n = self.count as f64;
        let mut result = [0.0; BANDS];
        for band in 0..BANDS {
            // Rounding can leave a tiny negative residue
            result[band] = (self.m2[band] / n).max(0.0).sqrt();
        }
        result
    }
}

/// The two shapes a segment can take
pub enum Shape {
    Pixel { coord: Coord, colour: Colour },
    Parent { left: Segment, right: Segment },
}

struct Node {
    shape: Shape,
    stats: BandStats,
    anchor: Coord,
    digest: u64,
}

/// An immutable region of the image: either a single pixel or the fusion of
/// two earlier segments.
///
/// Cloning is cheap (reference counted). Equality, hashing and ordering are
/// structural, so two independently built parents over the same children
/// behave as the same key.
#[derive(Clone)]
pub struct Segment(Rc<Node>);

impl Segment {
    /// Leaf segment for one pixel
    pub fn pixel(coord: Coord, colour: Colour) -> Self {
        let mut hasher = DefaultHasher::new();
        0u8.hash(&mut hasher);
        coord.hash(&mut hasher);
        for value in colour {
            value.to_bits().hash(&mut hasher);
        }

        Segment(Rc::new(Node {
            shape: Shape::Pixel { coord, colour },
            stats: BandStats::single(colour),
            anchor: coord,
            digest: hasher.finish(),
        }))
    }

    /// Segment formed by merging `left` and `right`
    pub fn parent(left: Segment, right: Segment) -> Self {
        let mut hasher = DefaultHasher::new();
        1u8.hash(&mut hasher);
        left.0.digest.hash(&mut hasher);
        right.0.digest.hash(&mut hasher);

        let stats = BandStats::combine(&left.0.stats, &right.0.stats);
        let anchor = left.0.anchor.min(right.0.anchor);
        let digest = hasher.finish();

        Segment(Rc::new(Node {
            shape: Shape::Parent { left, right },
            stats,
            anchor,
            digest,
        }))
    }

    pub fn shape(&self) -> &Shape {
        &self.0.shape
    }

    /// Number of pixels contained in the segment
    pub fn pixel_count(&self) -> usize {
        self.0.stats.count
    }

    /// Smallest pixel coordinate contained in the segment
    pub fn anchor(&self) -> Coord {
        self.0.anchor
    }

    pub fn stats(&self) -> &BandStats {
        &self.0.stats
    }

    pub fn mean_colour(&self) -> Colour {
        self.0.stats.mean
    }

    /// Leaf pixels in depth-first, left-to-right order
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Coordinates of every leaf pixel
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.leaves().map(|(coord, _)| coord)
    }
}

/// Iterator over the leaf pixels of a segment
pub struct Leaves<'a> {
    stack: Vec<&'a Segment>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (Coord, &'a Colour);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(segment) = self.stack.pop() {
            match &segment.0.shape {
                Shape::Pixel { coord, colour } => return Some((*coord, colour)),
                Shape::Parent { left, right } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}

fn same_colour(a: &Colour, b: &Colour) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
}

fn compare_colours(a: &Colour, b: &Colour) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        if self.0.digest != other.0.digest || self.pixel_count() != other.pixel_count() {
            return false;
        }
        match (&self.0.shape, &other.0.shape) {
            (
                Shape::Pixel { coord: a, colour: ca },
                Shape::Pixel { coord: b, colour: cb },
            ) => a == b && same_colour(ca, cb),
            (
                Shape::Parent { left: la, right: ra },
                Shape::Parent { left: lb, right: rb },
            ) => la == lb && ra == rb,
            _ => false,
        }
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.digest);
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        if Rc::ptr_eq(&self.0, &other.0) {
            return Ordering::Equal;
        }
        self.anchor()
            .cmp(&other.anchor())
            .then_with(|| self.pixel_count().cmp(&other.pixel_count()))
            .then_with(|| match (&self.0.shape, &other.0.shape) {
                (
                    Shape::Pixel { coord: a, colour: ca },
                    Shape::Pixel { coord: b, colour: cb },
                ) => a.cmp(b).then_with(|| compare_colours(ca, cb)),
                (Shape::Pixel { .. }, Shape::Parent { .. }) => Ordering::Less,
                (Shape::Parent { .. }, Shape::Pixel { .. }) => Ordering::Greater,
                (
                    Shape::Parent { left: la, right: ra },
                    Shape::Parent { left: lb, right: rb },
                ) => la.cmp(lb).then_with(|| ra.cmp(rb)),
            })
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.shape {
            Shape::Pixel { coord, colour } => write!(f, "Pixel{} {:?}", coord, colour),
            Shape::Parent { .. } => write!(
                f,
                "Parent[{} pixels, anchor {}]",
                self.pixel_count(),
                self.anchor()
            ),
        }
    }
}

/// Colour vectors of every pixel in the segment, in leaf order
pub fn colour_samples(segment: &Segment) -> Vec<Colour> {
    segment.leaves().map(|(_, colour)| *colour).collect()
}

/// Population standard deviation (variance divided by count).
///
/// Callers never pass an empty slice; every segment holds at least one pixel.
pub fn standard_deviation(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Standard deviation of each colour band over all pixels of the segment
pub fn band_std_dev(segment: &Segment) -> Colour {
    segment.stats().std_dev()
}

/// Statistical cost of fusing two segments, summed over colour bands.
///
/// For each band: `stddev(A ∪ B) * (nA + nB) - (stddev(A) * nA + stddev(B) * nB)`.
/// Neither input is modified and the combined segment is never materialised.
pub fn merge_cost(a: &Segment, b: &Segment) -> f64 {
    let combined = BandStats::combine(a.stats(), b.stats()).std_dev();
    let (sa, sb) = (band_std_dev(a), band_std_dev(b));
    let (na, nb) = (a.pixel_count() as f64, b.pixel_count() as f64);

    (0..BANDS)
        .map(|band| combined[band] * (na + nb) - (sa[band] * na + sb[band] * nb))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::collections::HashSet;

    fn px(x: u32, y: u32, colour: Colour) -> Segment {
        Segment::pixel(Coord::new(x, y), colour)
    }

    #[test]
    fn test_standard_deviation_is_population() {
        assert_approx_eq!(standard_deviation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
        assert_approx_eq!(standard_deviation(&[3.0]), 0.0);
        assert_approx_eq!(standard_deviation(&[0.0, 10.0]), 5.0);
    }

    #[test]
    fn test_pooled_stats_match_two_pass() {
        let a = Segment::parent(px(0, 0, [10.0, 20.0, 30.0]), px(1, 0, [12.0, 25.0, 0.0]));
        let b = Segment::parent(px(0, 1, [200.0, 21.0, 31.0]), px(1, 1, [7.0, 0.0, 255.0]));
        let whole = Segment::parent(a, Segment::parent(b, px(2, 0, [1.0, 2.0, 3.0])));

        let samples = colour_samples(&whole);
        assert_eq!(samples.len(), 5);
        assert_eq!(whole.pixel_count(), 5);

        let pooled = band_std_dev(&whole);
        for band in 0..BANDS {
            let values: Vec<f64> = samples.iter().map(|c| c[band]).collect();
            assert_approx_eq!(pooled[band], standard_deviation(&values), 1e-9);
            assert_approx_eq!(
                whole.mean_colour()[band],
                values.iter().sum::<f64>() / values.len() as f64,
                1e-9
            );
        }
    }

    #[test]
    fn test_colour_samples_follow_leaf_order() {
        let seg = Segment::parent(
            Segment::parent(px(3, 3, [1.0; 3]), px(0, 0, [2.0; 3])),
            px(1, 0, [3.0; 3]),
        );
        let coords: Vec<Coord> = seg.coords().collect();
        assert_eq!(coords, vec![Coord::new(3, 3), Coord::new(0, 0), Coord::new(1, 0)]);
        assert_eq!(colour_samples(&seg), vec![[1.0; 3], [2.0; 3], [3.0; 3]]);
        assert_eq!(seg.anchor(), Coord::new(0, 0));
    }

    #[test]
    fn test_merge_cost_identical_colours_is_zero() {
        let a = px(0, 0, [128.0, 64.0, 3.0]);
        let b = px(1, 0, [128.0, 64.0, 3.0]);
        assert_eq!(merge_cost(&a, &b), 0.0);

        let ab = Segment::parent(a, b);
        let c = px(2, 0, [128.0, 64.0, 3.0]);
        assert_eq!(merge_cost(&ab, &c), 0.0);
    }

    #[test]
    fn test_merge_cost_of_two_pixels_is_band_distance() {
        // Two pixels: stddev = |a - b| / 2, weighted by 2
        let a = px(0, 0, [10.0, 0.0, 100.0]);
        let b = px(1, 0, [20.0, 4.0, 100.0]);
        assert_approx_eq!(merge_cost(&a, &b), 14.0, 1e-9);
    }

    #[test]
    fn test_merge_cost_is_symmetric() {
        let a = Segment::parent(px(0, 0, [10.0, 20.0, 30.0]), px(1, 0, [11.0, 27.0, 3.0]));
        let b = Segment::parent(
            px(0, 1, [90.0, 21.0, 31.0]),
            Segment::parent(px(1, 1, [7.0, 13.0, 255.0]), px(2, 1, [6.0, 13.0, 250.0])),
        );
        assert_eq!(merge_cost(&a, &b), merge_cost(&b, &a));
        assert!(merge_cost(&a, &b) > 0.0);
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let build = || Segment::parent(px(0, 0, [1.0, 2.0, 3.0]), px(0, 1, [4.0, 5.0, 6.0]));
        let first = build();
        let second = build();
        assert_eq!(first, second);

        let mut set = HashSet::new();
        set.insert(first.clone());
        assert!(set.contains(&second));

        let swapped = Segment::parent(px(0, 1, [4.0, 5.0, 6.0]), px(0, 0, [1.0, 2.0, 3.0]));
        assert_ne!(first, swapped);
        assert_ne!(first.cmp(&swapped), Ordering::Equal);
    }

    #[test]
    fn test_order_is_by_anchor_first() {
        let later = px(5, 0, [0.0; 3]);
        let earlier = Segment::parent(px(1, 2, [0.0; 3]), px(1, 3, [0.0; 3]));
        assert!(earlier < later);

        let lone = px(1, 2, [0.0; 3]);
        assert!(lone < earlier);
    }
}
