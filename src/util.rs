use fxhash::FxHashSet;
use glam::Vec2;
use rand::Rng;

/**
 * Hash set with a fast non-cryptographically secure hash function.
 */
pub type HashSet<V> = FxHashSet<V>;


/// Basic rectangle primitive.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Smallest rectangle containing both.
    pub fn union(self, other: Rect) -> Rect {
        let min = self.origin.min(other.origin);
        let max = self.max().max(other.max());
        Rect { origin: min, size: max - min }
    }
}


/// Picks values at random, weighted by a relative probability.
/// Values with a probability of 0 or less, or with a non-finite probability, are never picked.
#[derive(Clone, Debug)]
pub struct RandomPicker<T> {
    sum: f32,
    thresholds: Vec<(f32, T)>,
}

impl<T> Default for RandomPicker<T> {
    fn default() -> Self {
        Self { sum: 0.0, thresholds: Vec::new() }
    }
}

impl<T> RandomPicker<T> {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: T, probability: f32) {
        if probability > 0.0 && probability.is_finite() {
            self.sum += probability;
            self.thresholds.push((self.sum, value));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn sum(&self) -> f32 {
        self.sum
    }

    pub fn pick(&self, rng: &mut impl Rng) -> Option<&T> {
        // An overflowing sum leaves no range to sample from
        if self.thresholds.is_empty() || !self.sum.is_finite() {
            return None;
        }
        let random = rng.gen_range(0.0..self.sum);
        let index = self.thresholds
            .partition_point(|(threshold, _)| *threshold < random)
            .min(self.thresholds.len() - 1);
        Some(&self.thresholds[index].1)
    }
}

impl<T> FromIterator<(T, f32)> for RandomPicker<T> {
    fn from_iter<I: IntoIterator<Item = (T, f32)>>(iter: I) -> Self {
        let mut picker = Self::new();
        for (value, probability) in iter {
            picker.add(value, probability);
        }
        picker
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use crate::{RandomPicker, Rect};

    #[test]
    fn empty_picker() {
        let picker = RandomPicker::<u32>::new();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(picker.is_empty());
        assert_eq!(None, picker.pick(&mut rng));
    }

    #[test]
    fn zero_probability_never_picked() {
        let picker: RandomPicker<&str> = [("grass", 1.0), ("never", 0.0), ("flowers", 0.25)]
            .into_iter()
            .collect();
        assert_eq!(1.25, picker.sum());
        let mut rng = SmallRng::seed_from_u64(42);
        let mut grass = 0;
        for _ in 0..1000 {
            let picked = *picker.pick(&mut rng).unwrap();
            assert_ne!("never", picked);
            if picked == "grass" {
                grass += 1;
            }
        }
        // Roughly 80% grass
        assert!(grass > 700 && grass < 900, "grass picked {grass} times");
    }

    #[test]
    fn non_finite_probabilities() {
        let mut rng = SmallRng::seed_from_u64(3);
        let picker: RandomPicker<u32> = [(0, f32::INFINITY), (1, f32::NAN), (2, 2.0)]
            .into_iter()
            .collect();
        assert_eq!(2.0, picker.sum());
        assert_eq!(Some(&2), picker.pick(&mut rng));

        let overflowing: RandomPicker<u32> = [(0, 3.0e38), (1, 3.0e38)].into_iter().collect();
        assert!(!overflowing.is_empty());
        assert_eq!(None, overflowing.pick(&mut rng));
    }

    #[test]
    fn rect_union() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(-1.0, 1.0, 2.0, 4.0);
        assert_eq!(Rect::new(-1.0, 0.0, 3.0, 5.0), a.union(b));
    }
}
