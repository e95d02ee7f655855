use crate::error::{ensure_at_least, Result};

/// Finds the interval of an ascending list of keys that contains a query, remembering where the
/// previous query landed.
///
/// Lookups return the index `j` of the _bracket_ `keys[j] <= x < keys[j + 1]`, clamped to
/// `0..=keys.len() - 2` for queries outside of the keys. When successive queries land close to
/// each other (as they do when sweeping through the keys in order), the search starts from the
/// previous bracket and expands outwards ("hunts"), which costs amortized O(1) per query.
/// Otherwise it falls back to plain bisection in O(log n).
///
/// The cached bracket is updated by every lookup, hence `&mut self`. Clone the search (or
/// whatever owns it) to query it from several places at once.
///
/// ```
/// use rotor_frames::IntervalSearch;
///
/// let mut search = IntervalSearch::new(vec![0., 1., 2., 4., 8.])?;
/// assert_eq!(search.find(0.5), 0);
/// assert_eq!(search.find(2.), 2);
/// assert_eq!(search.find(7.9), 3);
/// // clamped to the outermost brackets
/// assert_eq!(search.find(-1.), 0);
/// assert_eq!(search.find(100.), 3);
/// # Ok::<(), rotor_frames::QuaternionError>(())
/// ```
#[derive(Clone, Debug)]
pub struct IntervalSearch<K> {
    keys: Vec<K>,
    last: usize,
    correlated: bool,
    max_step: usize,
}

impl<K> IntervalSearch<K>
where
    K: PartialOrd + Copy,
{
    /// Prepares a search over `keys`, which must be ascending and hold at least two entries.
    pub fn new(keys: Vec<K>) -> Result<Self> {
        ensure_at_least(2, keys.len())?;
        // lookups that move by at most n^¼ brackets count as correlated
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_step = ((keys.len() as f64).powf(0.25) as usize).max(1);
        Ok(Self {
            keys,
            last: 0,
            correlated: false,
            max_step,
        })
    }

    /// The keys being searched.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// The bracket containing `x`, using whichever of [`hunt`](Self::hunt) and
    /// [`locate`](Self::locate) suits the recent query pattern.
    pub fn find(&mut self, x: K) -> usize {
        if self.correlated {
            tracing::trace!(from = self.last, "hunting for bracket");
            self.hunt(x)
        } else {
            tracing::trace!("bisecting for bracket");
            self.locate(x)
        }
    }

    /// The bracket containing `x`, by bisection over all keys.
    pub fn locate(&mut self, x: K) -> usize {
        let lower = self.bisect(x, 0, self.keys.len() - 1);
        self.remember(lower)
    }

    /// The bracket containing `x`, expanding outwards from the previous bracket in doubling steps
    /// before bisecting.
    pub fn hunt(&mut self, x: K) -> usize {
        let n = self.keys.len();
        let mut lower = self.last;
        let mut upper;
        let mut step = 1;
        if x >= self.keys[lower] {
            loop {
                upper = lower + step;
                if upper >= n - 1 {
                    upper = n - 1;
                    break;
                }
                if x < self.keys[upper] {
                    break;
                }
                lower = upper;
                step += step;
            }
        } else {
            upper = lower;
            loop {
                if lower <= step {
                    lower = 0;
                    break;
                }
                lower -= step;
                if x >= self.keys[lower] {
                    break;
                }
                upper = lower;
                step += step;
            }
        }
        let lower = self.bisect(x, lower, upper);
        self.remember(lower)
    }

    fn bisect(&self, x: K, mut lower: usize, mut upper: usize) -> usize {
        while upper - lower > 1 {
            let middle = (upper + lower) / 2;
            if x >= self.keys[middle] {
                lower = middle;
            } else {
                upper = middle;
            }
        }
        lower
    }

    fn remember(&mut self, lower: usize) -> usize {
        self.correlated = lower.abs_diff(self.last) <= self.max_step;
        self.last = lower;
        lower.min(self.keys.len() - 2)
    }
}
