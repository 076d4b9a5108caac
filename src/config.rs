//! Growth configuration for `RecencyMap`.

/// Load factor used when none is configured; matches the usual hash
/// table default of one entry per bucket.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;

/// Smallest accepted max load factor. Below this the bucket count would
/// outrun occupancy by more than the index can usefully address.
pub const MIN_MAX_LOAD_FACTOR: f32 = 1.0 / 64.0;

/// Largest accepted max load factor.
pub const MAX_MAX_LOAD_FACTOR: f32 = 16.0;

/// Smallest bucket count the index is ever sized to.
pub const MIN_BUCKETS: usize = 8;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error(
        "max load factor {0} is outside [{}, {}]",
        MIN_MAX_LOAD_FACTOR,
        MAX_MAX_LOAD_FACTOR
    )]
    InvalidLoadFactor(f32),
}

/// Tuning knobs for the index's growth switch.
///
/// ```
/// use recency_map::{MapConfig, RecencyMap};
///
/// let config = MapConfig::new().max_load_factor(0.75).initial_buckets(64);
/// let map: RecencyMap<u32, &str> = RecencyMap::with_config(config).unwrap();
/// assert_eq!(map.bucket_count(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Occupancy over bucket count at which an insert triggers growth.
    pub max_load_factor: f32,
    /// Buckets pre-allocated on construction and restored by `clear`.
    /// Zero defers allocation to the first insert.
    pub initial_buckets: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            initial_buckets: 0,
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_load_factor(mut self, max_load_factor: f32) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    pub fn initial_buckets(mut self, initial_buckets: usize) -> Self {
        self.initial_buckets = initial_buckets;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_load_factor(self.max_load_factor)
    }

    /// `initial_buckets` rounded to the bucket counts the index uses.
    pub(crate) fn normalized_buckets(&self) -> usize {
        match self.initial_buckets {
            0 => 0,
            n => n
                .max(MIN_BUCKETS)
                .checked_next_power_of_two()
                .expect("capacity overflow"),
        }
    }
}

pub(crate) fn check_load_factor(max_load_factor: f32) -> Result<(), ConfigError> {
    if (MIN_MAX_LOAD_FACTOR..=MAX_MAX_LOAD_FACTOR).contains(&max_load_factor) {
        Ok(())
    } else {
        Err(ConfigError::InvalidLoadFactor(max_load_factor))
    }
}

/// Number of entries `buckets` may hold before an insert must grow.
pub(crate) fn growth_threshold(buckets: usize, max_load_factor: f32) -> usize {
    (buckets as f64 * f64::from(max_load_factor)) as usize
}

/// Slots to reserve in a fresh index for `buckets`. Never more than the
/// logical bucket count, so a high load factor does not pre-allocate far
/// beyond what is stored; past that the table grows from stored hashes.
pub(crate) fn table_capacity(buckets: usize, max_load_factor: f32) -> usize {
    growth_threshold(buckets, max_load_factor).min(buckets)
}

/// Smallest power-of-two bucket count, at least `floor`, whose threshold
/// stays above `occupancy`.
pub(crate) fn buckets_for(occupancy: usize, max_load_factor: f32, floor: usize) -> usize {
    let mut buckets = floor.max(MIN_BUCKETS);
    while growth_threshold(buckets, max_load_factor) <= occupancy {
        buckets = buckets.checked_mul(2).expect("capacity overflow");
    }
    buckets
}
