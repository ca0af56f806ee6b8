/// A trait for random sources that draw bounded integers.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests.
///
/// Implementations must return a value in the **inclusive** range `[0, max]`
/// and must accept every `max`, including `0` and `u64::MAX`.
///
/// # Example
/// ```
/// use simstream::RandSource;
///
/// struct Ceiling;
/// impl RandSource for Ceiling {
///     fn rand_inclusive(&self, max: u64) -> u64 {
///         max
///     }
/// }
///
/// assert_eq!(Ceiling.rand_inclusive(5), 5);
/// ```
pub trait RandSource {
    /// Returns a uniformly distributed integer in `[0, max]`.
    fn rand_inclusive(&self, max: u64) -> u64;
}
