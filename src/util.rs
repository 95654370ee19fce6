/// Checks that a numerical value is in the provided interval `[a,b]` and returns early
/// with an [`Error::Config`](crate::error::Error::Config) if not
///
/// `NaN` never passes the check.
///
/// ### Example
/// ```
/// # use smartcab::{ensure_interval, error::Result};
/// fn check(alpha: f64) -> Result<()> {
///     ensure_interval!(alpha, 0.0, 1.0);
///     Ok(())
/// }
/// assert!(check(0.5).is_ok());
/// assert!(check(2.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        $crate::ensure_interval!($var, $a, $b, stringify!($var))
    };
    ($var:expr, $a:expr, $b:expr, $name:expr) => {{
        let value = $var as f64;
        if !(value >= $a && value <= $b) {
            return Err($crate::error::Error::Config {
                name: $name,
                value,
                min: $a,
                max: $b,
            });
        }
    }};
}
