//! Root finding shared by RATE, YIELD and friends.

/// Step size below which Excel considers an iteration converged.
pub(crate) const EXCEL_ITERATION_TOLERANCE: f64 = 1.0e-7;

/// Newton-Raphson from `guess`. `f` and `df` return `None` outside their domain, which aborts
/// the search.
pub(crate) fn newton_raphson(
    guess: f64,
    max_iterations: usize,
    f: impl Fn(f64) -> Option<f64>,
    df: impl Fn(f64) -> Option<f64>,
) -> Option<f64> {
    let mut x = guess;
    for iteration in 0..max_iterations {
        let slope = df(x).filter(|d| *d != 0.0)?;
        let step = f(x)? / slope;
        let next = x - step;
        if !next.is_finite() {
            return None;
        }
        if step.abs() <= EXCEL_ITERATION_TOLERANCE {
            log::trace!("newton converged to {next} after {} steps", iteration + 1);
            return Some(next);
        }
        x = next;
    }
    None
}
