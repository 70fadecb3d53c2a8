#[cfg(test)]
#[ctor::ctor]
fn init_backtrace() {
    color_backtrace::install();
}

pub trait LogAbuse {
    fn ln_or_inf(self) -> f64;
}

impl LogAbuse for f64 {
    fn ln_or_inf(self) -> f64 {
        if self == 0.0 {
            -f64::INFINITY
        } else {
            self.ln()
        }
    }
}

pub trait VecMath {
    /// The index of the first maximal value.
    fn argmax(&self) -> Option<usize>;
    /// The index and value of the first element that is strictly greater than `floor`
    /// and every element before it, or `(0, floor)` if there is no such element.
    fn argmax_above(&self, floor: f64) -> (usize, f64);
}

impl VecMath for [f64] {
    fn argmax(&self) -> Option<usize> {
        let mut max = *self.first()?;
        let mut argmax: usize = 0;

        for (idx, &item) in self.iter().enumerate().skip(1) {
            if item > max {
                max = item;
                argmax = idx;
            }
        }

        Some(argmax)
    }

    fn argmax_above(&self, floor: f64) -> (usize, f64) {
        let mut max = floor;
        let mut argmax: usize = 0;

        for (idx, &item) in self.iter().enumerate() {
            if item > max {
                max = item;
                argmax = idx;
            }
        }

        (argmax, max)
    }
}

/// The sum of two natural log probabilities, computed in log space.
#[inline(always)]
pub fn log_add(a: f64, b: f64) -> f64 {
    let min = f64::min(a, b);
    let max = f64::max(a, b);

    if min == -f64::INFINITY {
        max
    } else {
        max + (min - max).exp().ln_1p()
    }
}

#[macro_export]
macro_rules! log_sum {
    // Base case:
    ($x:expr) => ($x);
    // `$x` followed by at least one `$y,`
    ($x:expr, $($y:expr),+) => (
        // Call `log_sum!` on the tail `$y`
        $crate::util::log_add($x, $crate::log_sum!($($y),+))
    )
}
