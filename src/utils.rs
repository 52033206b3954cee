use conv::ValueInto;

/// Shorthand for casting numbers.  Panics if out of range.
pub fn cast<T: ValueInto<U>, U>(x: T) -> U {
    x.value_into().expect("integer conversion failure")
}

/// Swap the pair if `cond` is true.
pub fn swap_if<T>(cond: bool, (x, y): (T, T)) -> (T, T) {
    if cond {
        (y, x)
    } else {
        (x, y)
    }
}

/// Error tolerance for comparing floating-point numbers.
///
/// Two numbers `x` and `y` are considered equal if
/// `|x − y| ≤ abserr + relerr × max(|x|, |y|)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Toler {
    pub relerr: f64,
    pub abserr: f64,
}

/// `{ relerr: 1e-8, abserr: 1e-8 }`
impl Default for Toler {
    fn default() -> Self {
        Self { relerr: 1e-8, abserr: 1e-8 }
    }
}

impl Toler {
    pub fn is_eq(&self, x: f64, y: f64) -> bool {
        (x - y).abs() <= self.abserr + self.relerr * f64::max(x.abs(), y.abs())
    }
}
