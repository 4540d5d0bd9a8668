use arrow::{array::PrimitiveArray, datatypes::ArrowPrimitiveType};
use num_traits::NumCast;

/// Index and interval fraction locating a value in a breakpoint array.
#[derive(Debug, PartialEq)]
pub(crate) struct Lookup(usize, f64);

impl Lookup {
    /// Locates `value` in `breakpoints`, which must be sorted ascending.
    ///
    /// Values outside the range of the array are clamped to the first or
    /// last breakpoint.
    pub fn new<T>(breakpoints: &PrimitiveArray<T>, value: T::Native) -> Self
    where
        T: ArrowPrimitiveType,
        T::Native: NumCast,
    {
        let found = breakpoints
            .values()
            .binary_search_by(|t| t.partial_cmp(&value).unwrap());

        match found {
            // value is exactly on a breakpoint
            Ok(index) => Lookup(index, 0.0),
            // `index` is the index of the first breakpoint greater than value
            Err(index) => {
                if index == 0 {
                    Lookup(0, 0.0)
                } else if index == breakpoints.len() {
                    Lookup(index - 1, 1.0)
                } else {
                    let t0: f64 = NumCast::from(breakpoints.value(index - 1)).unwrap();
                    let t1: f64 = NumCast::from(breakpoints.value(index)).unwrap();
                    let value: f64 = NumCast::from(value).unwrap();
                    Lookup(index - 1, (value - t0) / (t1 - t0))
                }
            }
        }
    }

    /// Linearly interpolates `values` at this lookup position.
    pub fn interpolate<T>(&self, values: &PrimitiveArray<T>) -> f64
    where
        T: ArrowPrimitiveType,
        T::Native: NumCast,
    {
        let Lookup(index, fraction) = self;
        let v0: f64 = NumCast::from(values.value(*index)).unwrap();
        if *index + 1 == values.len() {
            return v0;
        }
        let v1: f64 = NumCast::from(values.value(*index + 1)).unwrap();
        v0 + fraction * (v1 - v0)
    }
}
