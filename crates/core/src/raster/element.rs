//! Raster element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Band files arrive as 8/16-bit integers and products are computed in
/// `f64`, so every element must round-trip through `NumCast`.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element {
    ($($t:ty),*) => {
        $(impl RasterElement for $t {})*
    };
}

impl_raster_element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
