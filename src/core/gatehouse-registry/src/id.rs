//! Identifier types usable as registry keys.

use std::fmt::Debug;
use std::hash::Hash;

/// An integer-like identifier generated by an [`IdRegistry`](crate::IdRegistry).
///
/// `Default` must be the first id handed out.
pub trait RegistryId: Copy + Eq + Hash + Default + Debug + Send + Sync + 'static {
    /// Returns the id following `self`, wrapping on overflow.
    fn next(self) -> Self;
}

macro_rules! impl_registry_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RegistryId for $ty {
                #[inline]
                fn next(self) -> Self {
                    self.wrapping_add(1)
                }
            }
        )*
    };
}

impl_registry_id!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_increments() {
        assert_eq!(0u64.next(), 1);
        assert_eq!(41i32.next(), 42);
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(u8::MAX.next(), 0);
        assert_eq!(i8::MAX.next(), i8::MIN);
    }
}
