//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  IDs are dense: the registry and the
//! simulation hand them out in creation order, so `id.index()` addresses the
//! owning `Vec` directly.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a machine in the registry, in registration order.
    pub struct MachineId(u32);
}

typed_id! {
    /// Index of a workpiece in the simulation, in spawn order.
    ///
    /// Spawn order doubles as the FIFO tie-break between workpieces that
    /// compete for the same machine in one round.
    pub struct WorkpieceId(u32);
}

typed_id! {
    /// Index of a product (named route + quantity).
    pub struct ProductId(u32);
}

typed_id! {
    /// Interned machine category ("lathe", "inspection", …).
    pub struct CategoryId(u16);
}
