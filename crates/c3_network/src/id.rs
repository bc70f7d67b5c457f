//! Index newtypes for network arenas.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A state in the transition network.
    StateId,
    "s"
);

define_id!(
    /// A grammar rule (one sub-network per rule).
    RuleId,
    "r"
);

define_id!(
    /// A terminal symbol (token type) of the grammar.
    ///
    /// Terminals are numbered densely from 0 in registration order, with the
    /// exception of [`TerminalId::WILDCARD`].
    TerminalId,
    "t"
);

define_id!(
    /// A semantic predicate guarding an epsilon edge.
    ///
    /// Predicates are opaque to the network; the host evaluates them.
    PredicateId,
    "p"
);

impl TerminalId {
    /// Sentinel candidate meaning "any token is valid here".
    ///
    /// Reported for wildcard transitions; never a real token type.
    pub const WILDCARD: TerminalId = TerminalId(u32::MAX);

    /// Returns `true` for the wildcard sentinel.
    #[inline]
    pub const fn is_wildcard(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Convert a `Vec` length into the next id value.
///
/// Networks larger than `u32::MAX` states are not representable.
pub(crate) fn next_raw(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
