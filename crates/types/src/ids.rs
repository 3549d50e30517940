//! Identifier newtypes for the Oxbow runtime bridge.
//!
//! Every identifier that crosses the engine boundary is a newtype wrapper so
//! a native handle can never be confused with a service id or a message kind.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a numeric type for type-safe identifiers.
///
/// Each generated type provides:
/// - Standard derives: Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord
/// - Serde with `#[serde(transparent)]` for wire format compatibility
/// - `From<inner>` and `Into<inner>` conversions
/// - `Display` with a semantic prefix (e.g., `service:42`)
/// - `new()` constructor and `value()` accessor
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $inner:ty, $prefix:expr
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Creates a new identifier from a raw value.
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the raw numeric value.
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = <$inner as std::str::FromStr>::Err;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<$inner>().map(Self)
            }
        }
    };
}

define_id!(
    /// An opaque reference to a native-side object.
    ///
    /// The numeric space is owned and issued by the native engine; this layer
    /// never invents or mutates handle values, only wraps and interprets
    /// them. `Handle::NULL` (zero) is the "no object" sentinel.
    ///
    /// # Display
    ///
    /// Formats with `handle:` prefix: `handle:7`.
    Handle, u64, "handle"
);

define_id!(
    /// Identity of a user service within the runtime.
    ///
    /// Declared by the service itself and carried in every transaction
    /// message addressed to it.
    ///
    /// # Display
    ///
    /// Formats with `service:` prefix: `service:42`.
    ServiceId, u16, "service"
);

define_id!(
    /// Kind of a transaction message within a single service.
    ///
    /// Interpreted only by the target service's converter.
    ///
    /// # Display
    ///
    /// Formats with `kind:` prefix: `kind:1`.
    MessageKind, u16, "kind"
);

impl Handle {
    /// The "no object" sentinel.
    pub const NULL: Handle = Handle(0);

    /// Whether this handle is the null sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}
