use serde::{Deserialize, Serialize};

/// Declares an integer-backed identifier for one table of the shop schema.
///
/// Each identifier is its own type so a product id can never be passed where
/// a store id is expected, even though both are `BIGINT` keys in the database.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw key value.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw key value.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a customer.
    CustomerId
);
define_id!(
    /// Identifier of an order.
    OrderId
);
define_id!(
    /// Identifier of a single line within an order.
    OrderItemId
);
define_id!(
    /// Identifier of a product.
    ProductId
);
define_id!(
    /// Identifier of a product category.
    CategoryId
);
define_id!(
    /// Identifier of a physical store.
    StoreId
);
