use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(OrderStatus {
    Pending => "pending",
    Prepared => "prepared",
    Fulfilled => "fulfilled",
});

impl OrderStatus {
    /// Next status in the lifecycle, or `None` when terminal.
    /// The lifecycle is strictly pending → prepared → fulfilled:
    /// no skips, no reverse, no cancel.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Prepared),
            OrderStatus::Prepared => Some(OrderStatus::Fulfilled),
            OrderStatus::Fulfilled => None,
        }
    }
}

str_enum!(DepletionStatus {
    Ok => "ok",
    Approaching => "approaching",
    Depleted => "depleted",
});

str_enum!(TransitionType {
    Approaching => "approaching",
});
