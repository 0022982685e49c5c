use serde::{Deserialize, Serialize};

/// Identifier assigned to an order by the order-of-record system.
///
/// Opaque and system-specific; wrapped in a newtype so it cannot be
/// confused with the payment gateway's identifier space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an order ID from the upstream-assigned value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The join key between the order-of-record system and the payment gateway
/// for one checkout attempt.
///
/// Wire format: `ORDER_<orderId>_<4 decimal digits>`. Derivation lives in
/// the correlation codec; this type only carries the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentOrderId(String);

impl PaymentOrderId {
    /// Wraps an already-derived payment order ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PaymentOrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PaymentOrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PaymentOrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in minor units (paise/cents) to avoid floating
/// point issues in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (e.g., 10000 = ₹100.00).
    minor_units: i64,
}

impl Money {
    /// Creates a new amount from minor units.
    pub fn from_minor_units(minor_units: i64) -> Self {
        Self { minor_units }
    }

    /// Creates a new amount from whole currency units.
    pub fn from_major_units(major: i64) -> Self {
        Self {
            minor_units: major * 100,
        }
    }

    /// Converts a decimal amount (as found on the wire) to minor units,
    /// rounding to the nearest unit.
    pub fn from_decimal(amount: f64) -> Self {
        Self {
            minor_units: (amount * 100.0).round() as i64,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { minor_units: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the amount in decimal currency units for wire formats that
    /// expect them.
    pub fn as_decimal(&self) -> f64 {
        self.minor_units as f64 / 100.0
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.minor_units > 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.minor_units / 100,
            (self.minor_units % 100).abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_preserves_value() {
        let id = OrderId::new("1001");
        assert_eq!(id.as_str(), "1001");
        assert_eq!(id.to_string(), "1001");
    }

    #[test]
    fn order_id_serialization_is_transparent() {
        let id = OrderId::new("1001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1001\"");
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn payment_order_id_roundtrip() {
        let id = PaymentOrderId::new("ORDER_1001_1234");
        let json = serde_json::to_string(&id).unwrap();
        let back: PaymentOrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn money_from_major_units() {
        let m = Money::from_major_units(600);
        assert_eq!(m.minor_units(), 60000);
        assert_eq!(m.as_decimal(), 600.0);
    }

    #[test]
    fn money_from_decimal_rounds() {
        assert_eq!(Money::from_decimal(599.99).minor_units(), 59999);
        assert_eq!(Money::from_decimal(110.0).minor_units(), 11000);
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_minor_units(60000).to_string(), "600.00");
        assert_eq!(Money::from_minor_units(105).to_string(), "1.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn money_positive() {
        assert!(Money::from_major_units(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::from_minor_units(-5).is_positive());
    }
}
