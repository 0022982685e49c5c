//! Domain model for the checkout saga.
//!
//! `CheckoutRequest` is ephemeral caller input; `ReservedOrder` is owned
//! and mutated exclusively by the order-of-record system — this crate only
//! creates it and later requests the single `PENDING_PAYMENT → PAID`
//! transition. `PaymentSession` is owned by the gateway.

use common::{Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// One line of a checkout request: a product variant and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Variant identifier in the order-of-record system.
    pub variant_id: String,
    /// Quantity to order.
    pub quantity: u32,
}

/// Customer contact and shipping fields supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl CustomerDetails {
    /// Returns the customer's display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A single checkout attempt as supplied by the caller. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Line items to reserve.
    pub items: Vec<LineItem>,
    /// Customer contact and shipping fields.
    pub customer: CustomerDetails,
    /// Declared total in decimal currency units.
    pub total: f64,
}

impl CheckoutRequest {
    /// Validates caller input before any upstream call is made.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.items.is_empty() {
            return Err(CheckoutError::Validation("no line items".to_string()));
        }
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err(CheckoutError::Validation(
                "line item quantity must be positive".to_string(),
            ));
        }
        if !self.total_amount().is_positive() {
            return Err(CheckoutError::Validation(
                "total must be positive".to_string(),
            ));
        }
        if self.customer.email.is_empty() || self.customer.phone.is_empty() {
            return Err(CheckoutError::Validation(
                "customer email and phone are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the declared total as money.
    pub fn total_amount(&self) -> Money {
        Money::from_decimal(self.total)
    }
}

/// Financial status of an order in the order-of-record system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialStatus {
    /// Created as a reservation; awaiting a payment outcome.
    PendingPayment,
    /// Settled. Reached at most once, only via reconciliation.
    Paid,
}

impl FinancialStatus {
    /// Returns the status name as used on the order-of-record wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialStatus::PendingPayment => "pending",
            FinancialStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An order created in the order-of-record system with financial status
/// `PENDING_PAYMENT`. The reservation that makes a payment meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservedOrder {
    /// System-assigned identifier, opaque to this crate.
    pub id: OrderId,
    /// Human-readable order code (e.g. `#1001`).
    pub code: String,
    /// Line items carried on the order.
    pub items: Vec<LineItem>,
    /// Financial status at creation time; always `PendingPayment` here.
    pub financial_status: FinancialStatus,
}

/// Status of a payment order in the gateway's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOrderStatus {
    Created,
    Active,
    Paid,
    Expired,
    Terminated,
}

impl PaymentOrderStatus {
    /// Returns the status name as used on the gateway wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOrderStatus::Created => "CREATED",
            PaymentOrderStatus::Active => "ACTIVE",
            PaymentOrderStatus::Paid => "PAID",
            PaymentOrderStatus::Expired => "EXPIRED",
            PaymentOrderStatus::Terminated => "TERMINATED",
        }
    }

    /// Returns true only for the settled status.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentOrderStatus::Paid)
    }
}

impl std::fmt::Display for PaymentOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment session opened by the gateway for one checkout attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Session token handed to the payer's client.
    pub session_token: String,
    /// Gateway-side status at creation time.
    pub status: PaymentOrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerDetails {
        CustomerDetails {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+911234567890".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            zip: "560001".to_string(),
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            items: vec![LineItem {
                variant_id: "44416942178349".to_string(),
                quantity: 2,
            }],
            customer: customer(),
            total: 600.0,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn empty_items_rejected() {
        let mut req = request();
        req.items.clear();
        assert!(matches!(
            req.validate(),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn zero_quantity_rejected() {
        let mut req = request();
        req.items[0].quantity = 0;
        assert!(matches!(
            req.validate(),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn non_positive_total_rejected() {
        let mut req = request();
        req.total = 0.0;
        assert!(matches!(
            req.validate(),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn missing_contact_rejected() {
        let mut req = request();
        req.customer.email.clear();
        assert!(matches!(
            req.validate(),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn full_name_joins_parts() {
        assert_eq!(customer().full_name(), "Asha Rao");
    }

    #[test]
    fn payment_order_status_wire_names() {
        let json = serde_json::to_string(&PaymentOrderStatus::Paid).unwrap();
        assert_eq!(json, "\"PAID\"");
        let back: PaymentOrderStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(back, PaymentOrderStatus::Active);
    }

    #[test]
    fn unknown_gateway_status_fails_decode() {
        let result: Result<PaymentOrderStatus, _> = serde_json::from_str("\"VOIDED\"");
        assert!(result.is_err());
    }

    #[test]
    fn financial_status_wire_names() {
        assert_eq!(FinancialStatus::PendingPayment.as_str(), "pending");
        assert_eq!(FinancialStatus::Paid.as_str(), "paid");
    }
}
