//! Correlation codec joining the two upstream identifier spaces.
//!
//! The order-of-record system and the payment gateway use unrelated
//! identifiers, and there is no shared database. The saga bridges them two
//! ways:
//!
//! - a derived payment order ID (`ORDER_<orderId>_<4 digits>`) keys the
//!   gateway session for one checkout attempt;
//! - a tag map stored on the gateway payment order carries the
//!   order-of-record identifier and display code, so a later reconciliation
//!   can find "its" order from nothing but the payment order ID.
//!
//! All derivation and parsing is pure; the timestamp salt is passed in by
//! the caller so one checkout attempt computes the ID exactly once.

use std::collections::BTreeMap;

use common::{OrderId, PaymentOrderId};

use crate::error::CheckoutError;
use crate::model::ReservedOrder;

/// Tag key carrying the order-of-record identifier.
pub const TAG_ORDER_ID: &str = "order_id";

/// Tag key carrying the order-of-record display code.
pub const TAG_ORDER_CODE: &str = "order_code";

/// Key/value annotations attached to a gateway payment order.
pub type CorrelationTags = BTreeMap<String, String>;

/// Derives and parses the identifiers that let the saga correlate an
/// order/payment pair without a shared database.
pub struct CorrelationCodec;

impl CorrelationCodec {
    /// Builds the tag map to embed on the payment order created for
    /// `order`.
    pub fn tags_for(order: &ReservedOrder) -> CorrelationTags {
        let mut tags = CorrelationTags::new();
        tags.insert(TAG_ORDER_ID.to_string(), order.id.to_string());
        tags.insert(TAG_ORDER_CODE.to_string(), order.code.clone());
        tags
    }

    /// Derives the payment order ID for one checkout attempt.
    ///
    /// Format: `ORDER_<orderId>_<4-digit time suffix>`. The suffix salts
    /// the ID so a caller-level retry (which creates a new reservation)
    /// does not collide in the gateway's namespace. This is a weak
    /// uniqueness guarantee, accepted as such.
    pub fn payment_order_id(order_id: &OrderId, now_millis: i64) -> PaymentOrderId {
        let suffix = now_millis.rem_euclid(10_000);
        PaymentOrderId::new(format!("ORDER_{}_{:04}", order_id, suffix))
    }

    /// Recovers the order-of-record identifier from a tag map returned by
    /// a gateway lookup.
    pub fn resolve_order_id(tags: &CorrelationTags) -> Result<OrderId, CheckoutError> {
        tags.get(TAG_ORDER_ID)
            .filter(|v| !v.is_empty())
            .map(|v| OrderId::new(v.clone()))
            .ok_or_else(|| {
                CheckoutError::CorrelationMissing(format!("tag '{TAG_ORDER_ID}' absent or empty"))
            })
    }
}
