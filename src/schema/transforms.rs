//! Boolean transforms used by the schema tables
//!
//! Each card family (shop item, offer item, snippet, product tile) has its
//! own composite rules. The families overlap but read slightly different
//! fields, so they are kept apart rather than merged.

use crate::document::{Node, PropertyValue};
use crate::row::{Row, RowExt};

/// First non-empty raw value among `fields`, trimmed
fn first_non_empty<'a>(row: &'a Row, fields: &[&str]) -> &'a str {
    fields
        .iter()
        .map(|f| row.field(f))
        .find(|v| !v.is_empty())
        .unwrap_or("")
        .trim()
}

/// Reads the instance's own `Platform` property; desktop unless it says otherwise
pub fn is_desktop_platform(instance: &Node) -> bool {
    for property in &instance.properties {
        let key = property.key.to_lowercase();
        if key == "platform" || key.starts_with("platform#") {
            let value = match &property.value {
                PropertyValue::Boolean { value } => value.to_string(),
                PropertyValue::Text { value }
                | PropertyValue::Variant { value, .. }
                | PropertyValue::InstanceSwap { value } => value.clone(),
            };
            return value.to_lowercase() == "desktop";
        }
    }
    true
}

fn is_checkout(row: &Row) -> bool {
    row.is_true("#isCheckout") || row.is_true("#MarketCheckoutButton")
}

fn has_bnpl(row: &Row) -> bool {
    row.is_true("#ShopInfo-Bnpl")
}

// Shop item family

pub fn compute_with_button(row: &Row, container: &Node) -> bool {
    is_desktop_platform(container) || is_checkout(row)
}

pub fn compute_with_reviews(row: &Row) -> bool {
    !first_non_empty(row, &["#ReviewsNumber", "#ShopInfo-Ugc"]).is_empty()
}

pub fn compute_with_delivery(row: &Row) -> bool {
    row.has_value("#DeliveryList") || row.is_true("#EDeliveryGroup")
}

pub fn compute_with_meta(row: &Row) -> bool {
    compute_with_delivery(row) || has_bnpl(row)
}

pub fn compute_with_data(row: &Row) -> bool {
    compute_with_reviews(row) || compute_with_delivery(row) || has_bnpl(row)
}

// Offer item family

pub fn compute_offer_with_reviews(row: &Row) -> bool {
    row.is_true("#EOfferItem_hasReviews") || row.has_value("#ReviewsNumber")
}

pub fn compute_offer_with_delivery(row: &Row) -> bool {
    row.is_true("#EOfferItem_hasDelivery") || compute_with_delivery(row)
}

pub fn compute_offer_with_fintech(row: &Row) -> bool {
    row.is_true("#EOfferItem_Fintech") || row.is_true("#EPriceGroup_Fintech")
}

pub fn compute_offer_with_meta(row: &Row) -> bool {
    compute_offer_with_delivery(row) || has_bnpl(row)
}

pub fn compute_offer_with_data(row: &Row) -> bool {
    compute_offer_with_reviews(row) || compute_offer_with_delivery(row) || has_bnpl(row)
}

pub fn compute_with_title(row: &Row) -> bool {
    !first_non_empty(row, &["#OrganicTitle", "#OfferTitle"]).is_empty()
}

/// Offer cards always show their button
pub fn compute_offer_with_button() -> bool {
    true
}

// Product tile family

pub fn compute_product_with_button(row: &Row) -> bool {
    row.is_true("#EMarketCheckoutLabel") || row.is_true("#BUTTON")
}

// Snippet family. A plain organic result falls back to the snippet card with
// every commerce feature switched off.

fn is_plain_organic(row: &Row) -> bool {
    row.field("#SnippetType") == "Organic"
}

pub fn compute_with_quotes(row: &Row) -> bool {
    row.is_true("#withQuotes") || !first_non_empty(row, &["#QuoteText", "#EQuote-Text"]).is_empty()
}

pub fn compute_snippet_with_delivery(row: &Row) -> bool {
    !is_plain_organic(row) && (row.is_true("#EDeliveryGroup") || row.is_true("#EDelivery_abroad"))
}

pub fn compute_with_address(row: &Row) -> bool {
    !is_plain_organic(row) && (row.is_true("#hasShopOfflineRegion") || row.has_value("#addressText"))
}

pub fn compute_with_contacts(row: &Row) -> bool {
    !is_plain_organic(row) && !first_non_empty(row, &["#Phone", "#Contacts"]).is_empty()
}

pub fn compute_snippet_with_button(row: &Row, container: &Node) -> bool {
    if is_plain_organic(row) {
        return false;
    }
    (row.is_true("#BUTTON") && is_desktop_platform(container)) || is_checkout(row)
}

pub fn compute_snippet_with_meta(row: &Row) -> bool {
    !is_plain_organic(row) && (compute_snippet_with_delivery(row) || has_bnpl(row))
}

pub fn compute_snippet_with_data(row: &Row) -> bool {
    !is_plain_organic(row)
        && (compute_with_reviews(row) || compute_snippet_with_delivery(row) || has_bnpl(row))
}

pub fn compute_snippet_with_price(row: &Row) -> bool {
    !is_plain_organic(row) && row.has_value("#OrganicPrice")
}

pub fn compute_snippet_with_ecom_meta(row: &Row) -> bool {
    if is_plain_organic(row) {
        return false;
    }
    const FIELDS: [&str; 6] = [
        "#ProductRating",
        "#ReviewCount",
        "#OrganicPrice",
        "#OldPrice",
        "#EPriceBarometer_View",
        "#ELabelGroup",
    ];
    FIELDS.iter().any(|f| match row.get(*f) {
        Some(v) => !v.is_empty() && v != "false",
        None => false,
    })
}

pub fn compute_snippet_with_fintech(row: &Row) -> bool {
    !is_plain_organic(row) && row.is_true("#EPriceGroup_Fintech")
}

pub fn compute_snippet_with_promo(row: &Row) -> bool {
    !is_plain_organic(row) && row.has_value("#Promo")
}
