//! Organic result with an attached offer (`Organic_withOfferInfo`)
//!
//! Reads like a snippet (title, text, host) but carries the price block and
//! shop name of a product card.

use super::transforms::{
    compute_snippet_with_button, compute_snippet_with_delivery, compute_snippet_with_price, compute_with_reviews,
};
use super::{ComponentSchema, NestedInstanceMapping, PropertyMapping, PRICE_LABEL_NESTED};

pub static ORGANIC_OFFER_SCHEMA: ComponentSchema = ComponentSchema {
    container_names: &["Organic_withOfferInfo"],

    container_properties: &[
        PropertyMapping::computed(&["withPrice"], "#withPrice", |row, _, _| {
            compute_snippet_with_price(row).into()
        }),
        PropertyMapping::computed(&["withReviews"], "#withReviews", |row, _, _| {
            compute_with_reviews(row).into()
        }),
        PropertyMapping::computed(&["withDelivery", "Delivery"], "#withDelivery", |row, _, _| {
            compute_snippet_with_delivery(row).into()
        }),
        PropertyMapping::computed(&["withButton", "Button"], "#withButton", |row, container, _| {
            compute_snippet_with_button(row, container).into()
        }),
        PropertyMapping::equals(&["isPromo", "promo", "isAdv"], "#isPromo", "true"),
        PropertyMapping::text(&["organicTitle", "title"], "#OrganicTitle"),
        PropertyMapping::text(&["organicText"], "#OrganicText"),
        PropertyMapping::text(&["organicHost"], "#OrganicHost"),
    ],

    nested_instances: &[
        NestedInstanceMapping {
            instance_name: "EShopName",
            properties: &[
                PropertyMapping::text(&["name"], "#ShopName"),
                PropertyMapping::equals(&["isOfficial"], "#OfficialShop", "true"),
            ],
        },
        PRICE_LABEL_NESTED[0],
        PRICE_LABEL_NESTED[2],
    ],

    replaces_handlers: &["Organic_withOfferInfo"],
};
