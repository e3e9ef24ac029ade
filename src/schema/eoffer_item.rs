//! Offer card (`EOfferItem`)

use super::transforms::{
    compute_offer_with_button, compute_offer_with_data, compute_offer_with_delivery, compute_offer_with_fintech,
    compute_offer_with_meta, compute_offer_with_reviews, compute_with_title,
};
use super::{ComponentSchema, PropertyMapping};

pub static EOFFER_ITEM_SCHEMA: ComponentSchema = ComponentSchema {
    container_names: &["EOfferItem"],

    container_properties: &[
        PropertyMapping::computed(&["withButton"], "#EOfferItem_hasButton", |_, _, _| {
            compute_offer_with_button().into()
        }),
        PropertyMapping::computed(&["withReviews", "RATING + REVIEW"], "#EOfferItem_hasReviews", |row, _, _| {
            compute_offer_with_reviews(row).into()
        }),
        PropertyMapping::computed(
            &["withDelivery", "Delivery", "DELIVERY + FINTECH"],
            "#EOfferItem_hasDelivery",
            |row, _, _| compute_offer_with_delivery(row).into(),
        ),
        PropertyMapping::computed(&["withFintech", "Fintech"], "#EOfferItem_Fintech", |row, _, _| {
            compute_offer_with_fintech(row).into()
        }),
        PropertyMapping::equals(&["priceDisclaimer", "Price Disclaimer"], "#PriceDisclaimer", "true"),
        PropertyMapping::computed(&["withMeta"], "#EOfferItem_withMeta", |row, _, _| {
            compute_offer_with_meta(row).into()
        }),
        PropertyMapping::computed(&["withData"], "#EOfferItem_withData", |row, _, _| {
            compute_offer_with_data(row).into()
        }),
        PropertyMapping::equals(&["withFavoritesButton", "[EXP] Favotite Btn"], "#FavoriteBtn", "true"),
        PropertyMapping::computed(&["withTitle", "Offer Title"], "#withTitle", |row, _, _| {
            compute_with_title(row).into()
        }),
        PropertyMapping::present(&["brand", "Brand"], "#Brand"),
    ],

    nested_instances: &[],

    replaces_handlers: &["BrandLogic", "MarketCheckoutButton", "ShopInfoDeliveryBnplContainer", "EOfferItem"],
};
