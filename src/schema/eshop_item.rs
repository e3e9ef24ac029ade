//! Shop item card (`EShopItem`)

use super::transforms::{
    compute_with_button, compute_with_data, compute_with_delivery, compute_with_meta, compute_with_reviews,
};
use super::{ComponentSchema, NestedInstanceMapping, PropertyMapping, PRICE_LABEL_NESTED};

pub static ESHOP_ITEM_SCHEMA: ComponentSchema = ComponentSchema {
    container_names: &["EShopItem"],

    container_properties: &[
        PropertyMapping::present(&["brand", "Brand"], "#Brand"),
        PropertyMapping::computed(&["withButton", "buttons", "BUTTONS"], "#BUTTON", |row, container, _| {
            compute_with_button(row, container).into()
        }),
        PropertyMapping::computed(&["withReviews"], "#withReviews", |row, _, _| {
            compute_with_reviews(row).into()
        }),
        PropertyMapping::computed(&["withDelivery", "delivery", "Delivery"], "#withDelivery", |row, _, _| {
            compute_with_delivery(row).into()
        }),
        PropertyMapping::new(&["withFintech", "fintech", "Fintech"], "#withFintech")
            .with_equals("#EPriceGroup_Fintech", "true"),
        PropertyMapping::equals(&["priceDisclaimer", "Price Disclaimer"], "#PriceDisclaimer", "true"),
        PropertyMapping::computed(&["withMeta", "deliveryFintech"], "#withMeta", |row, _, _| {
            compute_with_meta(row).into()
        }),
        PropertyMapping::computed(&["withData"], "#EShopItem_withData", |row, _, _| {
            compute_with_data(row).into()
        }),
        PropertyMapping::equals(&["favoriteBtn", "Favorite Btn", "[EXP] Favotite Btn"], "#FavoriteBtn", "true"),
        PropertyMapping::text(&["organicTitle"], "#OrganicTitle"),
        PropertyMapping::text(&["organicText"], "#OrganicText"),
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
        PRICE_LABEL_NESTED[1],
        PRICE_LABEL_NESTED[2],
    ],

    replaces_handlers: &[
        "BrandLogic",
        "MarketCheckoutButton",
        "OfficialShop",
        "ShopInfoDeliveryBnplContainer",
        "EShopItem",
    ],
};
