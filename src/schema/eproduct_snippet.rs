//! Product tile cards (`EProductSnippet`, `EProductSnippet2`, `ProductTile-Item`)

use super::transforms::compute_product_with_button;
use super::{ComponentSchema, NestedInstanceMapping, PropertyMapping, PRICE_LABEL_NESTED};

pub static EPRODUCT_SNIPPET_SCHEMA: ComponentSchema = ComponentSchema {
    container_names: &["EProductSnippet", "EProductSnippet2", "ProductTile-Item"],

    container_properties: &[
        PropertyMapping::new(&["withDelivery", "Delivery"], "#withDelivery").with_equals("#EDeliveryGroup", "true"),
        PropertyMapping::computed(&["withButton", "Button"], "#withButton", |row, _, _| {
            compute_product_with_button(row).into()
        }),
        PropertyMapping::text(&["organicTitle", "title", "Title"], "#OrganicTitle"),
        PropertyMapping::present(&["brand", "Brand"], "#Brand"),
    ],

    nested_instances: &[
        NestedInstanceMapping {
            instance_name: "EShopName",
            properties: &[PropertyMapping::text(&["name"], "#ShopName")],
        },
        PRICE_LABEL_NESTED[0],
        PRICE_LABEL_NESTED[1],
        PRICE_LABEL_NESTED[2],
    ],

    replaces_handlers: &["BrandLogic", "MarketCheckoutButton", "EProductSnippet"],
};
