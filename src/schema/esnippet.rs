//! Universal snippet card (`ESnippet`, `Snippet`)
//!
//! Structural work on this card (sitelinks, promo text, thumb fallback,
//! clipping) is done by the `esnippet-structure` hook after these mappings.

use super::transforms::{
    compute_snippet_with_button, compute_snippet_with_data, compute_snippet_with_delivery,
    compute_snippet_with_ecom_meta, compute_snippet_with_fintech, compute_snippet_with_meta,
    compute_snippet_with_price, compute_snippet_with_promo, compute_with_address, compute_with_contacts,
    compute_with_quotes, compute_with_reviews,
};
use super::{ComponentSchema, PropertyMapping};

pub static ESNIPPET_SCHEMA: ComponentSchema = ComponentSchema {
    container_names: &["ESnippet", "Snippet"],

    container_properties: &[
        PropertyMapping::equals(&["withThumb"], "#withThumb", "true"),
        PropertyMapping::computed(&["withReviews"], "#withReviews", |row, _, _| {
            compute_with_reviews(row).into()
        }),
        PropertyMapping::computed(&["withQuotes"], "#withQuotes", |row, _, _| compute_with_quotes(row).into()),
        PropertyMapping::computed(&["withDelivery"], "#withDelivery", |row, _, _| {
            compute_snippet_with_delivery(row).into()
        }),
        PropertyMapping::computed(&["withFintech"], "#withFintech", |row, _, _| {
            compute_snippet_with_fintech(row).into()
        }),
        PropertyMapping::computed(&["withAddress"], "#withAddress", |row, _, _| {
            compute_with_address(row).into()
        }),
        PropertyMapping::new(&["withSitelinks", "SITELINKS", "Sitelinks"], "#withSitelinks")
            .with_equals("#Sitelinks", "true"),
        PropertyMapping::computed(&["withPromo"], "#withPromo", |row, _, _| {
            compute_snippet_with_promo(row).into()
        }),
        PropertyMapping::computed(&["withButton"], "#withButton", |row, container, _| {
            compute_snippet_with_button(row, container).into()
        }),
        PropertyMapping::computed(&["withMeta"], "#withMeta", |row, _, _| {
            compute_snippet_with_meta(row).into()
        }),
        PropertyMapping::computed(&["withData"], "#withData", |row, _, _| {
            compute_snippet_with_data(row).into()
        }),
        PropertyMapping::computed(&["withContacts"], "#withContacts", |row, _, _| {
            compute_with_contacts(row).into()
        }),
        PropertyMapping::computed(&["withPrice"], "#withPrice", |row, _, _| {
            compute_snippet_with_price(row).into()
        }),
        PropertyMapping::computed(&["withEcomMeta"], "#withEcomMeta", |row, _, _| {
            compute_snippet_with_ecom_meta(row).into()
        }),
        PropertyMapping::equals(&["showKebab"], "#showKebab", "true"),
        PropertyMapping::new(&["isOfficial", "official", "Official"], "#isOfficial").with_equals("#OfficialShop", "true"),
        PropertyMapping::equals(&["isPromo", "promo", "isAdv"], "#isPromo", "true"),
        PropertyMapping::text(&["organicTitle"], "#OrganicTitle"),
        PropertyMapping::text(&["organicText"], "#OrganicText"),
        PropertyMapping::text(&["organicHost"], "#OrganicHost"),
        PropertyMapping::text(&["organicPath"], "#OrganicPath"),
        PropertyMapping::text(&["promoText", "promo"], "#Promo"),
    ],

    nested_instances: &[],

    replaces_handlers: &["MarketCheckoutButton", "OfficialShop", "ShopInfoDeliveryBnplContainer", "ESnippetProps"],
};
