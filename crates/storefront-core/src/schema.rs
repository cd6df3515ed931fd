//! Short filter-name -> fully qualified attribute path.
//!
//! The listing endpoint accepts bare attribute names ("ram", "color") and the
//! aggregation pipeline matches on joined-document paths
//! ("features.basicHardware.ram"). This module owns that mapping. Paths are a
//! hand-maintained table per entity, walked in entity order; when two entities
//! expose the same final segment the later entity wins.

use std::collections::BTreeMap;

pub type KeyMap = BTreeMap<String, String>;

const FEATURE_GROUPS: [&str; 5] = ["design", "screen", "basicHardware", "camera", "battery"];
const CATEGORY_ROOTS: [&str; 2] = ["category", "categorySlug"];

const PRODUCT_PATHS: &[&str] = &[
    "productSlug",
    "noticeId",
    "name",
    "brandId",
    "modelId",
    "numberOfOrders",
    "price.discountedPrice",
    "price.originalPrice",
    "price.sellingPrice",
    "description",
    "quantityOfStock",
    "categoryId",
    "sellerId",
    "images",
    "guarantyTime",
    "guarantyType",
    "numberOfComments",
    "numberOfRating",
    "ratingsCount",
    "averageRating",
    "cargoPrice",
    "freeCargo",
    "deliveryTime",
    "viewCount",
    "saleCount",
    "createdAt",
    "updatedAt",
    "featuresId",
    "_id",
    "__v",
];

const CATEGORY_PATHS: &[&str] = &[
    "category",
    "categorySlug",
    "createdAt",
    "updatedAt",
    "_id",
    "__v",
];

const FEATURES_PATHS: &[&str] = &[
    "noticeId",
    "productId",
    "modelId",
    "screen.screenSize",
    "screen.screenResulation",
    "screen.screenResulationStandard",
    "screen.screenTechnology",
    "screen.pixelDensity",
    "screen.screenRefreshRate",
    "screen.screenWeakness",
    "screen.screenBodyRatio",
    "battery.batteryCapacity",
    "battery.quickCharge",
    "battery.quickChargePower",
    "battery.wirelessCharge",
    "battery.chargeSocket",
    "battery.batteryTechnology",
    "camera.cameraCount",
    "camera.mainCamera.mainCameraPixel",
    "camera.mainCamera.mainCameraDiaphragm",
    "camera.frontCamera.frontCameraPixel",
    "camera.frontCamera.frontCameraDiaphragm",
    "basicHardware.chipset",
    "basicHardware.cpuFrequency",
    "basicHardware.cpuCores",
    "basicHardware.cpuArchitecture",
    "basicHardware.gpu",
    "basicHardware.ram",
    "basicHardware.internalStorage",
    "basicHardware.externalStorage",
    "basicHardware.fiveG",
    "basicHardware.nfc",
    "basicHardware.os",
    "design.color",
    "design.material",
    "design.dimensions.width",
    "design.dimensions.height",
    "design.dimensions.depth",
    "design.weight",
    "_id",
    "__v",
];

const BRAND_PATHS: &[&str] = &[
    "brand",
    "brandSlug",
    "brandId",
    "logoImage",
    "createdAt",
    "updatedAt",
    "_id",
    "__v",
];

const MODEL_PATHS: &[&str] = &[
    "model",
    "modelSlug",
    "brandId",
    "categoryId",
    "createdAt",
    "updatedAt",
    "_id",
    "__v",
];

/// Pure function of the static path tables; safe to rebuild per request.
pub fn build_key_map() -> KeyMap {
    let mut paths: Vec<&str> = Vec::new();
    for table in [
        PRODUCT_PATHS,
        CATEGORY_PATHS,
        FEATURES_PATHS,
        BRAND_PATHS,
        MODEL_PATHS,
    ] {
        for &path in table {
            // identical full paths dedupe to their first occurrence
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    let mut map = KeyMap::new();
    for path in paths {
        let first = path.split('.').next().unwrap_or(path);
        let last = path.split('.').last().unwrap_or(path);
        if FEATURE_GROUPS.contains(&first) {
            map.insert(last.to_string(), format!("features.{path}"));
        } else if CATEGORY_ROOTS.contains(&first) {
            map.insert(last.to_string(), format!("category.{path}"));
        } else if path == "model" || path == "brand" {
            map.insert(path.to_string(), format!("{path}.{path}"));
        } else if path == "_id" || path == "__v" {
            // internal identifiers never become filterable
            continue;
        } else {
            map.insert(last.to_string(), path.to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_is_deterministic() {
        assert_eq!(build_key_map(), build_key_map());
    }

    #[test]
    fn feature_paths_are_prefixed() {
        let map = build_key_map();
        assert_eq!(map["ram"].as_str(), "features.basicHardware.ram");
        assert_eq!(map["color"].as_str(), "features.design.color");
        assert_eq!(map["screenSize"].as_str(), "features.screen.screenSize");
        assert_eq!(
            map["mainCameraPixel"].as_str(),
            "features.camera.mainCamera.mainCameraPixel"
        );
        assert_eq!(map["width"].as_str(), "features.design.dimensions.width");
    }

    #[test]
    fn category_and_join_aliases() {
        let map = build_key_map();
        assert_eq!(map["category"].as_str(), "category.category");
        assert_eq!(map["categorySlug"].as_str(), "category.categorySlug");
        assert_eq!(map["brand"].as_str(), "brand.brand");
        assert_eq!(map["model"].as_str(), "model.model");
    }

    #[test]
    fn plain_product_paths_pass_through() {
        let map = build_key_map();
        assert_eq!(map["sellingPrice"].as_str(), "price.sellingPrice");
        assert_eq!(map["freeCargo"].as_str(), "freeCargo");
        assert_eq!(map["createdAt"].as_str(), "createdAt");
    }

    #[test]
    fn internal_identifiers_are_excluded() {
        let map = build_key_map();
        assert!(!map.contains_key("_id"));
        assert!(!map.contains_key("__v"));
    }

    #[test]
    fn duplicate_full_paths_keep_first_entity_meaning() {
        // "brandId" exists on Product, Brand and ProductModel with the same
        // literal path, so the mapping collapses to the unprefixed path.
        let map = build_key_map();
        assert_eq!(map["brandId"].as_str(), "brandId");
        assert_eq!(map["noticeId"].as_str(), "noticeId");
    }
}
