use crate::util::{notice_id, slugify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use ulid::Ulid;

pub type DocumentId = String; // ULID string

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub original_price: f64,
    pub discounted_price: f64,
    pub selling_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuarantyType {
    Importer,
    Manufacturer,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCount {
    pub rate: u8,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub product_slug: String,
    pub notice_id: String,
    pub name: String,
    pub description: String,
    pub brand_id: DocumentId,
    pub model_id: DocumentId,
    pub category_id: DocumentId,
    pub seller_id: DocumentId,
    pub features_id: Option<DocumentId>,
    pub price: Price,
    pub quantity_of_stock: u32,
    pub number_of_orders: u32,
    pub sale_count: u32,
    pub view_count: u32,
    pub number_of_rating: u32,
    pub number_of_comments: u32,
    pub average_rating: f64,
    pub ratings_count: Vec<RatingCount>,
    pub images: Vec<String>,
    pub guaranty_time: u32,
    pub guaranty_type: GuarantyType,
    pub cargo_price: f64,
    pub free_cargo: bool,
    pub delivery_time: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound product payload. The seller identifies itself; session auth lives
/// outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub seller_id: DocumentId,
    pub price: Price,
    pub quantity_of_stock: u32,
    pub images: Vec<String>,
    pub guaranty_time: u32,
    pub guaranty_type: GuarantyType,
    #[serde(default)]
    pub cargo_price: f64,
    #[serde(default)]
    pub free_cargo: bool,
    pub delivery_time: u32,
    pub features: FeatureGroups,
}

impl Product {
    /// Builds the product and its features document in one step: shared
    /// notice id, derived slug, zeroed counters, the 5..1 ratings histogram,
    /// and the features back-link already wired.
    pub fn create(
        draft: ProductDraft,
        category: &Category,
        brand: &Brand,
        model: &ProductModel,
    ) -> (Product, Features) {
        let now = Utc::now();
        let notice = notice_id(10);
        let product_id = Ulid::new().to_string();
        let features = Features {
            id: Ulid::new().to_string(),
            notice_id: notice.clone(),
            product_id: product_id.clone(),
            model_id: model.id.clone(),
            groups: draft.features,
        };
        let product = Product {
            id: product_id,
            product_slug: slugify(&format!("{} {}-ni-{}", brand.brand, draft.name, notice)),
            notice_id: notice,
            name: draft.name,
            description: draft.description,
            brand_id: brand.id.clone(),
            model_id: model.id.clone(),
            category_id: category.id.clone(),
            seller_id: draft.seller_id,
            features_id: Some(features.id.clone()),
            price: draft.price,
            quantity_of_stock: draft.quantity_of_stock,
            number_of_orders: 0,
            sale_count: 0,
            view_count: 0,
            number_of_rating: 0,
            number_of_comments: 0,
            average_rating: 0.0,
            ratings_count: initial_ratings(),
            images: draft.images,
            guaranty_time: draft.guaranty_time,
            guaranty_type: draft.guaranty_type,
            cargo_price: draft.cargo_price,
            free_cargo: draft.free_cargo,
            delivery_time: draft.delivery_time,
            created_at: now,
            updated_at: now,
        };
        (product, features)
    }
}

// One entry per star, 5 down to 1, zero counts until reviews land.
fn initial_ratings() -> Vec<RatingCount> {
    (1..=5u8)
        .rev()
        .map(|rate| RatingCount { rate, count: 0 })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub notice_id: String,
    pub product_id: DocumentId,
    pub model_id: DocumentId,
    #[serde(flatten)]
    pub groups: FeatureGroups,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGroups {
    pub screen: Screen,
    pub battery: Battery,
    pub camera: Camera,
    pub basic_hardware: BasicHardware,
    pub design: Design,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub screen_size: f64,
    pub screen_resulation: String,
    pub screen_resulation_standard: String,
    pub screen_technology: String,
    pub pixel_density: u32,
    pub screen_refresh_rate: u32,
    pub screen_weakness: String,
    pub screen_body_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battery {
    pub battery_capacity: u32,
    pub quick_charge: bool,
    pub quick_charge_power: u32,
    pub wireless_charge: bool,
    pub charge_socket: String,
    pub battery_technology: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub camera_count: u32,
    pub main_camera: MainCamera,
    pub front_camera: FrontCamera,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainCamera {
    pub main_camera_pixel: u32,
    pub main_camera_diaphragm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontCamera {
    pub front_camera_pixel: u32,
    pub front_camera_diaphragm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicHardware {
    pub chipset: String,
    pub cpu_frequency: f64,
    pub cpu_cores: u32,
    pub cpu_architecture: String,
    pub gpu: String,
    pub ram: u32,
    pub internal_storage: u32,
    pub external_storage: bool,
    pub five_g: bool,
    pub nfc: bool,
    pub os: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub color: String,
    pub material: String,
    pub dimensions: Dimensions,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub category: String,
    pub category_slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn create(name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: Ulid::new().to_string(),
            category: name.trim().to_lowercase(),
            category_slug: slugify(name),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub brand: String,
    pub brand_slug: String,
    pub brand_id: String,
    pub logo_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    pub fn create(name: &str, logo_image: Option<String>) -> Brand {
        let now = Utc::now();
        Brand {
            id: Ulid::new().to_string(),
            brand: name.trim().to_lowercase(),
            brand_slug: slugify(name),
            brand_id: notice_id(6),
            logo_image,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductModel {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub model: String,
    pub model_slug: String,
    pub brand_id: DocumentId,
    pub category_id: DocumentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductModel {
    pub fn create(name: &str, brand_id: &str, category_id: &str) -> ProductModel {
        let now = Utc::now();
        ProductModel {
            id: Ulid::new().to_string(),
            model: name.trim().to_lowercase(),
            model_slug: slugify(name),
            brand_id: brand_id.to_string(),
            category_id: category_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One filterable attribute within one category: the distinct values plus
/// their display labels for the storefront filter UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    pub filter_name: String,
    pub beautiful_filter_name: String,
    pub filter_values: Vec<JsonValue>,
    pub beautiful_filter_values: Vec<JsonValue>,
    #[serde(default)]
    pub appendix_name: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub category_id: DocumentId,
    pub category: String,
    pub filters: Vec<FilterDescriptor>,
}

impl Filter {
    pub fn create(category_id: &str, category_slug: &str, filters: Vec<FilterDescriptor>) -> Filter {
        Filter {
            id: Ulid::new().to_string(),
            category_id: category_id.to_string(),
            category: category_slug.to_string(),
            filters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub r#type: String,
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub category_id: DocumentId,
    pub category: String,
    pub fields: Vec<FormField>,
}

impl FormFields {
    pub fn create(category_id: &str, category: &str, fields: Vec<FormField>) -> FormFields {
        FormFields {
            id: Ulid::new().to_string(),
            category_id: category_id.to_string(),
            category: category.to_string(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        serde_json::from_value(serde_json::json!({
            "name": "iphone 14",
            "description": "a phone",
            "category": "mobile phone",
            "brand": "apple",
            "model": "iphone 14",
            "sellerId": "seller-1",
            "price": {"originalPrice": 1000.0, "discountedPrice": 950.0, "sellingPrice": 900.0},
            "quantityOfStock": 5,
            "images": ["a.jpg"],
            "guarantyTime": 24,
            "guarantyType": "importer",
            "deliveryTime": 3,
            "features": {
                "screen": {
                    "screenSize": 6.1, "screenResulation": "2556x1179",
                    "screenResulationStandard": "fhd+", "screenTechnology": "oled",
                    "pixelDensity": 460, "screenRefreshRate": 60,
                    "screenWeakness": "none", "screenBodyRatio": 86.0
                },
                "battery": {
                    "batteryCapacity": 3279, "quickCharge": true, "quickChargePower": 20,
                    "wirelessCharge": true, "chargeSocket": "lightning",
                    "batteryTechnology": "li-ion"
                },
                "camera": {
                    "cameraCount": 2,
                    "mainCamera": {"mainCameraPixel": 12, "mainCameraDiaphragm": 1.5},
                    "frontCamera": {"frontCameraPixel": 12, "frontCameraDiaphragm": 1.9}
                },
                "basicHardware": {
                    "chipset": "a15", "cpuFrequency": 3.2, "cpuCores": 6,
                    "cpuArchitecture": "arm64", "gpu": "apple gpu", "ram": 6,
                    "internalStorage": 128, "externalStorage": false,
                    "fiveG": true, "nfc": true, "os": "ios"
                },
                "design": {
                    "color": "midnight", "material": "aluminium",
                    "dimensions": {"width": 71.5, "height": 146.7, "depth": 7.8},
                    "weight": 172.0
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn product_creation_links_features_and_seeds_ratings() {
        let category = Category::create("Mobile Phone");
        let brand = Brand::create("Apple", None);
        let model = ProductModel::create("iPhone 14", &brand.id, &category.id);
        let (product, features) = Product::create(draft(), &category, &brand, &model);

        assert_eq!(product.features_id.as_deref(), Some(features.id.as_str()));
        assert_eq!(features.product_id, product.id);
        assert_eq!(features.notice_id, product.notice_id);
        assert!(product
            .product_slug
            .starts_with("apple-iphone-14-ni-"));
        let rates: Vec<u8> = product.ratings_count.iter().map(|r| r.rate).collect();
        assert_eq!(rates, vec![5, 4, 3, 2, 1]);
        assert!(product.ratings_count.iter().all(|r| r.count == 0));
    }

    #[test]
    fn slugs_are_derived_once_from_the_name() {
        let category = Category::create("Mobile Phone");
        assert_eq!(category.category, "mobile phone");
        assert_eq!(category.category_slug, "mobile-phone");
        let brand = Brand::create("Apple", None);
        assert_eq!(brand.brand_slug, "apple");
        assert_eq!(brand.brand_id.len(), 6);
    }

    #[test]
    fn wire_shape_is_camel_case_with_mongo_style_id() {
        let category = Category::create("Mobile Phone");
        let value = serde_json::to_value(&category).unwrap();
        assert!(value.get("_id").is_some());
        assert!(value.get("categorySlug").is_some());
    }
}
