//! Hand-built demo catalog shared by the storage tests.

use crate::mem::InMemoryCatalog;
use crate::traits::CatalogStore;
use storefront_core::{
    BasicHardware, Battery, Brand, Camera, Category, Design, Dimensions, FeatureGroups,
    FrontCamera, GuarantyType, MainCamera, Price, Product, ProductDraft, ProductModel, Screen,
};

pub(crate) fn groups(color: &str, storage: u32, ram: u32, nfc: bool) -> FeatureGroups {
    FeatureGroups {
        screen: Screen {
            screen_size: 6.1,
            screen_resulation: "2556x1179".to_string(),
            screen_resulation_standard: "fhd+".to_string(),
            screen_technology: "oled".to_string(),
            pixel_density: 460,
            screen_refresh_rate: 60,
            screen_weakness: "none".to_string(),
            screen_body_ratio: 86.0,
        },
        battery: Battery {
            battery_capacity: 3700,
            quick_charge: true,
            quick_charge_power: 25,
            wireless_charge: true,
            charge_socket: "usb-c".to_string(),
            battery_technology: "li-ion".to_string(),
        },
        camera: Camera {
            camera_count: 2,
            main_camera: MainCamera {
                main_camera_pixel: 50,
                main_camera_diaphragm: 1.8,
            },
            front_camera: FrontCamera {
                front_camera_pixel: 12,
                front_camera_diaphragm: 2.2,
            },
        },
        basic_hardware: BasicHardware {
            chipset: "octa".to_string(),
            cpu_frequency: 3.0,
            cpu_cores: 8,
            cpu_architecture: "arm64".to_string(),
            gpu: "adreno".to_string(),
            ram,
            internal_storage: storage,
            external_storage: false,
            five_g: true,
            nfc,
            os: "android".to_string(),
        },
        design: Design {
            color: color.to_string(),
            material: "aluminium".to_string(),
            dimensions: Dimensions {
                width: 71.5,
                height: 146.7,
                depth: 7.8,
            },
            weight: 172.0,
        },
    }
}

fn draft(
    name: &str,
    brand: &str,
    model: &str,
    price: f64,
    color: &str,
    storage: u32,
    ram: u32,
    nfc: bool,
) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: "demo phone".to_string(),
        category: "mobile phone".to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        seller_id: "seller-1".to_string(),
        price: Price {
            original_price: price + 100.0,
            discounted_price: price + 50.0,
            selling_price: price,
        },
        quantity_of_stock: 10,
        images: vec![format!("{name}.jpg")],
        guaranty_time: 24,
        guaranty_type: GuarantyType::Importer,
        cargo_price: 5.0,
        free_cargo: price > 800.0,
        delivery_time: 3,
        features: groups(color, storage, ram, nfc),
    }
}

/// One category, two brands, two models, four products with varied colors,
/// storage sizes and prices.
pub(crate) async fn seeded_catalog() -> InMemoryCatalog {
    let store = InMemoryCatalog::new();
    let category = store
        .insert_category(Category::create("Mobile Phone"))
        .await
        .unwrap();
    let apple = store
        .insert_brand(Brand::create("Apple", None))
        .await
        .unwrap();
    let samsung = store
        .insert_brand(Brand::create("Samsung", None))
        .await
        .unwrap();
    let iphone = store
        .insert_model(ProductModel::create("iPhone 14", &apple.id, &category.id))
        .await
        .unwrap();
    let galaxy = store
        .insert_model(ProductModel::create("Galaxy S23", &samsung.id, &category.id))
        .await
        .unwrap();

    let specs = [
        ("iphone 14", &apple, &iphone, 900.0, "space gray", 128, 6, true),
        ("iphone 14", &apple, &iphone, 1100.0, "red", 256, 6, true),
        ("galaxy s23", &samsung, &galaxy, 700.0, "black", 128, 8, false),
        ("galaxy s23", &samsung, &galaxy, 500.0, "red", 1024, 12, true),
    ];
    for (name, brand, model, price, color, storage, ram, nfc) in specs {
        let (product, features) = Product::create(
            draft(name, &brand.brand, &model.model, price, color, storage, ram, nfc),
            &category,
            brand,
            model,
        );
        store.insert_product(product).await.unwrap();
        store.insert_features(features).await.unwrap();
    }
    store
}

/// A product whose features reference is gone; joins must refuse it.
pub(crate) async fn insert_product_without_features(store: &InMemoryCatalog) {
    let category = store.category_by_slug("mobile-phone").await.unwrap().unwrap();
    let brand = store.brand_by_slug("apple").await.unwrap().unwrap();
    let model = store.model_by_name("iphone 14").await.unwrap().unwrap();
    let (mut product, _features) = Product::create(
        draft("broken phone", "apple", "iphone 14", 100.0, "red", 64, 4, false),
        &category,
        &brand,
        &model,
    );
    product.features_id = None;
    store.insert_product(product).await.unwrap();
}
