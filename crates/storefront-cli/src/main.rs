use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use storefront_core::{
    build_key_map, compile, normalize, BasicHardware, Battery, Brand, Camera, Category, Design,
    Dimensions, FeatureGroups, FrontCamera, GuarantyType, MainCamera, Price, Product,
    ProductDraft, ProductModel, Screen,
};
use storefront_storage::seed::{load_seed, SeedFile, SeedProduct};
use storefront_storage::{pipeline, InMemoryCatalog};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about="Storefront admin CLI", long_about=None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate a demo catalog seed file the server can load via SEED_FILE.
    Seed {
        out: String,
        #[arg(long, default_value_t = 4)]
        per_model: usize,
    },
    /// Run a listing query against a seed file, offline.
    Query {
        seed: String,
        /// key=value parameters, e.g. color=red|space-gray price=100-900
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Seed { out, per_model } => {
            let file = demo_seed(per_model);
            std::fs::write(&out, serde_json::to_vec_pretty(&file)?)?;
            println!("wrote {} products to {}", file.products.len(), out);
        }
        Cmd::Query { seed, params } => {
            let file: SeedFile = serde_json::from_str(&std::fs::read_to_string(&seed)?)?;
            let store = InMemoryCatalog::new();
            load_seed(&store, file).await?;

            let mut raw = BTreeMap::new();
            for pair in params {
                if let Some((key, value)) = pair.split_once('=') {
                    raw.insert(key.to_string(), value.to_string());
                }
            }
            let compiled = compile(&normalize(&raw), &build_key_map());
            let page = pipeline::run(&store, &compiled).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
    }
    Ok(())
}

const BRAND_LINES: &[(&str, &[&str])] = &[
    ("Apple", &["iPhone 14", "iPhone 15"]),
    ("Samsung", &["Galaxy S23", "Galaxy A54"]),
    ("Xiaomi", &["Redmi Note 12"]),
];
const COLORS: &[&str] = &["black", "space gray", "red", "blue"];
const STORAGES: &[u32] = &[128, 256, 512, 1024];

fn demo_seed(per_model: usize) -> SeedFile {
    let category = Category::create("Mobile Phone");
    let mut brands = Vec::new();
    let mut models = Vec::new();
    let mut products = Vec::new();
    for (brand_name, model_names) in BRAND_LINES {
        let brand = Brand::create(brand_name, None);
        for model_name in *model_names {
            let model = ProductModel::create(model_name, &brand.id, &category.id);
            for i in 0..per_model {
                let color = COLORS[i % COLORS.len()];
                let storage = STORAGES[i % STORAGES.len()];
                let price = 400.0 + 150.0 * i as f64;
                let draft = ProductDraft {
                    name: model.model.clone(),
                    description: format!("{} {} {}", brand.brand, model.model, color),
                    category: category.category.clone(),
                    brand: brand.brand.clone(),
                    model: model.model.clone(),
                    seller_id: format!("seller-{}", brand.brand_slug),
                    price: Price {
                        original_price: price + 100.0,
                        discounted_price: price + 50.0,
                        selling_price: price,
                    },
                    quantity_of_stock: 25,
                    images: vec![format!("{}-{}.jpg", model.model_slug, i)],
                    guaranty_time: 24,
                    guaranty_type: GuarantyType::Importer,
                    cargo_price: if price > 700.0 { 0.0 } else { 10.0 },
                    free_cargo: price > 700.0,
                    delivery_time: 1 + (i as u32 % 3),
                    features: demo_groups(color, storage, 4 + 2 * (i as u32 % 3), i % 2 == 0),
                };
                let (product, features) = Product::create(draft, &category, &brand, &model);
                products.push(SeedProduct { product, features });
            }
            models.push(model);
        }
        brands.push(brand);
    }
    SeedFile {
        categories: vec![category],
        brands,
        models,
        products,
        filters: Vec::new(),
        form_fields: Vec::new(),
    }
}

fn demo_groups(color: &str, storage: u32, ram: u32, nfc: bool) -> FeatureGroups {
    FeatureGroups {
        screen: Screen {
            screen_size: 6.1,
            screen_resulation: "2340x1080".to_string(),
            screen_resulation_standard: "fhd+".to_string(),
            screen_technology: "oled".to_string(),
            pixel_density: 420,
            screen_refresh_rate: 120,
            screen_weakness: "none".to_string(),
            screen_body_ratio: 85.0,
        },
        battery: Battery {
            battery_capacity: 4500,
            quick_charge: true,
            quick_charge_power: 33,
            wireless_charge: nfc,
            charge_socket: "usb-c".to_string(),
            battery_technology: "li-po".to_string(),
        },
        camera: Camera {
            camera_count: 3,
            main_camera: MainCamera {
                main_camera_pixel: 50,
                main_camera_diaphragm: 1.8,
            },
            front_camera: FrontCamera {
                front_camera_pixel: 16,
                front_camera_diaphragm: 2.4,
            },
        },
        basic_hardware: BasicHardware {
            chipset: "octa-core".to_string(),
            cpu_frequency: 2.8,
            cpu_cores: 8,
            cpu_architecture: "arm64".to_string(),
            gpu: "mali-g78".to_string(),
            ram,
            internal_storage: storage,
            external_storage: !nfc,
            five_g: true,
            nfc,
            os: "android".to_string(),
        },
        design: Design {
            color: color.to_string(),
            material: "glass".to_string(),
            dimensions: Dimensions {
                width: 74.0,
                height: 160.0,
                depth: 8.1,
            },
            weight: 190.0,
        },
    }
}
