//! Seed-file support: a JSON catalog snapshot the server ingests at boot and
//! the admin CLI generates or queries offline.

use crate::traits::CatalogStore;
use serde::{Deserialize, Serialize};
use storefront_core::{Brand, Category, Features, Filter, FormFields, Product, ProductModel, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProduct {
    pub product: Product,
    pub features: Features,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFile {
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub models: Vec<ProductModel>,
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub form_fields: Vec<FormFields>,
}

pub async fn load_seed(store: &dyn CatalogStore, seed: SeedFile) -> Result<()> {
    let (categories, brands, models, products) = (
        seed.categories.len(),
        seed.brands.len(),
        seed.models.len(),
        seed.products.len(),
    );
    for doc in seed.categories {
        store.insert_category(doc).await?;
    }
    for doc in seed.brands {
        store.insert_brand(doc).await?;
    }
    for doc in seed.models {
        store.insert_model(doc).await?;
    }
    for doc in seed.products {
        store.insert_product(doc.product).await?;
        store.insert_features(doc.features).await?;
    }
    for doc in seed.filters {
        store.insert_filter(doc).await?;
    }
    for doc in seed.form_fields {
        store.insert_form_fields(doc).await?;
    }
    tracing::info!(categories, brands, models, products, "seed catalog loaded");
    Ok(())
}
