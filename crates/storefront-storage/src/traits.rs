use storefront_core::{
    Brand, Category, Features, Filter, FormFields, Product, ProductModel, Result,
};

/// Document-store contract the catalog runs against. Implementations need
/// point lookups plus a full product scan; the aggregation pipeline builds
/// joins, grouping and sorting on top of these primitives.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    async fn insert_category(&self, doc: Category) -> Result<Category>;
    async fn category_by_id(&self, id: &str) -> Result<Option<Category>>;
    async fn category_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    async fn insert_brand(&self, doc: Brand) -> Result<Brand>;
    async fn brand_by_id(&self, id: &str) -> Result<Option<Brand>>;
    async fn brand_by_slug(&self, slug: &str) -> Result<Option<Brand>>;

    async fn insert_model(&self, doc: ProductModel) -> Result<ProductModel>;
    async fn model_by_id(&self, id: &str) -> Result<Option<ProductModel>>;
    async fn model_by_name(&self, name: &str) -> Result<Option<ProductModel>>;

    async fn insert_product(&self, doc: Product) -> Result<Product>;
    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>>;
    async fn products(&self) -> Result<Vec<Product>>;
    async fn product_count(&self) -> Result<u64>;

    async fn insert_features(&self, doc: Features) -> Result<Features>;
    async fn features_by_id(&self, id: &str) -> Result<Option<Features>>;

    /// Filters are replaced wholesale per category; no partial update path.
    async fn insert_filter(&self, doc: Filter) -> Result<Filter>;
    async fn filters_by_category(&self, category: &str) -> Result<Vec<Filter>>;

    async fn insert_form_fields(&self, doc: FormFields) -> Result<FormFields>;
    async fn form_fields_by_category(&self, category: &str) -> Result<Vec<FormFields>>;
}

/// Key-value cache contract: plain strings plus hash entries, each optionally
/// expiring. Handles are constructed and injected; nothing holds a global
/// connection.
#[async_trait::async_trait]
pub trait Cache: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;
    async fn del(&self, key: &str) -> Result<()>;

    async fn hset_all(
        &self,
        key: &str,
        fields: &[(String, String)],
        ttl_seconds: Option<u64>,
    ) -> Result<()>;
    async fn hget_all(&self, key: &str) -> Result<Option<Vec<(String, String)>>>;
}
