use crate::traits::{Cache, CatalogStore};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use storefront_core::{
    Brand, CatalogError, Category, Features, Filter, FormFields, Product, ProductModel, Result,
};

#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    // collections keyed by document id
    categories: HashMap<String, Category>,
    brands: HashMap<String, Brand>,
    models: HashMap<String, ProductModel>,
    products: HashMap<String, Product>,
    features: HashMap<String, Features>,
    filters: HashMap<String, Filter>,
    form_fields: HashMap<String, FormFields>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn insert_category(&self, doc: Category) -> Result<Category> {
        let mut inner = self.inner.write();
        if inner.categories.values().any(|c| c.category == doc.category) {
            return Err(CatalogError::BadRequest(format!(
                "category '{}' already exists",
                doc.category
            )));
        }
        inner.categories.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn category_by_id(&self, id: &str) -> Result<Option<Category>> {
        Ok(self.inner.read().categories.get(id).cloned())
    }

    async fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let inner = self.inner.read();
        Ok(inner
            .categories
            .values()
            .find(|c| c.category == name)
            .cloned())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let inner = self.inner.read();
        Ok(inner
            .categories
            .values()
            .find(|c| c.category_slug == slug)
            .cloned())
    }

    async fn insert_brand(&self, doc: Brand) -> Result<Brand> {
        let mut inner = self.inner.write();
        if inner.brands.values().any(|b| b.brand == doc.brand) {
            return Err(CatalogError::BadRequest(format!(
                "brand '{}' already exists",
                doc.brand
            )));
        }
        inner.brands.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn brand_by_id(&self, id: &str) -> Result<Option<Brand>> {
        Ok(self.inner.read().brands.get(id).cloned())
    }

    async fn brand_by_slug(&self, slug: &str) -> Result<Option<Brand>> {
        let inner = self.inner.read();
        Ok(inner
            .brands
            .values()
            .find(|b| b.brand_slug == slug)
            .cloned())
    }

    async fn insert_model(&self, doc: ProductModel) -> Result<ProductModel> {
        let mut inner = self.inner.write();
        if inner.models.values().any(|m| m.model == doc.model) {
            return Err(CatalogError::BadRequest(format!(
                "model '{}' already exists",
                doc.model
            )));
        }
        inner.models.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn model_by_id(&self, id: &str) -> Result<Option<ProductModel>> {
        Ok(self.inner.read().models.get(id).cloned())
    }

    async fn model_by_name(&self, name: &str) -> Result<Option<ProductModel>> {
        let inner = self.inner.read();
        Ok(inner.models.values().find(|m| m.model == name).cloned())
    }

    async fn insert_product(&self, doc: Product) -> Result<Product> {
        let mut inner = self.inner.write();
        if inner
            .products
            .values()
            .any(|p| p.product_slug == doc.product_slug || p.notice_id == doc.notice_id)
        {
            return Err(CatalogError::BadRequest(format!(
                "product '{}' already exists",
                doc.product_slug
            )));
        }
        inner.products.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let inner = self.inner.read();
        Ok(inner
            .products
            .values()
            .find(|p| p.product_slug == slug)
            .cloned())
    }

    async fn products(&self) -> Result<Vec<Product>> {
        Ok(self.inner.read().products.values().cloned().collect())
    }

    async fn product_count(&self) -> Result<u64> {
        Ok(self.inner.read().products.len() as u64)
    }

    async fn insert_features(&self, doc: Features) -> Result<Features> {
        self.inner.write().features.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn features_by_id(&self, id: &str) -> Result<Option<Features>> {
        Ok(self.inner.read().features.get(id).cloned())
    }

    async fn insert_filter(&self, doc: Filter) -> Result<Filter> {
        let mut inner = self.inner.write();
        // wholesale replacement per category
        inner.filters.retain(|_, f| f.category != doc.category);
        inner.filters.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn filters_by_category(&self, category: &str) -> Result<Vec<Filter>> {
        let inner = self.inner.read();
        Ok(inner
            .filters
            .values()
            .filter(|f| f.category == category)
            .cloned()
            .collect())
    }

    async fn insert_form_fields(&self, doc: FormFields) -> Result<FormFields> {
        self.inner
            .write()
            .form_fields
            .insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn form_fields_by_category(&self, category: &str) -> Result<Vec<FormFields>> {
        let inner = self.inner.read();
        Ok(inner
            .form_fields
            .values()
            .filter(|f| f.category == category)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCache {
    inner: Arc<RwLock<CacheInner>>,
}

#[derive(Default)]
struct CacheInner {
    strings: HashMap<String, Entry<String>>,
    hashes: HashMap<String, Entry<Vec<(String, String)>>>,
}

struct Entry<T> {
    value: T,
    expires_at: Option<DateTime<Utc>>,
}

impl<T> Entry<T> {
    fn new(value: T, ttl_seconds: Option<u64>) -> Self {
        Entry {
            value,
            expires_at: ttl_seconds.map(|t| Utc::now() + Duration::seconds(t as i64)),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        match inner.strings.get(key) {
            Some(entry) if entry.is_expired(now) => {
                inner.strings.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .write()
            .strings
            .insert(key.to_string(), Entry::new(value.to_string(), None));
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        self.inner.write().strings.insert(
            key.to_string(),
            Entry::new(value.to_string(), Some(ttl_seconds)),
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner.strings.remove(key);
        inner.hashes.remove(key);
        Ok(())
    }

    async fn hset_all(
        &self,
        key: &str,
        fields: &[(String, String)],
        ttl_seconds: Option<u64>,
    ) -> Result<()> {
        self.inner
            .write()
            .hashes
            .insert(key.to_string(), Entry::new(fields.to_vec(), ttl_seconds));
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> Result<Option<Vec<(String, String)>>> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        match inner.hashes.get(key) {
            Some(entry) if entry.is_expired(now) => {
                inner.hashes.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use storefront_core::Category;

    #[tokio::test]
    async fn duplicate_category_names_are_rejected() {
        let store = InMemoryCatalog::new();
        store
            .insert_category(Category::create("Mobile Phone"))
            .await
            .unwrap();
        let err = store
            .insert_category(Category::create("mobile phone"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn expired_string_entries_read_as_missing() {
        let cache = InMemoryCache::new();
        cache.set_ex("filter#phones", "{}", 0).await.unwrap();
        assert_eq!(cache.get("filter#phones").await.unwrap(), None);

        cache.set("filter#phones", "{}").await.unwrap();
        assert_eq!(
            cache.get("filter#phones").await.unwrap().as_deref(),
            Some("{}")
        );
    }

    #[tokio::test]
    async fn user_hashes_round_trip_with_ttl() {
        let cache = InMemoryCache::new();
        let key = keys::address("user-1");
        let fields = vec![("home".to_string(), "12 main st".to_string())];
        cache
            .hset_all(&key, &fields, Some(keys::USER_HASH_TTL_SECS))
            .await
            .unwrap();
        assert_eq!(cache.hget_all(&key).await.unwrap(), Some(fields));

        cache.hset_all(&key, &[], Some(0)).await.unwrap();
        assert_eq!(cache.hget_all(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn del_clears_both_shapes() {
        let cache = InMemoryCache::new();
        cache.set("k", "v").await.unwrap();
        cache
            .hset_all("k", &[("f".to_string(), "v".to_string())], None)
            .await
            .unwrap();
        cache.del("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.hget_all("k").await.unwrap(), None);
    }
}
