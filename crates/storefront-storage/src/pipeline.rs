//! Product listing pipeline: join, match, sort, paginate, project.
//!
//! Every product row is joined with its features, model, brand and category
//! documents up front, so match conditions and sort keys may reference any
//! joined path ("features.basicHardware.ram", "brand.brand"). Joined rows are
//! evaluated as JSON documents; condition paths resolve by dot-path lookup.

use crate::traits::CatalogStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use storefront_core::{
    Brand, CatalogError, Category, CompiledQuery, Condition, Direction, FeatureGroups, Features,
    ListItem, Price, Product, ProductModel, QueryValue, Result, SortSpec,
};

pub struct JoinedProduct {
    pub product: Product,
    pub features: Features,
    pub model: ProductModel,
    pub brand: Brand,
    pub category: Category,
    /// Product document with the joined entities embedded, the shape match
    /// conditions and sort paths are written against.
    pub doc: JsonValue,
}

impl JoinedProduct {
    fn new(
        product: Product,
        features: Features,
        model: ProductModel,
        brand: Brand,
        category: Category,
    ) -> Result<JoinedProduct> {
        let mut doc = to_json(&product)?;
        doc["features"] = to_json(&features)?;
        doc["model"] = to_json(&model)?;
        doc["brand"] = to_json(&brand)?;
        doc["category"] = to_json(&category)?;
        Ok(JoinedProduct {
            product,
            features,
            model,
            brand,
            category,
            doc,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| CatalogError::Internal(e.to_string()))
}

/// All joins are required one-to-one; a product with a dangling reference
/// aborts the whole request instead of degrading to a partial result.
pub async fn join_products(store: &dyn CatalogStore) -> Result<Vec<JoinedProduct>> {
    let products = store.products().await?;
    let mut rows = Vec::with_capacity(products.len());
    for product in products {
        let features_id = product.features_id.clone().ok_or_else(|| {
            CatalogError::Internal(format!(
                "product '{}' has no features document",
                product.product_slug
            ))
        })?;
        let features = store.features_by_id(&features_id).await?.ok_or_else(|| {
            CatalogError::Internal(format!(
                "features '{}' missing for product '{}'",
                features_id, product.product_slug
            ))
        })?;
        let model = store.model_by_id(&product.model_id).await?.ok_or_else(|| {
            CatalogError::Internal(format!(
                "model '{}' missing for product '{}'",
                product.model_id, product.product_slug
            ))
        })?;
        let brand = store.brand_by_id(&product.brand_id).await?.ok_or_else(|| {
            CatalogError::Internal(format!(
                "brand '{}' missing for product '{}'",
                product.brand_id, product.product_slug
            ))
        })?;
        let category = store
            .category_by_id(&product.category_id)
            .await?
            .ok_or_else(|| {
                CatalogError::Internal(format!(
                    "category '{}' missing for product '{}'",
                    product.category_id, product.product_slug
                ))
            })?;
        rows.push(JoinedProduct::new(product, features, model, brand, category)?);
    }
    Ok(rows)
}

pub fn lookup<'a>(doc: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(doc, |value, segment| value.get(segment))
}

pub fn matches(doc: &JsonValue, conditions: &std::collections::BTreeMap<String, Condition>) -> bool {
    conditions.iter().all(|(path, condition)| {
        lookup(doc, path).map_or(false, |value| condition_matches(value, condition))
    })
}

fn condition_matches(value: &JsonValue, condition: &Condition) -> bool {
    match condition {
        Condition::Between { bottom, top } => value
            .as_f64()
            .map_or(false, |n| n >= *bottom && n <= *top),
        Condition::In(items) => items.iter().any(|item| item_eq(value, item)),
        Condition::Eq(query) => query_eq(value, query),
    }
}

fn query_eq(value: &JsonValue, query: &QueryValue) -> bool {
    match query {
        QueryValue::Number(n) => value.as_f64() == Some(*n as f64),
        QueryValue::Bool(b) => value.as_bool() == Some(*b),
        QueryValue::Text(s) => value.as_str() == Some(s.as_str()),
        // equality against a list only holds for an identical array field
        QueryValue::List(items) => value.as_array().map_or(false, |arr| {
            arr.len() == items.len() && arr.iter().zip(items).all(|(v, i)| item_eq(v, i))
        }),
    }
}

fn item_eq(value: &JsonValue, item: &ListItem) -> bool {
    match item {
        ListItem::Number(n) => value.as_f64() == Some(*n as f64),
        ListItem::Text(s) => value.as_str() == Some(s.as_str()),
    }
}

fn default_sort() -> SortSpec {
    SortSpec::new("createdAt", Direction::Desc)
}

fn sort_rows(rows: &mut [JoinedProduct], spec: &SortSpec) {
    rows.sort_by(|a, b| {
        let ordering = compare_json(lookup(&a.doc, &spec.path), lookup(&b.doc, &spec.path));
        match spec.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
}

fn compare_json(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            if let (Some(nx), Some(ny)) = (x.as_f64(), y.as_f64()) {
                nx.partial_cmp(&ny).unwrap_or(Ordering::Equal)
            } else if let (Some(sx), Some(sy)) = (x.as_str(), y.as_str()) {
                sx.cmp(sy)
            } else if let (Some(bx), Some(by)) = (x.as_bool(), y.as_bool()) {
                bx.cmp(&by)
            } else {
                Ordering::Equal
            }
        }
        // present values sort before missing ones
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Display shape for one listing row, including the canonical storefront URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub cargo_price: f64,
    pub category: String,
    pub model: String,
    pub product_slug: String,
    pub storage: u32,
    pub images: Vec<String>,
    pub ram: u32,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub number_of_rating: u32,
    pub free_cargo: bool,
    pub number_of_comments: u32,
    pub url: String,
}

impl ProductSummary {
    fn project(row: &JoinedProduct) -> ProductSummary {
        let product = &row.product;
        ProductSummary {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: row.brand.brand.clone(),
            price: product.price.selling_price,
            cargo_price: product.cargo_price,
            category: row.category.category.clone(),
            model: row.model.model.clone(),
            product_slug: product.product_slug.clone(),
            storage: row.features.groups.basic_hardware.internal_storage,
            images: product.images.clone(),
            ram: row.features.groups.basic_hardware.ram,
            color: row.features.groups.design.color.clone(),
            created_at: product.created_at,
            number_of_rating: product.number_of_rating,
            free_cargo: product.free_cargo,
            number_of_comments: product.number_of_comments,
            url: format!("/product/{}/{}", row.brand.brand, product.product_slug),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub limit: u64,
    pub skip: u64,
    pub page: u64,
    pub current_page: u64,
    pub next_page: Option<u64>,
    pub prev_page: u64,
    pub length: u64,
    pub total_length: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub docs: Vec<ProductSummary>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

// Totals reproduce the storefront's observed accounting: the collection-wide
// unfiltered count, and a page count derived from the current slice. Kept as
// named fns so a correction is a one-line change.
fn total_pages(page_length: u64, limit: u64) -> u64 {
    (page_length + limit - 1) / limit
}

async fn total_collection_len(store: &dyn CatalogStore) -> Result<u64> {
    store.product_count().await
}

pub async fn run(store: &dyn CatalogStore, query: &CompiledQuery) -> Result<ProductPage> {
    let mut rows: Vec<JoinedProduct> = join_products(store)
        .await?
        .into_iter()
        .filter(|row| matches(&row.doc, &query.conditions))
        .collect();
    let sort = query.sort.clone().unwrap_or_else(default_sort);
    sort_rows(&mut rows, &sort);

    let page = query.page;
    let limit = query.limit;
    let skip = (page - 1) * limit;
    let docs: Vec<ProductSummary> = rows
        .iter()
        .skip(skip as usize)
        .take(limit as usize)
        .map(ProductSummary::project)
        .collect();

    let length = docs.len() as u64;
    let total_length = total_collection_len(store).await?;
    let total_pages = total_pages(length, limit);
    let next_page = (total_pages > page).then(|| page + 1);
    let prev_page = if page == 1 { 1 } else { page - 1 };

    Ok(ProductPage {
        docs,
        page_info: PageInfo {
            limit,
            skip,
            page,
            current_page: page,
            next_page,
            prev_page,
            length,
            total_length,
            total_pages,
            has_next_page: total_pages > page,
            has_prev_page: page > 1,
        },
    })
}

/// Joined detail view for a single product page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub price: Price,
    pub images: Vec<String>,
    pub product_slug: String,
    pub seller_id: String,
    pub created_at: DateTime<Utc>,
    pub average_rating: f64,
    pub features: FeatureGroups,
}

pub async fn product_detail(store: &dyn CatalogStore, slug: &str) -> Result<ProductDetail> {
    let product = store
        .product_by_slug(slug)
        .await?
        .ok_or_else(|| CatalogError::NotFound("This product does not exist.".to_string()))?;
    let features_id = product.features_id.clone().ok_or_else(|| {
        CatalogError::Internal(format!(
            "product '{}' has no features document",
            product.product_slug
        ))
    })?;
    let features = store.features_by_id(&features_id).await?.ok_or_else(|| {
        CatalogError::Internal(format!(
            "features '{}' missing for product '{}'",
            features_id, product.product_slug
        ))
    })?;
    let model = store.model_by_id(&product.model_id).await?.ok_or_else(|| {
        CatalogError::Internal(format!(
            "model '{}' missing for product '{}'",
            product.model_id, product.product_slug
        ))
    })?;
    let brand = store.brand_by_id(&product.brand_id).await?.ok_or_else(|| {
        CatalogError::Internal(format!(
            "brand '{}' missing for product '{}'",
            product.brand_id, product.product_slug
        ))
    })?;
    Ok(ProductDetail {
        name: product.name,
        brand: brand.brand,
        model: model.model,
        price: product.price,
        images: product.images,
        product_slug: product.product_slug,
        seller_id: product.seller_id,
        created_at: product.created_at,
        average_rating: product.average_rating,
        features: features.groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::collections::BTreeMap;
    use storefront_core::{build_key_map, compile, normalize};

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn list(
        store: &dyn CatalogStore,
        pairs: &[(&str, &str)],
    ) -> ProductPage {
        let key_map = build_key_map();
        let query = compile(&normalize(&raw(pairs)), &key_map);
        run(store, &query).await.unwrap()
    }

    #[tokio::test]
    async fn unfiltered_listing_returns_every_product() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[]).await;
        assert_eq!(page.docs.len(), 4);
        assert_eq!(page.page_info.total_length, 4);
    }

    #[tokio::test]
    async fn color_membership_filters_rows() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("color", "red|space-gray")]).await;
        let colors: Vec<&str> = page.docs.iter().map(|d| d.color.as_str()).collect();
        assert!(!page.docs.is_empty());
        assert!(colors.iter().all(|c| *c == "red" || *c == "space gray"));
    }

    #[tokio::test]
    async fn price_range_is_inclusive_and_order_independent() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("price", "900-500")]).await;
        assert!(!page.docs.is_empty());
        assert!(page
            .docs
            .iter()
            .all(|d| d.price >= 500.0 && d.price <= 900.0));
    }

    #[tokio::test]
    async fn boolean_condition_reaches_joined_features() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("nfc", "true")]).await;
        assert!(!page.docs.is_empty());
        let all = list(&store, &[]).await;
        assert!(page.docs.len() < all.docs.len());
    }

    #[tokio::test]
    async fn unmapped_keys_do_not_constrain() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("warpDrive", "yes")]).await;
        assert_eq!(page.docs.len(), 4);
    }

    #[tokio::test]
    async fn price_sort_orders_ascending() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("sort", "PRICE_BY_ASC")]).await;
        let prices: Vec<f64> = page.docs.iter().map(|d| d.price).collect();
        let mut sorted = prices.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(prices, sorted);
    }

    #[tokio::test]
    async fn pagination_matches_the_documented_shape() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("limit", "10"), ("page", "2")]).await;
        assert_eq!(page.page_info.skip, 10);
        assert_eq!(page.page_info.limit, 10);
        assert!(page.page_info.has_prev_page);
        assert_eq!(page.page_info.prev_page, 1);
        // only four products exist, page two is empty
        assert_eq!(page.page_info.length, 0);
        assert_eq!(page.page_info.total_length, 4);
        assert_eq!(page.page_info.next_page, None);
    }

    #[tokio::test]
    async fn first_page_slices_by_limit() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("limit", "3")]).await;
        assert_eq!(page.docs.len(), 3);
        assert_eq!(page.page_info.length, 3);
        assert_eq!(page.page_info.prev_page, 1);
        assert!(!page.page_info.has_prev_page);
    }

    #[tokio::test]
    async fn projection_builds_the_canonical_url() {
        let store = fixtures::seeded_catalog().await;
        let page = list(&store, &[("brand", "apple")]).await;
        let doc = &page.docs[0];
        assert_eq!(doc.brand, "apple");
        assert_eq!(doc.url, format!("/product/apple/{}", doc.product_slug));
    }

    #[tokio::test]
    async fn dangling_features_reference_aborts_the_listing() {
        let store = fixtures::seeded_catalog().await;
        fixtures::insert_product_without_features(&store).await;
        let key_map = build_key_map();
        let query = compile(&normalize(&raw(&[])), &key_map);
        let err = run(&store, &query).await.unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[tokio::test]
    async fn detail_view_joins_brand_model_and_features() {
        let store = fixtures::seeded_catalog().await;
        let all = list(&store, &[]).await;
        let slug = &all.docs[0].product_slug;
        let detail = product_detail(&store, slug).await.unwrap();
        assert_eq!(&detail.product_slug, slug);
        assert!(!detail.brand.is_empty());
        assert!(!detail.model.is_empty());

        let missing = product_detail(&store, "no-such-slug").await.unwrap_err();
        assert_eq!(missing.status(), 404);
    }
}
