//! Category-scoped storefront metadata: filter facets and form fields.
//!
//! Facet creation is an explicit admin action: it walks the same joined rows
//! as the listing pipeline, collects the distinct value set per requested
//! attribute, persists the result wholesale and mirrors it into the cache.
//! Retrieval is cache-first with a store rebuild on miss; nothing here ever
//! expires on its own.

use crate::keys;
use crate::pipeline::{join_products, lookup, JoinedProduct};
use crate::traits::{Cache, CatalogStore};
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::cmp::Ordering;
use storefront_core::{
    build_key_map, CatalogError, Filter, FilterDescriptor, FormField, FormFields, Result,
    BOOLEAN_KEYS,
};

static CACHE_LOOKUPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "cache_lookups_total",
        "Cache lookups by kind and outcome",
        &["kind", "outcome"]
    )
    .unwrap()
});

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub filter_name: String,
    pub beautiful_filter_name: String,
    #[serde(default)]
    pub appendix_name: Vec<String>,
}

/// Cached shape for one category's filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterView {
    pub category: String,
    pub filters: Vec<FilterDescriptor>,
}

/// Cached shape for one category's form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFieldsView {
    pub category: String,
    pub fields: Vec<FormField>,
}

pub async fn create_filter(
    store: &dyn CatalogStore,
    cache: &dyn Cache,
    category_name: &str,
    requests: &[FilterRequest],
) -> Result<Filter> {
    let category = store
        .category_by_name(category_name)
        .await?
        .ok_or_else(|| CatalogError::NotFound("Category not found".to_string()))?;
    let key_map = build_key_map();
    let rows: Vec<JoinedProduct> = join_products(store)
        .await?
        .into_iter()
        .filter(|row| row.product.category_id == category.id)
        .collect();

    let mut descriptors = Vec::new();
    for request in requests {
        // attribute names outside the key-map are skipped, not errors
        let Some(path) = key_map.get(&request.filter_name) else {
            continue;
        };
        if BOOLEAN_KEYS.contains(&request.filter_name.as_str()) {
            descriptors.push(FilterDescriptor {
                filter_name: request.filter_name.clone(),
                beautiful_filter_name: request.beautiful_filter_name.clone(),
                filter_values: vec![json!(true), json!(false)],
                beautiful_filter_values: vec![json!("There are"), json!("there aren’t")],
                appendix_name: request.appendix_name.clone(),
            });
            continue;
        }
        let mut values: Vec<JsonValue> = Vec::new();
        for row in &rows {
            if let Some(value) = lookup(&row.doc, path) {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        sort_values(&mut values);
        let beautiful = values.iter().map(|v| decorate(request, v)).collect();
        descriptors.push(FilterDescriptor {
            filter_name: request.filter_name.clone(),
            beautiful_filter_name: request.beautiful_filter_name.clone(),
            filter_values: values,
            beautiful_filter_values: beautiful,
            appendix_name: request.appendix_name.clone(),
        });
    }

    let doc = store
        .insert_filter(Filter::create(
            &category.id,
            &category.category_slug,
            descriptors,
        ))
        .await?;
    let view = FilterView {
        category: category.category_slug.clone(),
        filters: doc.filters.clone(),
    };
    cache
        .set(&keys::filter(&category.category_slug), &encode(&view)?)
        .await?;
    Ok(doc)
}

pub async fn get_filter(
    store: &dyn CatalogStore,
    cache: &dyn Cache,
    category: &str,
) -> Result<FilterView> {
    let key = keys::filter(category);
    if let Some(cached) = cache.get(&key).await? {
        CACHE_LOOKUPS_TOTAL.with_label_values(&["filter", "hit"]).inc();
        return decode(&cached);
    }
    CACHE_LOOKUPS_TOTAL.with_label_values(&["filter", "miss"]).inc();
    tracing::debug!(category, "filter cache miss, rebuilding from store");

    let docs = store.filters_by_category(category).await?;
    if docs.is_empty() {
        return Err(CatalogError::NotFound("Category not found".to_string()));
    }
    let mut grouped: Vec<FilterDescriptor> = Vec::new();
    for doc in &docs {
        for descriptor in &doc.filters {
            match grouped
                .iter_mut()
                .find(|g| g.filter_name == descriptor.filter_name)
            {
                Some(existing) => {
                    for value in &descriptor.filter_values {
                        if !existing.filter_values.contains(value) {
                            existing.filter_values.push(value.clone());
                        }
                    }
                    for value in &descriptor.beautiful_filter_values {
                        if !existing.beautiful_filter_values.contains(value) {
                            existing.beautiful_filter_values.push(value.clone());
                        }
                    }
                }
                None => grouped.push(descriptor.clone()),
            }
        }
    }
    let view = FilterView {
        category: category.to_string(),
        filters: grouped,
    };
    cache.set(&key, &encode(&view)?).await?;
    Ok(view)
}

pub async fn create_form_fields(
    store: &dyn CatalogStore,
    cache: &dyn Cache,
    category_name: &str,
    fields: Vec<FormField>,
) -> Result<FormFields> {
    let category = store
        .category_by_name(category_name)
        .await?
        .ok_or_else(|| CatalogError::NotFound("Category not found".to_string()))?;
    let doc = store
        .insert_form_fields(FormFields::create(&category.id, &category.category, fields))
        .await?;
    let view = FormFieldsView {
        category: doc.category.clone(),
        fields: doc.fields.clone(),
    };
    cache
        .set(&keys::form_field(&doc.category), &encode(&view)?)
        .await?;
    Ok(doc)
}

pub async fn get_form_fields(
    store: &dyn CatalogStore,
    cache: &dyn Cache,
    category: &str,
) -> Result<FormFieldsView> {
    let key = keys::form_field(category);
    if let Some(cached) = cache.get(&key).await? {
        CACHE_LOOKUPS_TOTAL
            .with_label_values(&["formField", "hit"])
            .inc();
        return decode(&cached);
    }
    CACHE_LOOKUPS_TOTAL
        .with_label_values(&["formField", "miss"])
        .inc();

    let docs = store.form_fields_by_category(category).await?;
    if docs.is_empty() {
        return Err(CatalogError::NotFound("Form fields not found.".to_string()));
    }
    let mut fields = Vec::new();
    for doc in &docs {
        for field in &doc.fields {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
    }
    let view = FormFieldsView {
        category: category.to_string(),
        fields,
    };
    cache.set(&key, &encode(&view)?).await?;
    Ok(view)
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| CatalogError::Internal(e.to_string()))
}

fn decode<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| CatalogError::Internal(e.to_string()))
}

fn sort_values(values: &mut [JsonValue]) {
    values.sort_by(|a, b| match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    });
}

// Storage capacities above 1000 collapse into the coarse unit
// (appendixName[1]); a " " fine unit leaves the raw value undecorated.
fn decorate(request: &FilterRequest, value: &JsonValue) -> JsonValue {
    let fine = request
        .appendix_name
        .first()
        .map(String::as_str)
        .unwrap_or(" ");
    if request.filter_name == "internalStorage" {
        if let Some(n) = value.as_f64() {
            if n > 1000.0 {
                let coarse = request
                    .appendix_name
                    .get(1)
                    .map(String::as_str)
                    .unwrap_or(" ");
                return JsonValue::String(format!("{} {}", (n / 1000.0).floor() as i64, coarse));
            }
        }
        return JsonValue::String(format!("{} {}", display(value), fine));
    }
    if fine == " " {
        return value.clone();
    }
    JsonValue::String(format!("{} {}", display(value), fine))
}

fn display(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other
            .as_i64()
            .map(|i| i.to_string())
            .unwrap_or_else(|| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::mem::InMemoryCache;

    fn request(name: &str, beautiful: &str, appendix: &[&str]) -> FilterRequest {
        FilterRequest {
            filter_name: name.to_string(),
            beautiful_filter_name: beautiful.to_string(),
            appendix_name: appendix.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn boolean_facets_are_fixed_regardless_of_data() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let doc = create_filter(
            &store,
            &cache,
            "mobile phone",
            &[request("freeCargo", "free cargo", &[" "])],
        )
        .await
        .unwrap();
        let descriptor = &doc.filters[0];
        assert_eq!(descriptor.filter_values, vec![json!(true), json!(false)]);
        assert_eq!(
            descriptor.beautiful_filter_values,
            vec![json!("There are"), json!("there aren’t")]
        );
    }

    #[tokio::test]
    async fn storage_facets_sort_and_collapse_units() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let doc = create_filter(
            &store,
            &cache,
            "mobile phone",
            &[request("internalStorage", "storage", &["gb", "tb"])],
        )
        .await
        .unwrap();
        let descriptor = &doc.filters[0];
        assert_eq!(
            descriptor.filter_values,
            vec![json!(128), json!(256), json!(1024)]
        );
        assert_eq!(
            descriptor.beautiful_filter_values,
            vec![json!("128 gb"), json!("256 gb"), json!("1 tb")]
        );
    }

    #[tokio::test]
    async fn blank_appendix_keeps_raw_values() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let doc = create_filter(
            &store,
            &cache,
            "mobile phone",
            &[request("color", "color", &[" "])],
        )
        .await
        .unwrap();
        let descriptor = &doc.filters[0];
        assert_eq!(
            descriptor.filter_values,
            vec![json!("black"), json!("red"), json!("space gray")]
        );
        assert_eq!(descriptor.beautiful_filter_values, descriptor.filter_values);
    }

    #[tokio::test]
    async fn unknown_attributes_are_skipped() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let doc = create_filter(
            &store,
            &cache,
            "mobile phone",
            &[
                request("warpDrive", "warp drive", &[" "]),
                request("ram", "memory", &["gb"]),
            ],
        )
        .await
        .unwrap();
        assert_eq!(doc.filters.len(), 1);
        assert_eq!(doc.filters[0].filter_name, "ram");
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let err = create_filter(&store, &cache, "bicycles", &[])
            .await
            .unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn get_filter_round_trips_through_cache_and_store() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let doc = create_filter(
            &store,
            &cache,
            "mobile phone",
            &[
                request("ram", "memory", &["gb"]),
                request("nfc", "nfc", &[" "]),
            ],
        )
        .await
        .unwrap();

        // first read is served by the mirror written at creation
        let cached = get_filter(&store, &cache, "mobile-phone").await.unwrap();
        assert_eq!(cached.filters, doc.filters);

        // evict, then read again: rebuilt from the persisted documents
        cache.del(&keys::filter("mobile-phone")).await.unwrap();
        let rebuilt = get_filter(&store, &cache, "mobile-phone").await.unwrap();
        assert_eq!(rebuilt.filters, doc.filters);
        assert!(cache
            .get(&keys::filter("mobile-phone"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn get_filter_for_unknown_category_is_not_found() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let err = get_filter(&store, &cache, "bicycles").await.unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn form_fields_round_trip_cache_first() {
        let store = fixtures::seeded_catalog().await;
        let cache = InMemoryCache::new();
        let fields = vec![FormField {
            r#type: "text".to_string(),
            id: "name".to_string(),
            label: "Product name".to_string(),
        }];
        create_form_fields(&store, &cache, "mobile phone", fields.clone())
            .await
            .unwrap();

        let view = get_form_fields(&store, &cache, "mobile phone").await.unwrap();
        assert_eq!(view.fields, fields);

        cache.del(&keys::form_field("mobile phone")).await.unwrap();
        let rebuilt = get_form_fields(&store, &cache, "mobile phone").await.unwrap();
        assert_eq!(rebuilt.fields, fields);

        let err = get_form_fields(&store, &cache, "bicycles").await.unwrap_err();
        assert_eq!(err.status(), 404);
    }
}
