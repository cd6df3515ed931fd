use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

pub static OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("storefront_ops_total", "API operations by op", &["op"]).unwrap()
});

pub static PRODUCT_QUERY_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "product_query_seconds",
        "Listing pipeline latency",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .unwrap()
});
