//! Cache key builders, one per cached concern.

/// Per-user hashes (address book and friends) expire after ten days;
/// category-scoped entries live until an explicit recompute.
pub const USER_HASH_TTL_SECS: u64 = 10 * 24 * 60 * 60;

pub fn cart(user_id: &str) -> String {
    format!("cart#{user_id}")
}

pub fn favorite(user_id: &str) -> String {
    format!("favorite#{user_id}")
}

pub fn address(user_id: &str) -> String {
    format!("address#{user_id}")
}

pub fn filter(category: &str) -> String {
    format!("filter#{category}")
}

pub fn form_field(category: &str) -> String {
    format!("formField#{category}")
}
