use rand::Rng;

/// URL-safe slug: lowercased alphanumerics joined by single dashes.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Digit-alphabet notice id, `len` characters.
pub fn notice_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_collapse_separators() {
        assert_eq!(slugify("Apple iPhone 14-ni-123 "), "apple-iphone-14-ni-123");
        assert_eq!(slugify("  Space   Gray "), "space-gray");
        assert_eq!(slugify("mobile phone"), "mobile-phone");
    }

    #[test]
    fn notice_ids_are_digits() {
        let id = notice_id(10);
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }
}
