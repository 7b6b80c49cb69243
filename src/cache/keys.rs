//! Cache Keys Module
//!
//! Cache key derivation.
//!
//! Keys here are the logical part; `KeyedResponseCache` prepends its
//! namespace, giving `image_cache_<hash(url)>`, `receipts_cache_<email>` and
//! `shopping_lists_cache_<familyId>` in storage.

/// Compact, stable key for a URL.
///
/// 32-bit rolling hash (`h = h * 31 + unit` over UTF-16 code units, wrapping)
/// rendered as signed base 36. Keys written by earlier clients of the same
/// store hash identically.
pub fn hash_url(url: &str) -> String {
    let hash = url
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
    to_base36(i64::from(hash))
}

/// First receipt page of a user.
pub fn receipts_key(email: &str) -> String {
    email.to_string()
}

/// Continuation page of a user; shares the user's prefix so a per-user clear
/// removes it too.
pub fn receipts_page_key(email: &str, continuation_token: &str) -> String {
    format!("{}_{}", email, hash_url(continuation_token))
}

/// Shopping lists of a family.
pub fn shopping_lists_key(family_id: &str) -> String {
    family_id.to_string()
}

fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut n = value.unsigned_abs();
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if value < 0 {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
