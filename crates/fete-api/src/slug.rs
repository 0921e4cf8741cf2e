use chrono::Utc;
use rand::Rng;

/// Shareable public identifier: the person's name lowercased and hyphenated,
/// plus the current millisecond timestamp in base 36. Collisions are only
/// possible for identical names in the same millisecond; the insert path
/// retries those with [`generate_salted`].
pub fn generate(name: &str) -> String {
    format!(
        "{}-{}",
        slugify(name),
        base36(Utc::now().timestamp_millis() as u64)
    )
}

/// Like [`generate`], with four extra random base-36 characters.
pub fn generate_salted(name: &str) -> String {
    let salt = rand::rng().random_range(0..36u32.pow(4)) as u64;
    format!("{}-{}", generate(name), base36(salt))
}

fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            out.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("celebration");
    }
    out
}

fn base36(mut n: u64) -> String {
    const DIGITS: [char; 36] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
        'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    ];

    if n == 0 {
        return "0".to_string();
    }

    let mut out = String::new();
    while n > 0 {
        out.insert(0, DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out
}
