use std::time::{SystemTime, UNIX_EPOCH};

pub fn get_md5(s: &str) -> String {
    let digest = md5::compute(s);
    format!("{:x}", digest)
}

/// Short opaque identifier for records synthesized without a backend id
pub fn short_id(seed: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    get_md5(&format!("{seed}:{nanos}"))[..9].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_has_fixed_length() {
        assert_eq!(short_id("https://example.com").len(), 9);
    }

    #[test]
    fn short_id_varies_between_calls() {
        assert_ne!(short_id("same"), short_id("same"));
    }
}
