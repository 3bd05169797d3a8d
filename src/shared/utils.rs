//! Utility functions and helpers

use solana_sdk::pubkey::Pubkey;

/// Shorten an address for log lines: `BLkBSE96...JphKxYnv`
pub fn short_address(address: &Pubkey) -> String {
    let full = address.to_string();
    if full.len() <= 16 {
        return full;
    }
    format!("{}...{}", &full[..8], &full[full.len() - 8..])
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Deduplicate keys keeping first-seen order
pub fn dedupe_in_order<I>(keys: I) -> Vec<Pubkey>
where
    I: IntoIterator<Item = Pubkey>,
{
    let mut seen = std::collections::HashSet::new();
    keys.into_iter().filter(|key| seen.insert(*key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address() {
        let key = Pubkey::new_from_array([7u8; 32]);
        let full = key.to_string();
        let short = short_address(&key);
        assert!(short.starts_with(&full[..8]));
        assert!(short.ends_with(&full[full.len() - 8..]));
        assert_eq!(short.len(), 19);
    }

    #[test]
    fn test_dedupe_in_order() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert_eq!(dedupe_in_order(vec![b, a, b, a]), vec![b, a]);
    }
}
