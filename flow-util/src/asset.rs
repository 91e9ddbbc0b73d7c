use elements::AssetId;
use std::str::FromStr;

pub const BLINDING_FACTOR_LEN: usize = 32;

pub fn parse_asset_id(s: &str) -> Result<AssetId, String> {
    AssetId::from_str(s).map_err(|e| format!("Invalid asset id {}: {}", s, e))
}

// Blinding factors are kept as hex of their raw 32 bytes
pub fn parse_blinding_factor(s: &str) -> Result<[u8; BLINDING_FACTOR_LEN], String> {
    let bytes = hex::decode(s).map_err(|e| format!("Invalid blinding factor {}: {}", s, e))?;
    bytes.as_slice().try_into().map_err(|_| {
        format!(
            "Invalid blinding factor length {}, expected {} bytes",
            bytes.len(),
            BLINDING_FACTOR_LEN
        )
    })
}

// Reverse the byte order of a hex string, used for the explorer's display order
pub fn reverse_hex(s: &str) -> Result<String, String> {
    let mut bytes = hex::decode(s).map_err(|e| format!("Invalid hex string {}: {}", s, e))?;
    bytes.reverse();
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_hex() {
        assert_eq!(reverse_hex("0102ff").unwrap(), "ff0201");
        assert_eq!(reverse_hex("").unwrap(), "");
        assert!(reverse_hex("zz").is_err());
    }

    #[test]
    fn test_parse_blinding_factor() {
        let bf = parse_blinding_factor(&"11".repeat(32)).unwrap();
        assert_eq!(bf, [0x11u8; 32]);

        assert!(parse_blinding_factor(&"11".repeat(31)).is_err());
        assert!(parse_blinding_factor("not hex").is_err());
    }

    #[test]
    fn test_parse_asset_id_display_order() {
        let hex = "aa".repeat(31) + "bb";
        let asset = parse_asset_id(&hex).unwrap();
        assert_eq!(asset.to_string(), hex);
    }
}
