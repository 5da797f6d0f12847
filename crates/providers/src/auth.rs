use hmac::{Hmac, Mac};
use sha2::Sha256;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

/// Creates an HMAC-SHA256 signature for an authenticated quote request.
///
/// The exchange expects the signature to cover `{timestamp_ms}{METHOD}{path}`
/// (query parameters excluded), carried in the `*-ACCESS-SIGNATURE` header
/// alongside the key id and timestamp.
///
/// # Arguments
///
/// * `secret` - The account's API secret key.
/// * `message` - The concatenated timestamp, uppercased method and path.
///
/// # Returns
///
/// A hexadecimal string representation of the signature.
pub fn sign_request(secret: &str, message: &str) -> String {
    // Create a new HMAC-SHA256 instance with the secret key.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");

    mac.update(message.as_bytes());

    let result = mac.finalize();
    let code_bytes = result.into_bytes();

    // The API expects the signature hex-encoded.
    hex::encode(code_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic_hex() {
        let first = sign_request("secret", "1700000000000GET/trade-api/v2/markets");
        let second = sign_request("secret", "1700000000000GET/trade-api/v2/markets");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_secret_and_message() {
        let base = sign_request("secret", "message");
        assert_ne!(base, sign_request("other", "message"));
        assert_ne!(base, sign_request("secret", "other"));
    }
}
