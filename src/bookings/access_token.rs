// Access token generation for link-based booking access
//
// The token is the sole credential for unauthenticated booking
// self-service: anyone holding the string can view, cancel, or request a
// refund for that one booking. Tokens are meant to be shared privately
// (e.g. in a confirmation email) and rely on being unguessable; there is
// no expiry or revocation.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::bookings::error::BookingError;
use crate::bookings::repository::BookingsRepository;

/// Length of generated access tokens. 26 alphanumeric characters give far
/// more entropy than collisions could plausibly exhaust; the store's
/// uniqueness check is the actual safety net.
pub const ACCESS_TOKEN_LENGTH: usize = 26;

/// Number of generation attempts before giving up. Exhausting these would
/// mean the random source is broken, not that the token space is full.
const MAX_GENERATION_ATTEMPTS: usize = 8;

/// Generate a single random access token candidate
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCESS_TOKEN_LENGTH)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}

/// Mint an access token that is unique across all existing bookings
///
/// Retries on collision rather than assuming the generator never repeats.
pub async fn mint_unique_token(repo: &BookingsRepository) -> Result<String, BookingError> {
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let candidate = generate_token();
        if !repo.token_exists(&candidate).await {
            return Ok(candidate);
        }
        tracing::warn!("Access token collision, regenerating");
    }
    Err(BookingError::DuplicateKey(
        "Could not generate a unique access token".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_length_and_charset() {
        let token = generate_token();
        assert_eq!(token.len(), ACCESS_TOKEN_LENGTH);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_tokens_are_distinct_in_practice() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[tokio::test]
    async fn test_mint_unique_token_against_empty_store() {
        let repo = BookingsRepository::new();
        let token = mint_unique_token(&repo).await.unwrap();
        assert_eq!(token.len(), ACCESS_TOKEN_LENGTH);
    }
}
