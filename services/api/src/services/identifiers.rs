//! Album number and share token generation

use rand::{Rng, distributions::Alphanumeric};

use crate::config::TokenStrategy;

const RANDOM_TOKEN_LEN: usize = 32;

/// `ALB` followed by the counter value padded to six digits
pub fn format_album_number(counter: i64) -> String {
    format!("ALB{:06}", counter)
}

/// Share token for a new album
///
/// The sequential form is guessable from the album number, creation time and
/// owner id; `Random` draws from `rng` instead.
pub fn share_token<R: Rng + ?Sized>(
    strategy: TokenStrategy,
    album_no: &str,
    created_at_millis: i64,
    owner_id: i64,
    rng: &mut R,
) -> String {
    match strategy {
        TokenStrategy::Sequential => format!("{}{}{}", album_no, created_at_millis, owner_id),
        TokenStrategy::Random => rng
            .sample_iter(&Alphanumeric)
            .take(RANDOM_TOKEN_LEN)
            .map(char::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_album_number_padding() {
        assert_eq!(format_album_number(1), "ALB000001");
        assert_eq!(format_album_number(123456), "ALB123456");
        assert_eq!(format_album_number(1234567), "ALB1234567");
    }

    #[test]
    fn test_sequential_token_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        let token = share_token(
            TokenStrategy::Sequential,
            "ALB000042",
            1736499600000,
            7,
            &mut rng,
        );
        assert_eq!(token, "ALB00004217364996000007");
    }

    #[test]
    fn test_random_tokens() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = share_token(TokenStrategy::Random, "ALB000001", 0, 7, &mut rng);
        let second = share_token(TokenStrategy::Random, "ALB000001", 0, 7, &mut rng);

        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
        assert!(!first.contains("ALB000001"));
    }
}
