//! Short code generation and collision handling.

use crate::application::rate_limiter::BUCKET_PREFIX;
use crate::application::shortener::VISIT_COUNTER_KEY;
use crate::domain::store::{KeyValueStore, StoreError};
use base64::Engine as _;
use std::sync::Arc;
use tracing::warn;

/// Random bytes drawn per candidate; base64url yields a 6-character code.
const CODE_LENGTH_BYTES: usize = 4;

/// How many fresh random candidates are tried before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 3;

/// Keys a caller-supplied alias may never shadow.
///
/// `counter` is the global visit counter; `health` and `api` would make the
/// service's own routes unreachable.
const RESERVED_CODES: &[&str] = &[VISIT_COUNTER_KEY, "health", "api"];

/// Errors that can occur while producing a short code.
#[derive(Debug, thiserror::Error)]
pub enum CodeGenError {
    /// The candidate already maps to a URL. Terminal for aliases.
    #[error("short code already in use")]
    Collision,

    /// The alias would collide with the store's reserved namespace.
    #[error("short code '{0}' is reserved")]
    Reserved(String),

    /// The OS entropy source failed. Retryable by the caller.
    #[error("could not generate id")]
    Entropy,

    /// Every random candidate collided.
    #[error("could not generate a unique id")]
    Exhausted,

    /// The collision check could not reach the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Produces short codes, resolving collisions against the store.
pub struct CodeGenerator {
    store: Arc<dyn KeyValueStore>,
}

impl CodeGenerator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the code to persist a new link under.
    ///
    /// A trimmed, non-empty `requested` alias is used verbatim; it only has
    /// to stay out of the store's reserved namespace. Without an alias, a
    /// random candidate is drawn from the OS entropy source and re-drawn a
    /// bounded number of times on collision. An alias collision is never
    /// retried: the existing mapping stays untouched and the caller must
    /// pick a different alias.
    pub async fn generate(&self, requested: Option<&str>) -> Result<String, CodeGenError> {
        if let Some(alias) = requested.map(str::trim).filter(|a| !a.is_empty()) {
            ensure_not_reserved(alias)?;
            return match self.store.get(alias).await? {
                Some(_) => Err(CodeGenError::Collision),
                None => Ok(alias.to_string()),
            };
        }

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = random_code()?;
            match self.store.get(&candidate).await? {
                None => return Ok(candidate),
                Some(_) => warn!(attempt, code = %candidate, "random code collision, retrying"),
            }
        }

        Err(CodeGenError::Exhausted)
    }
}

/// Draws a random URL-safe code.
///
/// Four bytes from the OS entropy source, encoded as URL-safe base64
/// without padding, give a 6-character code.
fn random_code() -> Result<String, CodeGenError> {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|_| CodeGenError::Entropy)?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Rejects aliases that would shadow a reserved key or a rate bucket.
///
/// Random codes cannot hit either: base64url never produces `:`, and the
/// reserved names are longer than a generated code.
fn ensure_not_reserved(alias: &str) -> Result<(), CodeGenError> {
    if RESERVED_CODES.contains(&alias) || alias.starts_with(BUCKET_PREFIX) {
        return Err(CodeGenError::Reserved(alias.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_store::MemoryStore;
    use std::collections::HashSet;
    use std::time::Duration;

    fn generator() -> (CodeGenerator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (CodeGenerator::new(store.clone()), store)
    }

    #[test]
    fn test_random_code_has_expected_length() {
        let code = random_code().unwrap();
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn test_random_code_url_safe_characters() {
        for _ in 0..100 {
            let code = random_code().unwrap();
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unexpected character in {}",
                code
            );
        }
    }

    #[test]
    fn test_random_code_no_padding() {
        let code = random_code().unwrap();
        assert!(!code.contains('='));
    }

    #[test]
    fn test_random_codes_are_distinct() {
        let mut codes = HashSet::new();
        for _ in 0..1000 {
            codes.insert(random_code().unwrap());
        }
        // 2^32 candidates make a birthday collision across 1000 draws
        // wildly unlikely.
        assert!(codes.len() > 990);
    }

    #[tokio::test]
    async fn test_generate_without_alias() {
        let (generator, _store) = generator();
        let code = generator.generate(None).await.unwrap();
        assert_eq!(code.len(), 6);
    }

    #[tokio::test]
    async fn test_alias_is_used_verbatim_after_trimming() {
        let (generator, _store) = generator();
        let code = generator.generate(Some("  my-alias  ")).await.unwrap();
        assert_eq!(code, "my-alias");
    }

    #[tokio::test]
    async fn test_blank_alias_falls_back_to_random() {
        let (generator, _store) = generator();
        let code = generator.generate(Some("   ")).await.unwrap();
        assert_eq!(code.len(), 6);
    }

    #[tokio::test]
    async fn test_alias_collision_is_terminal() {
        let (generator, store) = generator();
        store
            .set("taken", "https://example.com/", Duration::from_secs(60))
            .await
            .unwrap();

        let result = generator.generate(Some("taken")).await;
        assert!(matches!(result, Err(CodeGenError::Collision)));

        // The existing mapping is untouched.
        assert_eq!(
            store.get("taken").await.unwrap().as_deref(),
            Some("https://example.com/")
        );
    }

    #[tokio::test]
    async fn test_reserved_aliases_are_rejected() {
        let (generator, _store) = generator();

        for alias in ["counter", "health", "api", "rl:10.0.0.1"] {
            let result = generator.generate(Some(alias)).await;
            assert!(
                matches!(result, Err(CodeGenError::Reserved(_))),
                "alias '{}' should be reserved",
                alias
            );
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_during_collision_check() {
        let (generator, store) = generator();
        store.fail_all(true);

        let result = generator.generate(Some("alias")).await;
        assert!(matches!(result, Err(CodeGenError::Store(_))));
    }
}
