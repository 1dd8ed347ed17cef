//! Mapping creation and resolution.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::application::services::hit_counter::{HitCounter, HitLimitPolicy};
use crate::domain::access::{AccessDecision, decide};
use crate::domain::entities::{NewRecord, Record};
use crate::domain::repositories::{MappingStore, StoreError};
use crate::domain::verification::BotVerifier;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CachedMapping, NullCache};
use crate::infrastructure::verification::DisabledVerifier;
use crate::utils::short_url::PublicSite;
use crate::utils::token_generator::{TokenSource, is_reserved};
use crate::utils::url_validator::validate_target_url;

/// Default bound on candidate tokens tried per create.
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 10;

/// Tunables for [`MappingResolver`].
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub site: PublicSite,
    pub max_generation_attempts: usize,
    pub hit_limit_policy: HitLimitPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            site: PublicSite::new("http", "localhost", 3000),
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
            hit_limit_policy: HitLimitPolicy::Ignore,
        }
    }
}

/// A create request.
#[derive(Debug, Clone, Default)]
pub struct CreateMapping {
    pub url: String,
    /// `None` and `Some("")` both mean public.
    pub password: Option<String>,
    /// 0 means unlimited.
    pub max_hit_count: i64,
    /// Bot verification token from the client.
    pub verification_token: Option<String>,
}

impl CreateMapping {
    pub fn public(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    fn is_dedup_eligible(&self) -> bool {
        self.password().is_empty() && self.max_hit_count == 0
    }
}

/// Result of a create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMapping {
    /// Destination URL, exactly as submitted.
    pub url: String,
    /// Fully qualified short URL.
    pub mapping: String,
    /// Bare token.
    pub token: String,
    /// False when an existing public mapping was reused.
    pub created: bool,
}

/// Result of a resolve that found the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Granted {
        url: String,
        protected: bool,
        /// Count after this hit; `None` if recording the hit failed.
        hit_count: Option<i64>,
    },
    /// Protected mapping and no credential supplied.
    NeedCredential,
    /// Protected mapping and the credential does not match.
    Denied,
    /// At `max_hit_count` under [`HitLimitPolicy::Reject`]; the hit is not counted.
    LimitReached,
}

impl Resolution {
    fn label(&self) -> &'static str {
        match self {
            Self::Granted { .. } => "granted",
            Self::NeedCredential => "need_credential",
            Self::Denied => "denied",
            Self::LimitReached => "limit_reached",
        }
    }
}

/// Orchestrates token allocation, URL dedup, access checks and hit counting.
///
/// Store failures propagate immediately; only token collisions are retried, up to
/// `max_generation_attempts` candidates per create. Cache failures never fail a
/// request.
pub struct MappingResolver {
    store: Arc<dyn MappingStore>,
    tokens: Arc<dyn TokenSource>,
    cache: Arc<dyn CacheService>,
    verifier: Arc<dyn BotVerifier>,
    hits: HitCounter,
    settings: ResolverSettings,
}

impl MappingResolver {
    /// Creates a resolver with caching and bot verification disabled.
    pub fn new(
        store: Arc<dyn MappingStore>,
        tokens: Arc<dyn TokenSource>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            hits: HitCounter::new(store.clone(), settings.hit_limit_policy),
            store,
            tokens,
            cache: Arc::new(NullCache::new()),
            verifier: Arc::new(DisabledVerifier),
            settings,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheService>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn BotVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn site(&self) -> &PublicSite {
        &self.settings.site
    }

    /// Creates a mapping, or reuses an existing public one for the same URL.
    ///
    /// Dedup applies only when the request has no password and no hit limit, and
    /// only against a public, unlimited record.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] - `url` is not an absolute URI with a host
    /// - [`AppError::Validation`] - negative `max_hit_count`
    /// - [`AppError::VerificationFailed`] - the bot verifier rejected the request
    /// - [`AppError::GenerationExhausted`] - no free token within the attempt bound
    /// - [`AppError::StoreUnavailable`] - the store failed
    pub async fn create_mapping(&self, request: CreateMapping) -> Result<CreatedMapping, AppError> {
        validate_target_url(&request.url)?;

        if request.max_hit_count < 0 {
            return Err(AppError::bad_request(
                "max_hit_count must not be negative",
                json!({ "field": "max_hit_count", "value": request.max_hit_count }),
            ));
        }

        if self.verifier.is_enabled() {
            self.verifier
                .verify(request.verification_token.as_deref().unwrap_or_default())
                .await?;
        }

        if request.is_dedup_eligible()
            && let Some(existing) = self.store.find_by_url(&request.url).await?
            && existing.is_public()
        {
            debug!(token = %existing.mapping, "Reusing existing public mapping");
            metrics::counter!("mappings_deduped_total").increment(1);
            return Ok(self.created(request.url, existing.mapping, false));
        }

        let token = self.allocate(&request).await?;
        metrics::counter!("mappings_created_total").increment(1);

        Ok(self.created(request.url, token, true))
    }

    async fn allocate(&self, request: &CreateMapping) -> Result<String, AppError> {
        let attempts = self.settings.max_generation_attempts;

        for attempt in 1..=attempts {
            let candidate = self.tokens.generate();

            if is_reserved(&candidate) {
                debug!(attempt, candidate = %candidate, "Skipping reserved token");
                continue;
            }

            if self.store.find_by_mapping(&candidate).await?.is_some() {
                debug!(attempt, candidate = %candidate, "Token collision");
                continue;
            }

            let new_record = NewRecord {
                url: request.url.clone(),
                mapping: candidate.clone(),
                password: request.password().to_string(),
                max_hit_count: request.max_hit_count,
            };

            match self.store.insert(new_record).await {
                Ok(_) => return Ok(candidate),
                Err(StoreError::Conflict(_)) => {
                    debug!(attempt, candidate = %candidate, "Lost insert race");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts, "Token generation exhausted");
        Err(AppError::generation_exhausted(
            "Could not allocate a unique token",
            json!({ "attempts": attempts }),
        ))
    }

    fn created(&self, url: String, token: String, created: bool) -> CreatedMapping {
        CreatedMapping {
            url,
            mapping: self.settings.site.short_url(&token),
            token,
            created,
        }
    }

    /// Resolves a token, checking the credential and recording the hit.
    ///
    /// `credential` is compared byte for byte against the stored password, so a
    /// value that is not valid UTF-8 is simply a wrong key. `NeedCredential` and
    /// `Denied` never carry the URL. A failed hit increment is logged and does not
    /// block the resolution.
    ///
    /// # Errors
    ///
    /// - [`AppError::UnknownMapping`] - no record for `token`
    /// - [`AppError::StoreUnavailable`] - the lookup failed
    pub async fn resolve_mapping(
        &self,
        token: &str,
        credential: Option<&[u8]>,
    ) -> Result<Resolution, AppError> {
        let mapping = self.lookup(token).await?;
        let supplied = credential.filter(|c| !c.is_empty());

        // The cache never holds passwords; read it only when there is something to
        // compare against.
        let password = match supplied {
            Some(_) if mapping.protected => self.stored_password(token).await?,
            _ => String::new(),
        };

        let resolution = match decide(mapping.protected, &password, supplied) {
            AccessDecision::NeedCredential => Resolution::NeedCredential,
            AccessDecision::Denied => Resolution::Denied,
            AccessDecision::Granted => self.grant(token, mapping).await?,
        };

        metrics::counter!("mapping_resolutions_total", "outcome" => resolution.label())
            .increment(1);

        Ok(resolution)
    }

    async fn lookup(&self, token: &str) -> Result<CachedMapping, AppError> {
        match self.cache.get_mapping(token).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => warn!(token, error = %e, "Cache lookup failed"),
        }

        let record = self
            .store
            .find_by_mapping(token)
            .await?
            .ok_or_else(|| unknown(token))?;

        let entry = CachedMapping::from(&record);
        if let Err(e) = self.cache.set_mapping(token, &entry, None).await {
            warn!(token, error = %e, "Cache write failed");
        }

        Ok(entry)
    }

    async fn stored_password(&self, token: &str) -> Result<String, AppError> {
        match self.store.find_by_mapping(token).await? {
            Some(record) => Ok(record.password),
            None => {
                self.invalidate(token).await;
                Err(unknown(token))
            }
        }
    }

    async fn grant(&self, token: &str, mapping: CachedMapping) -> Result<Resolution, AppError> {
        let hit_count = match self.hits.record_hit(token).await {
            Ok(Some(outcome)) if outcome.refused() => return Ok(Resolution::LimitReached),
            Ok(Some(outcome)) => Some(outcome.hit_count),
            Ok(None) => {
                self.invalidate(token).await;
                return Err(unknown(token));
            }
            Err(e) => {
                error!(token, error = %e, "Failed to record hit");
                None
            }
        };

        Ok(Resolution::Granted {
            url: mapping.url,
            protected: mapping.protected,
            hit_count,
        })
    }

    /// Returns the full record for `token`.
    ///
    /// # Errors
    ///
    /// [`AppError::UnknownMapping`] if it does not exist.
    pub async fn inspect_mapping(&self, token: &str) -> Result<Record, AppError> {
        self.store
            .find_by_mapping(token)
            .await?
            .ok_or_else(|| unknown(token))
    }

    /// Deletes a mapping and drops it from the cache.
    ///
    /// # Errors
    ///
    /// [`AppError::UnknownMapping`] if it does not exist.
    pub async fn delete_mapping(&self, token: &str) -> Result<(), AppError> {
        if !self.store.delete(token).await? {
            return Err(unknown(token));
        }

        self.invalidate(token).await;
        Ok(())
    }

    async fn invalidate(&self, token: &str) {
        if let Err(e) = self.cache.invalidate(token).await {
            warn!(token, error = %e, "Cache invalidation failed");
        }
    }
}

fn unknown(token: &str) -> AppError {
    AppError::unknown_mapping("Mapping not found", json!({ "mapping": token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{BoundedIncrement, MockMappingStore};
    use crate::utils::token_generator::MockTokenSource;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::sync::Mutex;

    fn record(mapping: &str, url: &str, password: &str, hit_count: i64, max: i64) -> Record {
        Record {
            id: 7,
            url: url.to_string(),
            mapping: mapping.to_string(),
            password: password.to_string(),
            hit_count,
            max_hit_count: max,
            created_at: Utc::now(),
        }
    }

    fn tokens(values: &[&'static str]) -> MockTokenSource {
        let mut source = MockTokenSource::new();
        let mut seq = Sequence::new();
        for &value in values {
            source
                .expect_generate()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || value.to_string());
        }
        source
    }

    fn resolver(store: MockMappingStore, source: MockTokenSource) -> MappingResolver {
        MappingResolver::new(Arc::new(store), Arc::new(source), ResolverSettings::default())
    }

    fn resolver_with(
        store: MockMappingStore,
        source: MockTokenSource,
        settings: ResolverSettings,
    ) -> MappingResolver {
        MappingResolver::new(Arc::new(store), Arc::new(source), settings)
    }

    struct RejectingVerifier;

    #[async_trait]
    impl BotVerifier for RejectingVerifier {
        async fn verify(&self, _token: &str) -> Result<(), AppError> {
            Err(AppError::verification_failed("rejected", json!({})))
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct RecordingCache {
        invalidated: Mutex<Vec<String>>,
        entries: Mutex<Vec<(String, CachedMapping)>>,
    }

    #[async_trait]
    impl CacheService for RecordingCache {
        async fn get_mapping(
            &self,
            token: &str,
        ) -> crate::infrastructure::cache::CacheResult<Option<CachedMapping>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|(t, _)| t == token)
                .map(|(_, m)| m.clone()))
        }

        async fn set_mapping(
            &self,
            token: &str,
            mapping: &CachedMapping,
            _ttl_seconds: Option<u64>,
        ) -> crate::infrastructure::cache::CacheResult<()> {
            self.entries
                .lock()
                .unwrap()
                .push((token.to_string(), mapping.clone()));
            Ok(())
        }

        async fn invalidate(&self, token: &str) -> crate::infrastructure::cache::CacheResult<()> {
            self.invalidated.lock().unwrap().push(token.to_string());
            self.entries.lock().unwrap().retain(|(t, _)| t != token);
            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_create_new_public_mapping() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().returning(|_| Ok(None));
        store
            .expect_find_by_mapping()
            .with(eq("abc1234"))
            .returning(|_| Ok(None));
        store
            .expect_insert()
            .withf(|r| r.mapping == "abc1234" && r.password.is_empty() && r.max_hit_count == 0)
            .times(1)
            .returning(|_| Ok(1));

        let created = resolver(store, tokens(&["abc1234"]))
            .create_mapping(CreateMapping::public("https://example.org/page"))
            .await
            .unwrap();

        assert!(created.created);
        assert_eq!(created.token, "abc1234");
        assert_eq!(created.mapping, "http://localhost:3000/abc1234");
        assert_eq!(created.url, "https://example.org/page");
    }

    #[tokio::test]
    async fn test_create_dedups_public_request() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_url()
            .with(eq("https://example.org/page"))
            .returning(|url| Ok(Some(record("abc123", url, "", 4, 0))));
        store.expect_insert().never();

        let source = MockTokenSource::new();
        let created = resolver(store, source)
            .create_mapping(CreateMapping::public("https://example.org/page"))
            .await
            .unwrap();

        assert!(!created.created);
        assert_eq!(created.token, "abc123");
    }

    #[tokio::test]
    async fn test_create_does_not_dedup_against_protected_record() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_url()
            .returning(|url| Ok(Some(record("locked1", url, "pw", 0, 0))));
        store.expect_find_by_mapping().returning(|_| Ok(None));
        store.expect_insert().times(1).returning(|_| Ok(2));

        let created = resolver(store, tokens(&["fresh01"]))
            .create_mapping(CreateMapping::public("https://example.org"))
            .await
            .unwrap();

        assert!(created.created);
        assert_eq!(created.token, "fresh01");
    }

    #[tokio::test]
    async fn test_create_protected_skips_dedup() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().never();
        store.expect_find_by_mapping().returning(|_| Ok(None));
        store
            .expect_insert()
            .withf(|r| r.password == "secret")
            .times(1)
            .returning(|_| Ok(3));

        let request = CreateMapping {
            url: "https://example.org".to_string(),
            password: Some("secret".to_string()),
            ..Default::default()
        };

        let created = resolver(store, tokens(&["prot001"]))
            .create_mapping(request)
            .await
            .unwrap();
        assert!(created.created);
    }

    #[tokio::test]
    async fn test_create_limited_skips_dedup() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().never();
        store.expect_find_by_mapping().returning(|_| Ok(None));
        store
            .expect_insert()
            .withf(|r| r.max_hit_count == 5)
            .times(1)
            .returning(|_| Ok(3));

        let request = CreateMapping {
            url: "https://example.org".to_string(),
            max_hit_count: 5,
            ..Default::default()
        };

        assert!(
            resolver(store, tokens(&["lim0001"]))
                .create_mapping(request)
                .await
                .unwrap()
                .created
        );
    }

    #[tokio::test]
    async fn test_create_retries_on_existing_and_reserved_tokens() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().returning(|_| Ok(None));
        store
            .expect_find_by_mapping()
            .with(eq("taken01"))
            .returning(|m| Ok(Some(record(m, "https://other.example", "", 0, 0))));
        store
            .expect_find_by_mapping()
            .with(eq("free001"))
            .returning(|_| Ok(None));
        store
            .expect_insert()
            .withf(|r| r.mapping == "free001")
            .times(1)
            .returning(|_| Ok(9));

        let created = resolver(store, tokens(&["taken01", "health", "free001"]))
            .create_mapping(CreateMapping::public("https://example.org"))
            .await
            .unwrap();

        assert_eq!(created.token, "free001");
    }

    #[tokio::test]
    async fn test_create_retries_on_insert_conflict() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().returning(|_| Ok(None));
        store.expect_find_by_mapping().returning(|_| Ok(None));
        store
            .expect_insert()
            .withf(|r| r.mapping == "raced01")
            .times(1)
            .returning(|r| Err(StoreError::Conflict(r.mapping)));
        store
            .expect_insert()
            .withf(|r| r.mapping == "won0001")
            .times(1)
            .returning(|_| Ok(4));

        let created = resolver(store, tokens(&["raced01", "won0001"]))
            .create_mapping(CreateMapping::public("https://example.org"))
            .await
            .unwrap();

        assert_eq!(created.token, "won0001");
    }

    #[tokio::test]
    async fn test_create_exhausts_attempts() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().returning(|_| Ok(None));
        store
            .expect_find_by_mapping()
            .times(3)
            .returning(|m| Ok(Some(record(m, "https://x.example", "", 0, 0))));
        store.expect_insert().never();

        let mut source = MockTokenSource::new();
        source
            .expect_generate()
            .times(3)
            .returning(|| "same000".to_string());

        let settings = ResolverSettings {
            max_generation_attempts: 3,
            ..Default::default()
        };

        let err = resolver_with(store, source, settings)
            .create_mapping(CreateMapping::public("https://example.org"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationExhausted { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_url_before_store() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().never();
        store.expect_insert().never();

        let err = resolver(store, MockTokenSource::new())
            .create_mapping(CreateMapping::public("not a url"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_limit() {
        let request = CreateMapping {
            url: "https://example.org".to_string(),
            max_hit_count: -1,
            ..Default::default()
        };

        let err = resolver(MockMappingStore::new(), MockTokenSource::new())
            .create_mapping(request)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejected_by_verifier() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_url().never();

        let resolver = resolver(store, MockTokenSource::new())
            .with_verifier(Arc::new(RejectingVerifier));

        let err = resolver
            .create_mapping(CreateMapping::public("https://example.org"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::VerificationFailed { .. }));
    }

    #[tokio::test]
    async fn test_create_propagates_store_failure() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_url()
            .returning(|_| Err(StoreError::Unavailable("down".to_string())));

        let err = resolver(store, MockTokenSource::new())
            .create_mapping(CreateMapping::public("https://example.org"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_resolve_public_counts_hit() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .with(eq("abc123"))
            .returning(|m| Ok(Some(record(m, "https://example.org/page", "", 4, 0))));
        store
            .expect_increment_hit_count()
            .with(eq("abc123"))
            .times(1)
            .returning(|m| Ok(Some(record(m, "https://example.org/page", "", 5, 0))));

        let resolution = resolver(store, MockTokenSource::new())
            .resolve_mapping("abc123", None)
            .await
            .unwrap();

        assert_eq!(
            resolution,
            Resolution::Granted {
                url: "https://example.org/page".to_string(),
                protected: false,
                hit_count: Some(5),
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown() {
        let mut store = MockMappingStore::new();
        store.expect_find_by_mapping().returning(|_| Ok(None));
        store.expect_increment_hit_count().never();

        let err = resolver(store, MockTokenSource::new())
            .resolve_mapping("nope", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownMapping { .. }));
    }

    #[tokio::test]
    async fn test_resolve_protected_outcomes() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .returning(|m| Ok(Some(record(m, "https://secret.example", "pw", 0, 0))));
        store
            .expect_increment_hit_count()
            .times(1)
            .returning(|m| Ok(Some(record(m, "https://secret.example", "pw", 1, 0))));

        let resolver = resolver(store, MockTokenSource::new());

        assert_eq!(
            resolver.resolve_mapping("xyz", None).await.unwrap(),
            Resolution::NeedCredential
        );
        assert_eq!(
            resolver.resolve_mapping("xyz", Some("".as_bytes())).await.unwrap(),
            Resolution::NeedCredential
        );
        assert_eq!(
            resolver.resolve_mapping("xyz", Some("nope".as_bytes())).await.unwrap(),
            Resolution::Denied
        );
        assert_eq!(
            resolver.resolve_mapping("xyz", Some("pw".as_bytes())).await.unwrap(),
            Resolution::Granted {
                url: "https://secret.example".to_string(),
                protected: true,
                hit_count: Some(1),
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_survives_hit_failure() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 0, 0))));
        store
            .expect_increment_hit_count()
            .returning(|_| Err(StoreError::Unavailable("write failed".to_string())));

        let resolution = resolver(store, MockTokenSource::new())
            .resolve_mapping("abc", None)
            .await
            .unwrap();

        assert_eq!(
            resolution,
            Resolution::Granted {
                url: "https://example.org".to_string(),
                protected: false,
                hit_count: None,
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_ignore_policy_keeps_resolving_past_limit() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 2, 2))));
        store
            .expect_increment_hit_count()
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 3, 2))));

        let resolution = resolver(store, MockTokenSource::new())
            .resolve_mapping("abc", None)
            .await
            .unwrap();

        assert!(matches!(resolution, Resolution::Granted { hit_count: Some(3), .. }));
    }

    #[tokio::test]
    async fn test_resolve_reject_policy_at_limit() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 2, 2))));
        store.expect_increment_hit_count().never();
        store
            .expect_increment_hit_count_within_limit()
            .times(1)
            .returning(|m| {
                Ok(Some(BoundedIncrement::AtLimit(record(
                    m,
                    "https://example.org",
                    "",
                    2,
                    2,
                ))))
            });

        let settings = ResolverSettings {
            hit_limit_policy: HitLimitPolicy::Reject,
            ..Default::default()
        };

        let resolution = resolver_with(store, MockTokenSource::new(), settings)
            .resolve_mapping("abc", None)
            .await
            .unwrap();

        assert_eq!(resolution, Resolution::LimitReached);
    }

    #[tokio::test]
    async fn test_resolve_reject_policy_below_limit_counts() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 1, 2))));
        store
            .expect_increment_hit_count_within_limit()
            .times(1)
            .returning(|m| {
                Ok(Some(BoundedIncrement::Counted(record(
                    m,
                    "https://example.org",
                    "",
                    2,
                    2,
                ))))
            });

        let settings = ResolverSettings {
            hit_limit_policy: HitLimitPolicy::Reject,
            ..Default::default()
        };

        let resolution = resolver_with(store, MockTokenSource::new(), settings)
            .resolve_mapping("abc", None)
            .await
            .unwrap();

        assert!(matches!(resolution, Resolution::Granted { hit_count: Some(2), .. }));
    }

    #[tokio::test]
    async fn test_resolve_protected_reads_password_from_store_not_cache() {
        let mut store = MockMappingStore::new();
        // Once to fill the cache, once per supplied credential.
        store
            .expect_find_by_mapping()
            .times(3)
            .returning(|m| Ok(Some(record(m, "https://secret.example", "pw", 0, 0))));
        store
            .expect_increment_hit_count()
            .times(1)
            .returning(|m| Ok(Some(record(m, "https://secret.example", "pw", 1, 0))));

        let cache = Arc::new(RecordingCache::default());
        let resolver = resolver(store, MockTokenSource::new()).with_cache(cache.clone());

        assert_eq!(
            resolver.resolve_mapping("xyz", None).await.unwrap(),
            Resolution::NeedCredential
        );
        assert_eq!(
            resolver.resolve_mapping("xyz", Some(b"nope".as_slice())).await.unwrap(),
            Resolution::Denied
        );
        assert!(matches!(
            resolver.resolve_mapping("xyz", Some(b"pw".as_slice())).await.unwrap(),
            Resolution::Granted { protected: true, .. }
        ));

        let entries = cache.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].1.protected);
    }

    #[tokio::test]
    async fn test_resolve_uses_cache_after_first_lookup() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .times(1)
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 0, 0))));
        store
            .expect_increment_hit_count()
            .times(2)
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 1, 0))));

        let cache = Arc::new(RecordingCache::default());
        let resolver = resolver(store, MockTokenSource::new()).with_cache(cache.clone());

        resolver.resolve_mapping("abc", None).await.unwrap();
        resolver.resolve_mapping("abc", None).await.unwrap();

        assert_eq!(cache.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_vanished_record_invalidates_cache() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .returning(|m| Ok(Some(record(m, "https://example.org", "", 0, 0))));
        store.expect_increment_hit_count().returning(|_| Ok(None));

        let cache = Arc::new(RecordingCache::default());
        let resolver = resolver(store, MockTokenSource::new()).with_cache(cache.clone());

        let err = resolver.resolve_mapping("abc", None).await.unwrap_err();

        assert!(matches!(err, AppError::UnknownMapping { .. }));
        assert_eq!(*cache.invalidated.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let mut store = MockMappingStore::new();
        store.expect_delete().with(eq("abc")).returning(|_| Ok(true));
        store.expect_delete().with(eq("nope")).returning(|_| Ok(false));

        let cache = Arc::new(RecordingCache::default());
        let resolver = resolver(store, MockTokenSource::new()).with_cache(cache.clone());

        resolver.delete_mapping("abc").await.unwrap();
        let err = resolver.delete_mapping("nope").await.unwrap_err();

        assert!(matches!(err, AppError::UnknownMapping { .. }));
        assert_eq!(*cache.invalidated.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[tokio::test]
    async fn test_inspect_mapping() {
        let mut store = MockMappingStore::new();
        store
            .expect_find_by_mapping()
            .with(eq("abc"))
            .returning(|m| Ok(Some(record(m, "https://example.org", "pw", 3, 0))));
        store
            .expect_find_by_mapping()
            .with(eq("nope"))
            .returning(|_| Ok(None));

        let resolver = resolver(store, MockTokenSource::new());

        assert_eq!(resolver.inspect_mapping("abc").await.unwrap().hit_count, 3);
        assert!(matches!(
            resolver.inspect_mapping("nope").await,
            Err(AppError::UnknownMapping { .. })
        ));
    }
}
