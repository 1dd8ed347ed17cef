#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use url_mapper::application::services::{MappingResolver, ResolverSettings};
use url_mapper::domain::entities::NewRecord;
use url_mapper::domain::repositories::MappingStore;
use url_mapper::domain::verification::BotVerifier;
use url_mapper::infrastructure::cache::NullCache;
use url_mapper::infrastructure::persistence::MemoryMappingStore;
use url_mapper::routes::build_router;
use url_mapper::state::AppState;
use url_mapper::utils::short_url::PublicSite;
use url_mapper::utils::token_generator::RandomTokenGenerator;

pub const HOST: &str = "s.example.com";
pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn site() -> PublicSite {
    PublicSite::new("http", HOST, 80)
}

pub fn settings() -> ResolverSettings {
    ResolverSettings {
        site: site(),
        ..Default::default()
    }
}

pub fn create_resolver(
    store: Arc<dyn MappingStore>,
    settings: ResolverSettings,
    verifier: Option<Arc<dyn BotVerifier>>,
) -> MappingResolver {
    let tokens = RandomTokenGenerator::new(7, url_mapper::utils::token_generator::DEFAULT_ALPHABET)
        .unwrap();
    let resolver = MappingResolver::new(store, Arc::new(tokens), settings);

    match verifier {
        Some(v) => resolver.with_verifier(v),
        None => resolver,
    }
}

/// State over a fresh in-memory store, host enforcement on, admin API enabled.
pub fn create_test_state() -> AppState {
    create_state_with(settings(), None)
}

pub fn create_state_with(
    settings: ResolverSettings,
    verifier: Option<Arc<dyn BotVerifier>>,
) -> AppState {
    let store: Arc<dyn MappingStore> = Arc::new(MemoryMappingStore::new());
    let resolver = create_resolver(store.clone(), settings, verifier);

    AppState::new(Arc::new(resolver), store, Arc::new(NullCache::new()))
        .with_admin_token(Some(ADMIN_TOKEN.to_string()))
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).unwrap()
}

pub async fn create_test_mapping(
    state: &AppState,
    mapping: &str,
    url: &str,
    password: &str,
    max_hit_count: i64,
) {
    state
        .store
        .insert(NewRecord {
            url: url.to_string(),
            mapping: mapping.to_string(),
            password: password.to_string(),
            max_hit_count,
        })
        .await
        .unwrap();
}

pub async fn hit_count(state: &AppState, mapping: &str) -> i64 {
    state
        .store
        .find_by_mapping(mapping)
        .await
        .unwrap()
        .unwrap()
        .hit_count
}
