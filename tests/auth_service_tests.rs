mod auth_support;

use std::sync::Arc;

use oathbridge::auth::{AccessToken, AuthError, AuthService, PollOutcome, TokenCache, TokenSource};

use auth_support::{denied, token, BrokenTokenCache, InMemoryTokenCache, ScriptedProvider};

#[tokio::test(start_paused = true)]
async fn cached_token_skips_device_flow() {
    let provider = Arc::new(ScriptedProvider::new(5, 900));
    let cache = Arc::new(InMemoryTokenCache::seeded(token("gho_cached")));
    let service = AuthService::new(provider.clone(), cache.clone());

    let mut presented = false;
    let (issued, source) = service.login(|_| presented = true).await.expect("login");

    assert_eq!(issued.secret(), "gho_cached");
    assert_eq!(source, TokenSource::Cache);
    assert!(!presented);
    assert_eq!(provider.start_count(), 0);
    assert_eq!(provider.poll_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cached_token_for_other_provider_is_ignored() {
    let provider = Arc::new(
        ScriptedProvider::new(5, 900).then(PollOutcome::Success(token("gho_fresh"))),
    );
    let cache = Arc::new(InMemoryTokenCache::seeded(AccessToken::new("gitlab", "glpat")));
    let service = AuthService::new(provider.clone(), cache.clone());

    let (issued, source) = service.login(|_| {}).await.expect("login");

    assert_eq!(issued.secret(), "gho_fresh");
    assert_eq!(source, TokenSource::DeviceFlow);
}

#[tokio::test(start_paused = true)]
async fn fresh_login_presents_code_and_saves_token() {
    let provider = Arc::new(
        ScriptedProvider::new(5, 900)
            .then(PollOutcome::Pending)
            .then(PollOutcome::Success(token("gho_fresh"))),
    );
    let cache = Arc::new(InMemoryTokenCache::new());
    let service = AuthService::new(provider.clone(), cache.clone()).with_scope("read:user");

    let mut shown_code = None;
    let (issued, source) = service
        .login(|grant| shown_code = Some(grant.user_code.clone()))
        .await
        .expect("login");

    assert_eq!(shown_code.as_deref(), Some("ABCD-EFGH"));
    assert_eq!(issued.secret(), "gho_fresh");
    assert_eq!(source, TokenSource::DeviceFlow);
    assert_eq!(cache.saves(), 1);
    assert_eq!(cache.load().map(|t| t.secret().to_string()), Some("gho_fresh".to_string()));
    assert_eq!(provider.start_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn cache_write_failure_does_not_fail_login() {
    let provider = Arc::new(
        ScriptedProvider::new(5, 900).then(PollOutcome::Success(token("gho_fresh"))),
    );
    let service = AuthService::new(provider, Arc::new(BrokenTokenCache));

    let (issued, _) = service.login(|_| {}).await.expect("login despite cache");

    assert_eq!(issued.secret(), "gho_fresh");
}

#[tokio::test(start_paused = true)]
async fn terminal_poll_error_is_not_cached() {
    let provider = Arc::new(ScriptedProvider::new(5, 900).then(denied("access_denied")));
    let cache = Arc::new(InMemoryTokenCache::new());
    let service = AuthService::new(provider.clone(), cache.clone());

    let err = service.login(|_| {}).await.unwrap_err();

    assert_eq!(err.provider_code(), Some("access_denied"));
    assert_eq!(cache.saves(), 0);
    assert_eq!(provider.start_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn expiry_does_not_reinitiate() {
    let provider = Arc::new(ScriptedProvider::new(5, 10));
    let service = AuthService::new(provider.clone(), Arc::new(InMemoryTokenCache::new()));

    let err = service.login(|_| {}).await.unwrap_err();

    assert!(matches!(err, AuthError::Expired { .. }));
    assert_eq!(provider.start_count(), 1);
}

#[test]
fn logout_reports_whether_a_token_was_removed() {
    let provider = Arc::new(ScriptedProvider::new(5, 900));
    let cache = Arc::new(InMemoryTokenCache::seeded(token("gho_cached")));
    let service = AuthService::new(provider, cache.clone());

    assert!(service.logout());
    assert!(cache.load().is_none());
    assert!(!service.logout());
}

#[test]
fn logout_with_broken_cache_reports_nothing_removed() {
    let service = AuthService::new(Arc::new(ScriptedProvider::new(5, 900)), Arc::new(BrokenTokenCache));
    assert!(!service.logout());
}
