#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use oathbridge::auth::{
    AccessToken, AuthError, CacheError, DeviceCodeGrant, DeviceCodeProvider, PollOutcome,
    ProviderErrorBody, TokenCache,
};
use tokio::time::Instant;

/// Device provider replaying a fixed script of poll outcomes.
///
/// Once the script runs dry every further poll is `Pending`.
pub struct ScriptedProvider {
    expires_in: chrono::Duration,
    interval: Duration,
    script: Mutex<VecDeque<Result<PollOutcome, AuthError>>>,
    polls: Mutex<Vec<Instant>>,
    starts: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(interval_secs: u64, expires_in_secs: i64) -> Self {
        Self {
            expires_in: chrono::Duration::seconds(expires_in_secs),
            interval: Duration::from_secs(interval_secs),
            script: Mutex::new(VecDeque::new()),
            polls: Mutex::new(Vec::new()),
            starts: AtomicUsize::new(0),
        }
    }

    pub fn then(self, outcome: PollOutcome) -> Self {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(Ok(outcome));
        self
    }

    pub fn then_err(self, err: AuthError) -> Self {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(Err(err));
        self
    }

    pub fn grant(&self) -> DeviceCodeGrant {
        DeviceCodeGrant {
            provider: "scripted".to_string(),
            device_code: "device-code-1".to_string(),
            user_code: "ABCD-EFGH".to_string(),
            verification_uri: "https://example.test/device".to_string(),
            expires_at: Utc::now() + self.expires_in,
            interval: self.interval,
        }
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.polls.lock().expect("polls lock poisoned").clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().expect("polls lock poisoned").len()
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceCodeProvider for ScriptedProvider {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn start_device_code(&self, _scope: &str) -> Result<DeviceCodeGrant, AuthError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(self.grant())
    }

    async fn poll_device_code(&self, _grant: &DeviceCodeGrant) -> Result<PollOutcome, AuthError> {
        self.polls
            .lock()
            .expect("polls lock poisoned")
            .push(Instant::now());
        self.script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or(Ok(PollOutcome::Pending))
    }
}

#[derive(Default)]
pub struct InMemoryTokenCache {
    token: Mutex<Option<AccessToken>>,
    saves: AtomicUsize,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(token: AccessToken) -> Self {
        let cache = Self::default();
        *cache.token.lock().expect("cache lock poisoned") = Some(token);
        cache
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TokenCache for InMemoryTokenCache {
    fn load(&self) -> Option<AccessToken> {
        self.token.lock().expect("cache lock poisoned").clone()
    }

    fn save(&self, token: &AccessToken) -> Result<(), CacheError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.token.lock().expect("cache lock poisoned") = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        *self.token.lock().expect("cache lock poisoned") = None;
        Ok(())
    }
}

/// Cache whose writes always fail.
pub struct BrokenTokenCache;

impl TokenCache for BrokenTokenCache {
    fn load(&self) -> Option<AccessToken> {
        None
    }

    fn save(&self, _token: &AccessToken) -> Result<(), CacheError> {
        Err(CacheError::Io("read-only file system".to_string()))
    }

    fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Io("read-only file system".to_string()))
    }
}

pub fn token(access_token: &str) -> AccessToken {
    AccessToken::new("scripted", access_token)
}

pub fn denied(code: &str) -> PollOutcome {
    PollOutcome::ExpiredOrDenied(ProviderErrorBody {
        error: code.to_string(),
        error_description: Some(format!("{code} description")),
        error_uri: Some("https://example.test/errors".to_string()),
    })
}

/// Assert two instants are `expected` apart, allowing timer-wheel rounding.
pub fn assert_spacing(earlier: Instant, later: Instant, expected: Duration) {
    let actual = later - earlier;
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "expected spacing of {expected:?}, got {actual:?}"
    );
}
