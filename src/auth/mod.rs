//! OAuth device authorization grant and token caching.

pub mod device_code;
pub mod error;
pub mod poller;
pub mod providers;
pub mod service;
pub mod store;
pub mod token;

pub use device_code::{
    classify_token_response, DeviceCodeGrant, DeviceCodeProvider, DeviceCodeResponse,
    DeviceFlowErrorCode, PollOutcome, ProviderErrorBody,
};
pub use error::{AuthError, CacheError};
pub use poller::{DevicePoller, PollerState};
pub use service::{AuthService, TokenSource};
pub use store::{FileTokenCache, NoopTokenCache, TokenCache};
pub use token::AccessToken;
