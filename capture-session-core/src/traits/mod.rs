pub mod authorizer;
pub mod capture_delegate;
pub mod capture_session;
pub mod device_provider;
pub mod preferences;
pub mod presentation;
