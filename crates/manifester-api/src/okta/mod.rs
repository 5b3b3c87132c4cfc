// Okta Management API client modules

pub mod client;
pub mod groups;
pub mod models;

pub use client::OktaClient;
pub use groups::{GroupListParams, MemberListParams};
