//! Tenant HTTP access

mod client;
mod invoker;

pub use client::{CallFailure, RawResponse, TenantClient};
pub use invoker::ApiInvoker;
