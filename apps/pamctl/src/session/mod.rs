//! Session store and time-boxed validation

mod registry;
mod validator;

pub use registry::SessionRegistry;
pub use validator::{SessionValidator, VALIDATION_WINDOW_SECS};
