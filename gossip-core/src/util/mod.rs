/// Logging macros
#[macro_use]
pub mod macro_logger;
/// Cryptographic utilities
pub mod crypto_utils;

/// Utilities for testing
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
