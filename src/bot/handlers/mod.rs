//! Discord interaction handlers
//!
//! Handlers for interactions that are not commands themselves, such as autocomplete.

/// Autocomplete handlers for setting ids
pub mod autocomplete;
