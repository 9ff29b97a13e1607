//! Sectioned key/value configuration port.

/// Typed parsing is left to the caller so malformed values can be reported
/// against their `[section] key`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Keys present in `section`, sorted. Empty when the section is absent.
    fn keys(&self, section: &str) -> Vec<String>;
}
