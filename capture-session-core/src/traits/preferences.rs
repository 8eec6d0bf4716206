/// Persisted key-value preferences.
///
/// Storage format and location belong to the implementation.
pub trait PreferenceStore: Send + Sync + 'static {
    /// Missing keys read as `false`.
    fn bool(&self, key: &str) -> bool;

    fn set_bool(&self, key: &str, value: bool);

    fn string(&self, key: &str) -> Option<String>;

    fn set_string(&self, key: &str, value: &str);
}
