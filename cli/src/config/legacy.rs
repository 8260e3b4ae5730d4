//! Legacy `.env` file reader

/// Ordered `KEY=VALUE` pairs read from a flat env file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyEnv {
    entries: Vec<(String, String)>,
}

impl LegacyEnv {
    /// Parse the contents of a flat env file.
    ///
    /// Empty lines and `#` comments are skipped, as are lines without `=`.
    /// Each line splits on its first `=`; key and value are kept verbatim.
    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self { entries }
    }

    /// Look up a key, last occurrence wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a key, empty when absent
    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    /// Entries in file order
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
