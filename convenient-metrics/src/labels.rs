//! Display labels for prover addresses

use std::collections::HashMap;

/// Mapping from lowercase prover address to a human readable label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProverLabels {
    labels: HashMap<String, String>,
}

impl ProverLabels {
    /// Create an empty label set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label for an address (case-insensitive)
    pub fn insert(&mut self, address: &str, label: impl Into<String>) {
        let _previous = self.labels.insert(normalize_address(address), label.into());
    }

    /// Parse an `ADDRESS=LABEL` assignment as given on the command line
    ///
    /// Returns `None` when the `=` is missing or either side is empty.
    #[must_use]
    pub fn parse_assignment(assignment: &str) -> Option<(String, String)> {
        let (address, label) = assignment.split_once('=')?;
        let (address, label) = (address.trim(), label.trim());
        if address.is_empty() || label.is_empty() {
            return None;
        }
        Some((normalize_address(address), label.to_string()))
    }

    /// Label for an address, falling back to a shortened address
    #[must_use]
    pub fn label_for(&self, address: &str) -> String {
        self.labels
            .get(&normalize_address(address))
            .cloned()
            .unwrap_or_else(|| short_address(address))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ProverLabels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Self::new();
        for (address, label) in iter {
            labels.insert(address.as_ref(), label);
        }
        labels
    }
}

/// Canonical form of an address: trimmed and lowercase
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// `0x1234...abcd` for long addresses, the address itself otherwise
fn short_address(address: &str) -> String {
    let address = normalize_address(address);
    if address.len() <= 12 || !address.is_ascii() {
        return address;
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
