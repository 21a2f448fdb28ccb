use std::collections::HashMap;

/// Entries every directory starts from.
const BUILTIN_CONTACTS: [(&str, &str); 3] = [
    ("alina", "alina@example.com"),
    ("alex", "alex@company.com"),
    ("sarah", "sarah@company.com"),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Contact not found: {name}")]
    NotFound { name: String },
    #[error("Invalid contacts file: {0}")]
    InvalidSource(String),
}

/// Read-only name → email lookup, keyed by lowercased name.
///
/// Built once at startup and shared behind an `Arc`; there is no mutation API.
#[derive(Debug, Clone)]
pub struct ContactDirectory {
    entries: HashMap<String, String>,
}

impl ContactDirectory {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_CONTACTS)
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, email)| (normalize_name(name.as_ref()), email.into()))
            .collect();
        Self { entries }
    }

    /// Parse a JSON object of `name -> email` pairs.
    pub fn from_json(source: &str) -> Result<Self, DirectoryError> {
        let parsed: HashMap<String, String> = serde_json::from_str(source)
            .map_err(|e| DirectoryError::InvalidSource(e.to_string()))?;

        if let Some((name, _)) = parsed.iter().find(|(_, email)| !email.contains('@')) {
            return Err(DirectoryError::InvalidSource(format!(
                "entry '{name}' does not map to an email address"
            )));
        }

        let mut seen: HashMap<String, &str> = HashMap::with_capacity(parsed.len());
        for name in parsed.keys() {
            if let Some(previous) = seen.insert(normalize_name(name), name) {
                let (first, second) = if previous < name.as_str() {
                    (previous, name.as_str())
                } else {
                    (name.as_str(), previous)
                };
                return Err(DirectoryError::InvalidSource(format!(
                    "entries '{first}' and '{second}' name the same contact"
                )));
            }
        }

        Ok(Self::from_entries(parsed))
    }

    /// Layer `other` on top of `self`; entries in `other` win.
    pub fn with_overrides(mut self, other: ContactDirectory) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<&str, DirectoryError> {
        self.entries
            .get(&normalize_name(name))
            .map(String::as_str)
            .ok_or_else(|| DirectoryError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ContactDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
