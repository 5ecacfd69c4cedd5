use serde::{Deserialize, Serialize};

/// Allergies typed by the user as a comma-separated list.
///
/// Entries keep their input order and duplicates are passed through to the
/// recommendation service untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllergyList {
    raw: String,
    entries: Vec<String>,
}

impl AllergyList {
    pub fn parse(input: &str) -> Self {
        let entries = input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            raw: input.to_string(),
            entries,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
