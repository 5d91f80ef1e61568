// Class registry: the ordered label list the model was trained against.
// Line order defines the index-to-label mapping used to resolve an argmax,
// so the file must come from the same training run as the model artifact.
use std::path::Path;

use anyhow::{Context, ensure};

pub struct ClassRegistry {
    names: Vec<String>,
}

impl ClassRegistry {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read class names from {}", path.display()))?;
        let names: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self::from_names(names)
    }

    pub fn from_names(names: Vec<String>) -> anyhow::Result<Self> {
        ensure!(!names.is_empty(), "class name list is empty");
        Ok(Self { names })
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.names.iter().any(|name| name == label)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Human-readable form of a class label: underscores become spaces and
/// each word is title-cased, e.g. `masala_dosa` -> `Masala Dosa`.
pub fn display_name(label: &str) -> String {
    label
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_keep_file_order() {
        let registry =
            ClassRegistry::from_names(vec!["biryani".into(), "chai".into(), "dhokla".into()])
                .unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.label(1), Some("chai"));
        assert_eq!(registry.label(3), None);
        assert!(registry.contains("dhokla"));
        assert!(!registry.contains("samosa"));
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(ClassRegistry::from_names(vec![]).is_err());
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name("masala_dosa"), "Masala Dosa");
        assert_eq!(display_name("chai"), "Chai");
        assert_eq!(display_name("ALOO_GOBI"), "Aloo Gobi");
    }
}
