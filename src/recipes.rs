// Recipe catalog: static lookup from class label to recipe content. Entries
// are kept as loaded so responses return them verbatim.
use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::labels::ClassRegistry;

#[derive(Deserialize)]
struct CatalogDoc {
    recipes: Vec<Value>,
}

pub struct RecipeCatalog {
    by_label: HashMap<String, Value>,
}

impl RecipeCatalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipes from {}", path.display()))?;
        let doc: CatalogDoc = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a valid recipe catalog", path.display()))?;
        Self::from_entries(doc.recipes)
    }

    pub fn from_entries(entries: Vec<Value>) -> anyhow::Result<Self> {
        let mut by_label = HashMap::with_capacity(entries.len());
        for entry in entries {
            let label = entry
                .get("folderName")
                .and_then(Value::as_str)
                .context("recipe entry has no 'folderName' key")?
                .to_string();
            by_label.insert(label, entry);
        }
        Ok(Self { by_label })
    }

    /// Lookup is best-effort: a label with no recipe is `None`, not an error.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.by_label.get(label)
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Warns about catalog entries that no class label can ever select.
    pub fn warn_unknown_labels(&self, registry: &ClassRegistry) {
        for label in self.by_label.keys() {
            if !registry.contains(label) {
                tracing::warn!(%label, "recipe catalog entry does not match any class label");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RecipeCatalog {
        RecipeCatalog::from_entries(vec![
            json!({
                "folderName": "masala_dosa",
                "name": "Masala Dosa",
                "ingredients": ["rice", "urad dal", "potato"],
                "steps": ["ferment batter", "cook filling", "roast and fold"]
            }),
            json!({ "folderName": "chai", "name": "Chai" }),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_returns_entry_verbatim() {
        let catalog = sample();
        let recipe = catalog.get("masala_dosa").unwrap();
        assert_eq!(recipe["name"], "Masala Dosa");
        assert_eq!(recipe["ingredients"][2], "potato");
    }

    #[test]
    fn miss_is_none_not_an_error() {
        let catalog = sample();
        assert!(catalog.get("samosa").is_none());
    }

    #[test]
    fn entry_without_folder_name_is_rejected() {
        let result = RecipeCatalog::from_entries(vec![json!({ "name": "Unlabeled" })]);
        assert!(result.is_err());
    }
}
