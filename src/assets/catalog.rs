/// One entry of the model dropdown.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelEntry {
    pub label: String,
    pub file: String,
}

/// Fixed mapping of human-readable labels to asset identifiers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModelCatalog {
    pub entries: Vec<ModelEntry>,
    pub initial: String,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let entries = [("a", "1.glb"), ("b", "3.glb"), ("c", "4.glb"), ("d", "6.glb")]
            .into_iter()
            .map(|(label, file)| ModelEntry {
                label: label.to_string(),
                file: file.to_string(),
            })
            .collect();
        Self {
            entries,
            initial: "6.glb".to_string(),
        }
    }
}

impl ModelCatalog {
    /// Asset at dropdown position `slot`.
    pub fn file_at(&self, slot: usize) -> Option<&str> {
        self.entries.get(slot).map(|entry| entry.file.as_str())
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.file == model_id)
    }

    pub fn label_of(&self, model_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.file == model_id)
            .map(|entry| entry.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ModelCatalog;

    #[test]
    fn default_catalog_matches_dropdown() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.file_at(0), Some("1.glb"));
        assert_eq!(catalog.file_at(3), Some("6.glb"));
        assert_eq!(catalog.file_at(2), Some("4.glb"));
        assert_eq!(catalog.file_at(4), None);
        assert!(catalog.contains(&catalog.initial));
        assert_eq!(catalog.label_of("3.glb"), Some("b"));
        assert_eq!(catalog.label_of("7.glb"), None);
    }
}
