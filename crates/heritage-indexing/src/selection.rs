//! Model selection for an index pass.

/// Which embedding models an index pass targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelSelection {
    /// Fallback mode: legacy `metadata.embedding` slot only
    #[default]
    None,
    /// One explicit model
    One(String),
    /// Several explicit models, processed in order
    Many(Vec<String>),
}

impl ModelSelection {
    /// Explicit model ids, with empty names dropped.
    pub fn models(&self) -> Vec<&str> {
        let models: Vec<&str> = match self {
            ModelSelection::None => Vec::new(),
            ModelSelection::One(model) => vec![model.as_str()],
            ModelSelection::Many(models) => models.iter().map(String::as_str).collect(),
        };
        models.into_iter().filter(|m| !m.is_empty()).collect()
    }

    /// Whether this selection runs fallback mode
    pub fn is_fallback(&self) -> bool {
        self.models().is_empty()
    }
}

impl From<Option<String>> for ModelSelection {
    fn from(model: Option<String>) -> Self {
        match model {
            Some(model) if !model.is_empty() => ModelSelection::One(model),
            _ => ModelSelection::None,
        }
    }
}

impl From<&str> for ModelSelection {
    fn from(model: &str) -> Self {
        ModelSelection::from(Some(model.to_string()))
    }
}

impl From<Vec<String>> for ModelSelection {
    fn from(models: Vec<String>) -> Self {
        match models.len() {
            0 => ModelSelection::None,
            1 => ModelSelection::from(models.into_iter().next()),
            _ => ModelSelection::Many(models),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(ModelSelection::from(None), ModelSelection::None);
        assert_eq!(ModelSelection::from(Some(String::new())), ModelSelection::None);
        assert_eq!(ModelSelection::from("m"), ModelSelection::One("m".to_string()));
        assert_eq!(ModelSelection::from(Vec::new()), ModelSelection::None);
        assert_eq!(
            ModelSelection::from(vec!["a".to_string()]),
            ModelSelection::One("a".to_string())
        );
        assert_eq!(
            ModelSelection::from(vec!["a".to_string(), "b".to_string()]),
            ModelSelection::Many(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_empty_names_mean_fallback() {
        let selection = ModelSelection::Many(vec![String::new(), String::new()]);
        assert!(selection.is_fallback());
        assert!(ModelSelection::None.is_fallback());
        assert!(!ModelSelection::from("m").is_fallback());
    }
}
