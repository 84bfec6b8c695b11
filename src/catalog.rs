// Prompt catalog: the read-only set of design prompts the studio serves.
//
// Loaded once at startup from a JSON file. The catalog order is the display
// order; the first entry is the default selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse catalog {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("catalog contains no prompts")]
    Empty,

    #[error("duplicate prompt id: {id}")]
    DuplicateId { id: String },
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Difficulty tier of a design prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// A single system-design interview prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub summary: String,
    pub requirements: Vec<String>,
    /// Reference solution, rendered by the front end.
    #[serde(default)]
    pub solution_html: String,
}

// ---------------------------------------------------------------------------
// PromptCatalog
// ---------------------------------------------------------------------------

/// Ordered, immutable collection of prompts with id lookup.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: Vec<Prompt>,
}

impl PromptCatalog {
    /// Build a catalog from an already-parsed prompt list, validating id
    /// uniqueness and non-emptiness.
    pub fn new(prompts: Vec<Prompt>) -> Result<Self, CatalogError> {
        if prompts.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for prompt in &prompts {
            if !seen.insert(prompt.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: prompt.id.clone(),
                });
            }
        }
        Ok(Self { prompts })
    }

    /// Load a catalog from a JSON file containing an array of prompts.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|_| CatalogError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let prompts: Vec<Prompt> =
            serde_json::from_str(&text).map_err(|e| CatalogError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::new(prompts)
    }

    /// Parse a catalog from a JSON string (used by tests and embedded data).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let prompts: Vec<Prompt> =
            serde_json::from_str(json).map_err(|e| CatalogError::ParseError {
                path: PathBuf::from("<inline>"),
                source: e,
            })?;
        Self::new(prompts)
    }

    /// Look up a prompt by id.
    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    /// All prompts in catalog order.
    pub fn list(&self) -> &[Prompt] {
        &self.prompts
    }

    /// The default selection.
    pub fn first(&self) -> &Prompt {
        // Invariant: `new` rejects empty catalogs.
        &self.prompts[0]
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
            {
                "id": "design-url-shortener",
                "title": "Design URL Shortener",
                "difficulty": "Easy",
                "summary": "Design a scalable system like TinyURL or Bitly.",
                "requirements": [
                    "Return a unique short URL for any long URL.",
                    "Redirect from short URL to original URL quickly."
                ],
                "solutionHtml": "<h3>Core Idea</h3>"
            },
            {
                "id": "design-uber",
                "title": "Design Uber/Lyft",
                "difficulty": "Hard",
                "summary": "Design a real-time ride-sharing service.",
                "requirements": [
                    "Drivers report location every 4 seconds.",
                    "Riders can see nearby drivers on a map."
                ]
            }
        ]"#
    }

    #[test]
    fn from_json_parses_prompts_in_order() {
        let catalog = PromptCatalog::from_json(sample_json()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.first().id, "design-url-shortener");
        assert_eq!(catalog.list()[1].difficulty, Difficulty::Hard);
    }

    #[test]
    fn get_finds_by_id() {
        let catalog = PromptCatalog::from_json(sample_json()).unwrap();
        let prompt = catalog.get("design-uber").unwrap();
        assert_eq!(prompt.title, "Design Uber/Lyft");
        assert_eq!(prompt.requirements.len(), 2);
    }

    #[test]
    fn get_returns_none_for_unknown_id() {
        let catalog = PromptCatalog::from_json(sample_json()).unwrap();
        assert!(catalog.get("design-nothing").is_none());
    }

    #[test]
    fn solution_html_defaults_to_empty() {
        let catalog = PromptCatalog::from_json(sample_json()).unwrap();
        assert_eq!(catalog.get("design-uber").unwrap().solution_html, "");
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = PromptCatalog::from_json("[]").unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"[
            {"id": "a", "title": "A", "difficulty": "Easy", "summary": "s", "requirements": []},
            {"id": "a", "title": "A again", "difficulty": "Easy", "summary": "s", "requirements": []}
        ]"#;
        let err = PromptCatalog::from_json(json).unwrap_err();
        match err {
            CatalogError::DuplicateId { id } => assert_eq!(id, "a"),
            other => panic!("expected DuplicateId, got: {other}"),
        }
    }

    #[test]
    fn parse_error_for_invalid_json() {
        let err = PromptCatalog::from_json("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::ParseError { .. }));
    }

    #[test]
    fn load_missing_file_is_file_not_found() {
        let err = PromptCatalog::load(Path::new("/nonexistent/prompts.json")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound { .. }));
    }
}
