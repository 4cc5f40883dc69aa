pub mod types;

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::InitError;
use types::Section;

/// The sections a query engine searches, fixed for the engine's lifetime.
pub struct SectionStore {
    sections: Vec<Section>,
}

impl SectionStore {
    /// Load, require at least one section, then narrow to the allow-listed titles.
    /// An empty allow-list match falls back to every parsed section.
    pub fn open(path: &Path, marker: &str, allowed_titles: &[String]) -> Result<Self, InitError> {
        let all = Self::load(path, marker)?;
        if all.is_empty() {
            return Err(InitError::EmptyDocument(path.to_path_buf()));
        }

        let total = all.len();
        let filtered = filter_by_title(&all, allowed_titles);
        let sections = if filtered.is_empty() {
            warn!(
                total,
                allowed = ?allowed_titles,
                "No section title matched the allow-list, searching all sections"
            );
            all
        } else {
            filtered
        };

        info!(count = sections.len(), total, "Sections ready for querying");
        Ok(Self { sections })
    }

    #[cfg(test)]
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Read and split a document. Returns an empty list (with a warning) when
    /// the file contains no title markers.
    pub fn load(path: &Path, marker: &str) -> Result<Vec<Section>, InitError> {
        if !path.exists() {
            return Err(InitError::DocumentNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| InitError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let sections = Self::parse(&text, marker)?;
        if sections.is_empty() {
            warn!(path = %path.display(), marker, "No sections found in document");
        } else {
            debug!(path = %path.display(), count = sections.len(), "Document split into sections");
        }
        Ok(sections)
    }

    /// Split on the title marker. A title runs from the marker to the end of its
    /// line; content runs to the next title. Text before the first title is ignored.
    pub fn parse(text: &str, marker: &str) -> Result<Vec<Section>, InitError> {
        let pattern = Regex::new(&format!("{}.*", regex::escape(marker)))?;
        let titles: Vec<_> = pattern.find_iter(text).collect();

        let mut sections = Vec::with_capacity(titles.len());
        for (i, m) in titles.iter().enumerate() {
            let end = titles.get(i + 1).map(|next| next.start()).unwrap_or(text.len());
            let title = m.as_str().trim();
            let content = text[m.end()..end].trim();
            if !title.is_empty() && !content.is_empty() {
                sections.push(Section::new(title, content));
            }
        }
        Ok(sections)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

/// Keep sections whose title contains any allowed substring (case-sensitive).
pub fn filter_by_title(sections: &[Section], allowed: &[String]) -> Vec<Section> {
    sections
        .iter()
        .filter(|s| allowed.iter().any(|a| s.title.contains(a.as_str())))
        .cloned()
        .collect()
}
