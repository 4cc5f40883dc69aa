use crate::docs::types::Section;

use super::keywords::ParsedQuery;

/// Sections whose title or body mentions any subject term, in input order.
pub fn select<'a>(sections: &'a [Section], parsed: &ParsedQuery) -> Vec<&'a Section> {
    let subjects: Vec<String> = parsed.subjects.iter().map(|s| s.to_lowercase()).collect();
    if subjects.is_empty() {
        return vec![];
    }

    sections
        .iter()
        .filter(|section| {
            let haystack = format!("{}{}", section.title, section.content).to_lowercase();
            subjects.iter().any(|s| haystack.contains(s.as_str()))
        })
        .collect()
}
