use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;
use crate::docs::types::Section;
use crate::docs::SectionStore;

#[derive(Args, Debug)]
pub struct SectionsArgs {
    /// Show every parsed section, not only the allow-listed ones
    #[arg(long)]
    pub all: bool,
}

pub fn run(config: &AppConfig, args: SectionsArgs) -> Result<()> {
    let doc = &config.document;
    let sections = if args.all {
        SectionStore::load(&doc.path, &doc.section_marker)?
    } else {
        SectionStore::open(&doc.path, &doc.section_marker, &doc.allowed_titles)?
            .sections()
            .to_vec()
    };

    print!("{}", render(&sections));
    Ok(())
}

fn render(sections: &[Section]) -> String {
    if sections.is_empty() {
        return "No sections found.\n".to_string();
    }

    let mut output = format!("{} section(s)\n\n", sections.len());
    for (i, section) in sections.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {} ({} chars)\n",
            i + 1,
            section.title,
            section.content.chars().count()
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_titles_with_sizes() {
        let out = render(&[
            Section::new("## 工作表: 9 鹽", "鹽 每日需過篩"),
            Section::new("## 工作表: 10 糖", "糖"),
        ]);
        assert_eq!(
            out,
            "2 section(s)\n\n  1. ## 工作表: 9 鹽 (7 chars)\n  2. ## 工作表: 10 糖 (1 chars)\n"
        );
        assert_eq!(render(&[]), "No sections found.\n");
    }
}
