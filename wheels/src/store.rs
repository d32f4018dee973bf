use std::{
    env, fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;
use yaml_front_matter::YamlFrontMatter;

use crate::model::DocumentStore;

lazy_static! {
    // The glyph set PDF exports litter the text with: •, ‣, ◦, ⁃, ∙, the
    // non-breaking hyphen, and the plain dash.
    static ref BULLET_RE: Regex =
        Regex::new("[\u{2022}\u{2023}\u{25E6}\u{2043}\u{2219}\u{2011}-]").unwrap();
}

#[derive(Debug, serde::Deserialize, Default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// One knowledge-base document, cleaned for prompt use.
#[derive(Debug)]
pub struct KnowledgeFile {
    pub title: Option<String>,
    pub body: String,
}

/// Splits YAML front-matter from a markdown body.
///
/// # Errors
///
/// Returns an error if the front-matter block cannot be parsed.
pub fn parse_meta(content: &str) -> Result<(FrontMatter, String), Box<dyn std::error::Error>> {
    let document = YamlFrontMatter::parse::<FrontMatter>(content)?;

    Ok((document.metadata, document.content.trim().to_owned()))
}

/// Normalizes extracted PDF text: runs joined by single spaces, bullet
/// glyphs removed, trimmed.
#[must_use]
pub fn clean_pdf_text(raw: &str) -> String {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    BULLET_RE.replace_all(&joined, "").trim().to_owned()
}

fn sanitize_slug(slug: &str) -> Option<&str> {
    if slug.is_empty()
        || !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }

    Some(slug)
}

/// Knowledge-base documents on local disk, one file per slug, markdown or
/// PDF. Read-only at query time; the indexer reads through the same path.
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base: base.into() }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(env::var("KNOWLEDGE_DIR").unwrap_or_else(|_| "knowledge".into()))
    }

    /// Reads the document for `slug`, trying `<slug>.md` then `<slug>.pdf`.
    ///
    /// Every failure mode collapses to `None` with a log line: slugs that
    /// would escape the base directory, missing files, unreadable content.
    #[must_use]
    pub fn read(&self, slug: &str) -> Option<KnowledgeFile> {
        let Some(slug) = sanitize_slug(slug) else {
            warn!("Refusing to resolve slug: {slug}");
            return None;
        };

        let markdown = self.base.join(format!("{slug}.md"));
        if markdown.is_file() {
            return read_markdown(&markdown);
        }

        let pdf = self.base.join(format!("{slug}.pdf"));
        if pdf.is_file() {
            return read_pdf(&pdf);
        }

        warn!("No knowledge document for slug: {slug}");
        None
    }
}

fn read_markdown(path: &Path) -> Option<KnowledgeFile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("Failed to read {}: {err}", path.display());
            return None;
        }
    };

    if content.trim_start().starts_with("---") {
        match parse_meta(&content) {
            Ok((metadata, body)) => {
                return Some(KnowledgeFile {
                    title: metadata.title,
                    body,
                })
            }
            Err(err) => warn!("Failed to parse front matter in {}: {err}", path.display()),
        }
    }

    Some(KnowledgeFile {
        title: None,
        body: content.trim().to_owned(),
    })
}

fn read_pdf(path: &Path) -> Option<KnowledgeFile> {
    match pdf_extract::extract_text(path) {
        Ok(raw) => Some(KnowledgeFile {
            title: None,
            body: clean_pdf_text(&raw),
        }),
        Err(err) => {
            warn!("Failed to extract text from {}: {err}", path.display());
            None
        }
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn fetch(&self, slug: &str) -> Option<String> {
        self.read(slug).map(|doc| doc.body)
    }
}
