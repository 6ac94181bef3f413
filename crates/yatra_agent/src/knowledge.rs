//! Travel knowledge base.
//!
//! [`KeywordIndex`] loads plain-text documents from a directory, splits them
//! into paragraph passages and answers questions with the passages sharing
//! the most terms with the question.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Returned when no passage shares a term with the question.
pub const NO_MATCH_ANSWER: &str = "No relevant information found in the knowledge base.";

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "for", "from", "have", "how",
    "i", "in", "is", "it", "me", "my", "of", "on", "or", "our", "that", "the", "there", "this",
    "to", "we", "what", "which", "with", "you", "your",
];

/// Errors raised while building or querying a knowledge base.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    /// A document or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The directory holds no usable documents.
    #[error("no documents found in {0}")]
    Empty(PathBuf),

    /// The question has no searchable terms.
    #[error("query is empty")]
    EmptyQuery,
}

/// Answers travel questions from stored documents.
#[async_trait]
pub trait KnowledgeBase: Send + Sync + 'static {
    /// Returns the passages relevant to `question`, joined into one answer.
    async fn query(&self, question: &str) -> Result<String, KnowledgeError>;
}

#[derive(Debug, Clone)]
struct Passage {
    source: String,
    text: String,
    terms: HashSet<String>,
}

/// Term-overlap index over paragraph passages.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    passages: Vec<Passage>,
    top_k: usize,
}

impl KeywordIndex {
    /// Builds an index from `(source, text)` documents.
    pub fn from_documents<I, S, T>(documents: I, top_k: usize) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let mut passages = Vec::new();
        for (source, text) in documents {
            let source = source.into();
            for paragraph in split_paragraphs(text.as_ref()) {
                passages.push(Passage {
                    source: source.clone(),
                    terms: terms(&paragraph),
                    text: paragraph,
                });
            }
        }
        Self {
            passages,
            top_k: top_k.max(1),
        }
    }

    /// Loads every `.txt` and `.md` file in `dir`, in file name order.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::Io`] if the directory or a file cannot be
    /// read, or [`KnowledgeError::Empty`] if no passages were found.
    pub fn from_dir(dir: impl AsRef<Path>, top_k: usize) -> Result<Self, KnowledgeError> {
        let dir = dir.as_ref();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| KnowledgeError::Io { path, source }
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
            let path = entry.map_err(io_err(dir))?.path();
            let is_text = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "txt" | "md"));
            if is_text && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let text = std::fs::read_to_string(&path).map_err(io_err(&path))?;
            let source = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            documents.push((source, text));
        }

        let index = Self::from_documents(documents, top_k);
        if index.is_empty() {
            return Err(KnowledgeError::Empty(dir.to_path_buf()));
        }
        tracing::info!(
            dir = %dir.display(),
            passages = index.len(),
            "knowledge base loaded"
        );
        Ok(index)
    }

    /// Number of passages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Returns `true` if the index holds no passages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Highest-scoring passages, best first. Ties keep document order.
    fn search(&self, question: &str) -> Result<Vec<&Passage>, KnowledgeError> {
        let wanted = terms(question);
        if wanted.is_empty() {
            return Err(KnowledgeError::EmptyQuery);
        }

        let mut scored: Vec<(usize, usize)> = self
            .passages
            .iter()
            .enumerate()
            .map(|(index, passage)| (index, passage.terms.intersection(&wanted).count()))
            .filter(|&(_, score)| score > 0)
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(scored
            .into_iter()
            .take(self.top_k)
            .map(|(index, _)| &self.passages[index])
            .collect())
    }
}

#[async_trait]
impl KnowledgeBase for KeywordIndex {
    async fn query(&self, question: &str) -> Result<String, KnowledgeError> {
        let hits = self.search(question)?;
        tracing::debug!(question, hits = hits.len(), "knowledge base query");
        if hits.is_empty() {
            return Ok(NO_MATCH_ANSWER.to_string());
        }
        for hit in &hits {
            tracing::trace!(source = %hit.source, "matched passage");
        }
        Ok(hits
            .iter()
            .map(|passage| passage.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 1)
        .map(str::to_lowercase)
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}
