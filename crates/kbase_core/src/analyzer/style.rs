//! Style analyzer: input validation and sentence metrics.
//!
//! # Responsibility
//! - Validate input files (existence, extension, size, UTF-8).
//! - Split text into sentences on CJK and ASCII terminators and derive metrics.
//! - Persist reports as pretty JSON.
//!
//! # Invariants
//! - Lengths are measured in characters, not bytes.
//! - A failing file in a batch never aborts the remaining files.

use chrono::{DateTime, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

static SENTENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^。！？.!?]+[。！？.!?]?").expect("valid sentence regex"));

const DEFAULT_EXTENSIONS: [&str; 2] = [".txt", ".md"];
const DEFAULT_MIN_LENGTH: usize = 100;
const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Analyzer error for input validation and report output.
#[derive(Debug)]
pub enum AnalyzerError {
    NotFound(PathBuf),
    UnsupportedExtension {
        extension: String,
        supported: Vec<String>,
    },
    FileTooLarge {
        size: u64,
        max: u64,
    },
    /// Content is not valid UTF-8.
    InvalidEncoding(PathBuf),
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json(serde_json::Error),
}

impl Display for AnalyzerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::UnsupportedExtension {
                extension,
                supported,
            } => write!(
                f,
                "unsupported file format: `{extension}`; supported formats: {}",
                supported.join(", ")
            ),
            Self::FileTooLarge { size, max } => {
                write!(f, "file too large: {size} bytes exceeds limit of {max} bytes")
            }
            Self::InvalidEncoding(path) => write!(
                f,
                "invalid encoding in {}: files must be UTF-8 encoded",
                path.display()
            ),
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Json(err) => write!(f, "failed to serialize report: {err}"),
        }
    }
}

impl Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Sentence-level metrics of one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleMetrics {
    /// Total characters divided by sentence count.
    pub avg_sentence_length: f64,
    pub max_sentence_length: usize,
    pub min_sentence_length: usize,
    /// Share of sentences ending with `?` or `？`.
    pub question_ratio: f64,
}

/// Analysis result for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleReport {
    pub file_name: String,
    pub analysis_date: DateTime<Utc>,
    /// Total characters in the file.
    pub word_count: usize,
    pub sentence_count: usize,
    pub metrics: StyleMetrics,
    pub warnings: Vec<String>,
}

/// Per-file outcome of [`StyleAnalyzer::batch_analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    Report(StyleReport),
    Failed { file_name: String, error: String },
}

impl BatchItem {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Report(report) => &report.file_name,
            Self::Failed { file_name, .. } => file_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleAnalyzer {
    /// Accepted extensions with leading dot, matched case-sensitively.
    pub supported_extensions: Vec<String>,
    /// Content shorter than this many characters gets a warning.
    pub min_length: usize,
    pub max_size_bytes: u64,
}

impl Default for StyleAnalyzer {
    fn default() -> Self {
        Self {
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            min_length: DEFAULT_MIN_LENGTH,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

impl StyleAnalyzer {
    /// Validates and analyzes one file.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> AnalyzerResult<StyleReport> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => AnalyzerError::NotFound(path.to_path_buf()),
            _ => AnalyzerError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        })?;

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        if !self.supported_extensions.contains(&extension) {
            return Err(AnalyzerError::UnsupportedExtension {
                extension,
                supported: self.supported_extensions.clone(),
            });
        }

        if metadata.len() > self.max_size_bytes {
            return Err(AnalyzerError::FileTooLarge {
                size: metadata.len(),
                max: self.max_size_bytes,
            });
        }

        let bytes = fs::read(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content =
            String::from_utf8(bytes).map_err(|_| AnalyzerError::InvalidEncoding(path.to_path_buf()))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let report = self.analyze_text(file_name, &content);
        info!(
            "event=style_analyze module=analyzer status=ok chars={} sentences={} warnings={}",
            report.word_count,
            report.sentence_count,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Analyzes in-memory text under the given display name.
    pub fn analyze_text(&self, file_name: impl Into<String>, content: &str) -> StyleReport {
        let word_count = content.chars().count();
        let sentences = split_sentences(content);
        let mut warnings = Vec::new();
        if word_count < self.min_length {
            warnings.push(format!(
                "content too short ({word_count} characters); at least {} characters recommended for a reliable analysis",
                self.min_length
            ));
        }

        StyleReport {
            file_name: file_name.into(),
            analysis_date: Utc::now(),
            word_count,
            sentence_count: sentences.len(),
            metrics: compute_metrics(word_count, &sentences),
            warnings,
        }
    }

    /// Analyzes every path, recording failures per file.
    pub fn batch_analyze<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<BatchItem> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                self.analyze_file(path).map(BatchItem::Report).unwrap_or_else(|err| {
                    warn!("event=style_analyze module=analyzer status=error error={err}");
                    BatchItem::Failed {
                        file_name: path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string()),
                        error: err.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Writes `value` as pretty JSON.
    ///
    /// Defaults to `analysis_<YYYYMMDD_HHMMSS>.json` in the working directory.
    pub fn save_report<T: Serialize>(
        &self,
        value: &T,
        output: Option<&Path>,
    ) -> AnalyzerResult<PathBuf> {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(format!(
                "analysis_{}.json",
                Utc::now().format("%Y%m%d_%H%M%S")
            )),
        };
        let rendered = serde_json::to_string_pretty(value)?;
        fs::write(&path, rendered).map_err(|source| AnalyzerError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// One sentence with its terminator state.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Sentence<'a> {
    text: &'a str,
    is_question: bool,
}

fn split_sentences(content: &str) -> Vec<Sentence<'_>> {
    SENTENCE_RE
        .find_iter(content)
        .filter_map(|found| {
            let raw = found.as_str();
            let is_question = raw.ends_with('?') || raw.ends_with('？');
            let text = raw
                .trim_end_matches(['。', '！', '？', '.', '!', '?'])
                .trim();
            (!text.is_empty()).then_some(Sentence { text, is_question })
        })
        .collect()
}

fn compute_metrics(word_count: usize, sentences: &[Sentence<'_>]) -> StyleMetrics {
    if sentences.is_empty() {
        return StyleMetrics {
            avg_sentence_length: 0.0,
            max_sentence_length: 0,
            min_sentence_length: 0,
            question_ratio: 0.0,
        };
    }

    let lengths = sentences.iter().map(|s| s.text.chars().count());
    let questions = sentences.iter().filter(|s| s.is_question).count();
    StyleMetrics {
        avg_sentence_length: word_count as f64 / sentences.len() as f64,
        max_sentence_length: lengths.clone().max().unwrap_or(0),
        min_sentence_length: lengths.min().unwrap_or(0),
        question_ratio: questions as f64 / sentences.len() as f64,
    }
}
