use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use stratus_ir::WireError;
use thiserror::Error;

/// Result type for template operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Holds the document text and its name so that error factories can attach
/// a labelled span without threading both through every call.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Byte offset of a 1-based line/column position.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let line_start: usize = self
            .src
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        (line_start + column.saturating_sub(1)).min(self.src.len())
    }

    /// Span of the first occurrence of a logical name used as a key.
    pub fn find_key_span(&self, name: &str) -> Option<SourceSpan> {
        let patterns = [
            format!("\"{}\"", name),
            format!("{}:", name),
            format!("'{}'", name),
        ];
        for pattern in &patterns {
            if let Some(pos) = self.src.find(pattern.as_str()) {
                let start = if pattern.starts_with(['"', '\'']) {
                    pos + 1
                } else {
                    pos
                };
                return Some(SourceSpan::from((start, name.len())));
            }
        }
        None
    }

    /// Create a syntax error.
    pub fn syntax_error(
        &self,
        format: &'static str,
        message: impl Into<String>,
        offset: Option<usize>,
    ) -> Box<Error> {
        Box::new(Error::Syntax {
            src: self.named_source(),
            span: offset.map(|o| SourceSpan::from((o, 0))),
            format,
            message: message.into(),
        })
    }

    /// Create a structural error, labelled at `name` when it can be found.
    pub fn invalid(&self, message: impl Into<String>, name: Option<&str>) -> Box<Error> {
        Box::new(Error::Invalid {
            src: self.named_source(),
            span: name.and_then(|n| self.find_key_span(n)),
            message: message.into(),
        })
    }

    /// Create an invalid logical name error.
    pub fn invalid_name(
        &self,
        name: impl Into<String>,
        section: &'static str,
        reason: &'static str,
    ) -> Box<Error> {
        let name = name.into();
        Box::new(Error::InvalidLogicalName {
            src: self.named_source(),
            span: self.find_key_span(&name),
            name,
            section,
            reason,
        })
    }

    /// Wrap an intrinsic decoding error, labelled at the owning entry.
    pub fn intrinsic_error(&self, owner: &str, source: WireError) -> Box<Error> {
        Box::new(Error::Intrinsic {
            src: self.named_source(),
            span: self.find_key_span(owner),
            owner: owner.to_string(),
            source,
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(stratus::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template as {format}: {message}")]
    #[diagnostic(code(stratus::parse_error))]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        format: &'static str,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(code(stratus::invalid_template))]
    Invalid {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("invalid logical name '{name}' in {section}")]
    #[diagnostic(
        code(stratus::invalid_name),
        help("{reason}; logical names must be non-empty and alphanumeric")
    )]
    InvalidLogicalName {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid name")]
        span: Option<SourceSpan>,
        name: String,
        section: &'static str,
        reason: &'static str,
    },

    #[error("invalid intrinsic function in '{owner}'")]
    #[diagnostic(code(stratus::intrinsic))]
    Intrinsic {
        #[source_code]
        src: NamedSource<String>,
        #[label("in this entry")]
        span: Option<SourceSpan>,
        owner: String,
        #[source]
        source: WireError,
    },

    #[error("failed to write template as YAML")]
    #[diagnostic(code(stratus::emit))]
    Emit {
        #[source]
        source: serde_yaml::Error,
    },
}
