//! Renderable trait and CodeFragment for decoupled code generation.

/// A piece of generated code, independent of indentation.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeFragment {
    /// A single line (may contain embedded newlines).
    Line(String),
    Blank,
    /// `/// text`
    Doc(String),
    /// `// text`
    Comment(String),
    /// Header line, indented body, optional closing line.
    Block {
        header: String,
        body: Vec<CodeFragment>,
        close: Option<String>,
    },
    Sequence(Vec<CodeFragment>),
}

impl CodeFragment {
    pub fn line(s: impl Into<String>) -> Self {
        Self::Line(s.into())
    }

    pub fn doc(s: impl Into<String>) -> Self {
        Self::Doc(s.into())
    }

    pub fn comment(s: impl Into<String>) -> Self {
        Self::Comment(s.into())
    }

    pub fn block(
        header: impl Into<String>,
        body: Vec<CodeFragment>,
        close: Option<impl Into<String>>,
    ) -> Self {
        Self::Block {
            header: header.into(),
            body,
            close: close.map(Into::into),
        }
    }
}

/// Types that can be turned into code fragments.
pub trait Renderable {
    fn to_fragments(&self) -> Vec<CodeFragment>;
}

impl Renderable for CodeFragment {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![self.clone()]
    }
}
