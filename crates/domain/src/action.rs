//! The requested code operation and its presentation wrapper.
//!
//! Matching is exact and case-sensitive: `"refactor"` selects
//! [`Action::Refactor`], `"Refactor"` falls through to [`Action::Default`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Action {
    Refactor,
    Debug,
    Comment,
    Generate,
    /// Any action string without a dedicated template.
    #[default]
    Default,
}

/// HTML container the formatted answer is wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    /// `<pre><code>…</code></pre>`
    CodeBlock,
    /// `<div class="diff-view">…</div>`
    DiffView,
    /// `<div class="comment-block">…</div>`
    CommentBlock,
    /// `<div class="error-analysis">…</div>`
    ErrorAnalysis,
    /// Content is returned as-is.
    None,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Refactor,
        Action::Debug,
        Action::Comment,
        Action::Generate,
        Action::Default,
    ];

    /// Parse a wire action name. Unknown names map to [`Action::Default`].
    pub fn parse(s: &str) -> Self {
        match s {
            "refactor" => Action::Refactor,
            "debug" => Action::Debug,
            "comment" => Action::Comment,
            "generate" => Action::Generate,
            _ => Action::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Refactor => "refactor",
            Action::Debug => "debug",
            Action::Comment => "comment",
            Action::Generate => "generate",
            Action::Default => "default",
        }
    }

    pub fn wrapper(self) -> Wrapper {
        match self {
            Action::Generate => Wrapper::CodeBlock,
            Action::Refactor => Wrapper::DiffView,
            Action::Comment => Wrapper::CommentBlock,
            Action::Debug => Wrapper::ErrorAnalysis,
            Action::Default => Wrapper::None,
        }
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Action::parse(&s)
    }
}

impl From<Action> for &'static str {
    fn from(a: Action) -> Self {
        a.as_str()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
