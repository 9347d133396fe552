use sm_domain::action::{Action, Wrapper};

/// Wrap the model's answer in the HTML container for `action`.
pub fn format_response(action: Action, content: &str) -> String {
    match action.wrapper() {
        Wrapper::CodeBlock => format!("<pre><code>{content}</code></pre>"),
        Wrapper::DiffView => format!("<div class=\"diff-view\">{content}</div>"),
        Wrapper::CommentBlock => format!("<div class=\"comment-block\">{content}</div>"),
        Wrapper::ErrorAnalysis => format!("<div class=\"error-analysis\">{content}</div>"),
        Wrapper::None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_per_action() {
        assert_eq!(format_response(Action::Generate, "X"), "<pre><code>X</code></pre>");
        assert_eq!(
            format_response(Action::Refactor, "X"),
            "<div class=\"diff-view\">X</div>"
        );
        assert_eq!(
            format_response(Action::Comment, "X"),
            "<div class=\"comment-block\">X</div>"
        );
        assert_eq!(
            format_response(Action::Debug, "X"),
            "<div class=\"error-analysis\">X</div>"
        );
        assert_eq!(format_response(Action::Default, "X"), "X");
    }

    #[test]
    fn content_is_not_escaped() {
        assert_eq!(
            format_response(Action::Generate, "a < b && c"),
            "<pre><code>a < b && c</code></pre>"
        );
    }
}
