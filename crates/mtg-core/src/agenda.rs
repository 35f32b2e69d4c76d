//! Agenda items: open issues and pull requests carrying the agenda label.

use serde::{Deserialize, Serialize};

/// An issue or pull request as listed by the issue tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    /// API URL of the owning repository; present on search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// Present (non-null) only for pull requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl AgendaItem {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Repository name taken from the last segment of `repository_url`.
    pub fn repository_name(&self) -> Option<&str> {
        let url = self.repository_url.as_deref()?;
        url.contains('/')
            .then(|| url.rsplit('/').next())
            .flatten()
    }
}

/// Escapes `[`, `]`, `(` and `)` so a title cannot break the markdown link.
pub fn escape_markdown_link(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '[' | ']' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Formats one checklist line, prefixed by a newline.
///
/// Organization-wide agendas prefix the number with `<repo>/`.
pub fn format_agenda_item(item: &AgendaItem, org_wide: bool) -> String {
    let kind = if item.is_pull_request() { "PR" } else { "Issue" };
    let repo = if org_wide {
        item.repository_name()
            .map(|name| format!("{name}/"))
            .unwrap_or_default()
    } else {
        String::new()
    };
    format!(
        "\n- [ ] {kind} [{repo}#{} {}]({})",
        item.number,
        escape_markdown_link(&item.title),
        item.html_url
    )
}

/// Formats all agenda items in order.
pub fn render_agenda(items: &[AgendaItem], org_wide: bool) -> String {
    items
        .iter()
        .map(|item| format_agenda_item(item, org_wide))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(number: u64, title: &str) -> AgendaItem {
        AgendaItem {
            number,
            title: title.to_string(),
            html_url: format!("https://github.com/octo/widgets/issues/{number}"),
            repository_url: Some("https://api.github.com/repos/octo/widgets".to_string()),
            pull_request: None,
        }
    }

    #[test]
    fn formats_issue_line() {
        assert_eq!(
            format_agenda_item(&issue(12, "Discuss roadmap"), false),
            "\n- [ ] Issue [#12 Discuss roadmap](https://github.com/octo/widgets/issues/12)"
        );
    }

    #[test]
    fn formats_pull_request_line() {
        let mut item = issue(7, "Add parser");
        item.pull_request = Some(serde_json::json!({"url": "https://api.github.com/pulls/7"}));
        assert!(format_agenda_item(&item, false).starts_with("\n- [ ] PR [#7 Add parser]"));
    }

    #[test]
    fn org_wide_prefixes_repository() {
        assert_eq!(
            format_agenda_item(&issue(3, "Triage"), true),
            "\n- [ ] Issue [widgets/#3 Triage](https://github.com/octo/widgets/issues/3)"
        );
    }

    #[test]
    fn org_wide_without_repository_url_has_no_prefix() {
        let mut item = issue(3, "Triage");
        item.repository_url = None;
        assert!(format_agenda_item(&item, true).contains("[#3 Triage]"));
    }

    #[test]
    fn escapes_link_characters_in_title() {
        assert_eq!(
            escape_markdown_link("fix [docs] (again)"),
            r"fix \[docs\] \(again\)"
        );
    }

    #[test]
    fn deserializes_null_pull_request_as_issue() {
        let item: AgendaItem = serde_json::from_str(
            r#"{"number":1,"title":"t","html_url":"u","pull_request":null,"labels":[]}"#,
        )
        .unwrap();
        assert!(!item.is_pull_request());
    }

    #[test]
    fn renders_items_in_order() {
        let rendered = render_agenda(&[issue(1, "a"), issue(2, "b")], false);
        assert_eq!(rendered.matches("\n- [ ] ").count(), 2);
        assert!(rendered.find("#1 a").unwrap() < rendered.find("#2 b").unwrap());
    }
}
