//! Agenda issue title and body.

use chrono::{DateTime, Utc};

const TITLE_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Values available to the issue body.
#[derive(Debug, Clone)]
pub struct BodyContext<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub location: &'a str,
    pub slack_channel: Option<&'a str>,
    /// Rendered meeting time lines.
    pub times: &'a str,
    /// Rendered agenda checklist.
    pub issues: &'a str,
    pub label: &'a str,
    pub date: DateTime<Utc>,
}

/// Date used in the issue title and outputs, e.g. `12/18/2024`.
pub fn meeting_date(date: DateTime<Utc>) -> String {
    date.format(TITLE_DATE_FORMAT).to_string()
}

pub fn issue_title(date: DateTime<Utc>) -> String {
    format!("Agenda for {}", meeting_date(date))
}

/// Renders the built-in body layout.
pub fn render_default(ctx: &BodyContext<'_>) -> String {
    let slack = ctx
        .slack_channel
        .map(|channel| format!(" | [Slack]({channel})"))
        .unwrap_or_default();
    format!(
        "Agenda for {repo} meeting

## Meeting Details

[Location]({location}){slack}

## Time

{times}

## Agenda Items

> Generated from issues and pull requests with the '{label}' label.

{issues}

",
        repo = ctx.repo,
        location = ctx.location,
        times = ctx.times,
        label = ctx.label,
        issues = ctx.issues,
    )
}

/// Renders a custom template by substituting `{{name}}` placeholders.
///
/// Unknown placeholders are left as written.
pub fn render_template(template: &str, ctx: &BodyContext<'_>) -> String {
    let date = meeting_date(ctx.date);
    let values = [
        ("owner", ctx.owner),
        ("repo", ctx.repo),
        ("location", ctx.location),
        ("slack_channel", ctx.slack_channel.unwrap_or_default()),
        ("times", ctx.times),
        ("issues", ctx.issues),
        ("label", ctx.label),
        ("date", date.as_str()),
    ];

    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            rendered.push_str(&rest[start..]);
            return rendered;
        };
        let name = after_open[..end].trim();
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => rendered.push_str(value),
            None => rendered.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }
    rendered.push_str(rest);
    rendered
}

/// Renders with `template` when given, otherwise the built-in layout.
pub fn render_body(template: Option<&str>, ctx: &BodyContext<'_>) -> String {
    template.map_or_else(|| render_default(ctx), |template| render_template(template, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use insta::assert_snapshot;

    fn context<'a>(slack_channel: Option<&'a str>) -> BodyContext<'a> {
        BodyContext {
            owner: "octo",
            repo: "widgets",
            location: "https://example.zoom.us/j/1",
            slack_channel,
            times: "- 2:30 PM UTC\n- 9:30 AM America/New_York\n",
            issues: "\n- [ ] Issue [#12 Discuss roadmap](https://github.com/octo/widgets/issues/12)",
            label: "agenda",
            date: Utc.with_ymd_and_hms(2024, 12, 18, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn default_body_layout() {
        assert_snapshot!(render_default(&context(Some("https://slack.example/c/1"))));
    }

    #[test]
    fn default_body_omits_missing_slack() {
        let body = render_default(&context(None));
        assert!(body.contains("[Location](https://example.zoom.us/j/1)\n"));
        assert!(!body.contains("Slack"));
    }

    #[test]
    fn template_placeholders_are_substituted() {
        let body = render_template(
            "# {{repo}} sync on {{date}}\n{{ location }}\n{{issues}}\n{{unknown}}",
            &context(None),
        );
        assert_eq!(
            body,
            "# widgets sync on 12/18/2024\nhttps://example.zoom.us/j/1\n\n- [ ] Issue [#12 Discuss roadmap](https://github.com/octo/widgets/issues/12)\n{{unknown}}"
        );
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        assert_eq!(render_template("a {{repo", &context(None)), "a {{repo");
    }

    #[test]
    fn render_body_prefers_template() {
        assert_eq!(render_body(Some("{{owner}}"), &context(None)), "octo");
        assert!(render_body(None, &context(None)).starts_with("Agenda for widgets meeting"));
    }

    #[test]
    fn title_uses_short_date() {
        let date = Utc.with_ymd_and_hms(2025, 3, 5, 13, 30, 0).unwrap();
        assert_eq!(issue_title(date), "Agenda for 3/5/2025");
    }
}
