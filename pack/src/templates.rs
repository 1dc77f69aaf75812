//! Embedded pack documents.
//!
//! Templates are compiled into the binary with `include_str!()` so a pack can
//! be built from any working directory. Context and artifact templates carry a
//! single `{{CREATED_AT}}` placeholder; the README also fills in the message
//! count, timezone and platform export note.

/// Embedded template constants.
pub mod embedded {
    pub const README: &str = include_str!("../templates/README.md");

    pub const PROJECT_OVERVIEW: &str = include_str!("../templates/context/project_overview.md");
    pub const DECISIONS: &str = include_str!("../templates/context/decisions.md");
    pub const NEXT_STEPS: &str = include_str!("../templates/context/next_steps.md");

    /// Header for the `git log` artifact; capture output is appended.
    pub const COMMITS: &str = include_str!("../templates/artifacts/commits.md");

    /// Header for the `git status` artifact; capture output is appended.
    pub const FILES_CREATED: &str = include_str!("../templates/artifacts/files_created.md");

    pub const OPEN_QUESTIONS: &str = include_str!("../templates/artifacts/open_questions.md");
}

pub const CREATED_AT: &str = "{{CREATED_AT}}";
pub const MESSAGE_COUNT: &str = "{{MESSAGE_COUNT}}";
pub const TIMEZONE: &str = "{{TIMEZONE}}";
pub const PLATFORM_EXPORT: &str = "{{PLATFORM_EXPORT}}";

/// Static documents written verbatim apart from the timestamp.
pub const STATIC_DOCUMENTS: &[(&str, &str)] = &[
    (crate::CONTEXT_OVERVIEW_PATH, embedded::PROJECT_OVERVIEW),
    (crate::CONTEXT_DECISIONS_PATH, embedded::DECISIONS),
    (crate::CONTEXT_NEXT_STEPS_PATH, embedded::NEXT_STEPS),
    (crate::ARTIFACT_OPEN_QUESTIONS_PATH, embedded::OPEN_QUESTIONS),
];

/// Substitute each `(placeholder, value)` pair in order.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter()
        .fold(template.to_string(), |acc, (key, value)| acc.replace(key, value))
}

pub fn render_static(template: &str, created_at: &str) -> String {
    render(template, &[(CREATED_AT, created_at)])
}

/// Template header followed by captured text, separated by a blank line.
pub fn render_capture(template: &str, created_at: &str, captured: &str) -> String {
    let mut out = render_static(template, created_at);
    out.push('\n');
    out.push_str("```text\n");
    out.push_str(captured);
    if !captured.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("```\n");
    out
}

pub fn render_readme(
    created_at: &str,
    timezone: &str,
    message_count: usize,
    platform_export: Option<&str>,
) -> String {
    let count = message_count.to_string();
    let export = match platform_export {
        Some(path) => format!("- `{path}`: platform export, copied verbatim.\n"),
        None => String::new(),
    };
    render(
        embedded::README,
        &[
            (CREATED_AT, created_at),
            (TIMEZONE, timezone),
            (MESSAGE_COUNT, &count),
            (PLATFORM_EXPORT, &export),
        ],
    )
}
