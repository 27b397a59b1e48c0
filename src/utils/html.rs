// src/utils/html.rs

/// Cleans user-supplied text with ammonia before it is stored.
///
/// Whitelist-based: safe inline tags survive, `<script>`/`<iframe>` and event
/// handler attributes are stripped. Exams and questions are rendered by several
/// dashboards, so this runs on write rather than on every read.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
