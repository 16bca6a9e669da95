//! Generated header block for converted scripts.

use chrono::{DateTime, Utc};

use crate::types::TargetPlatform;

const RULE_LINE: &str = "# ------------------------------------------------------------";
const SHEBANG: &str = "#!/usr/bin/env python3";

/// Fields written into the header.
#[derive(Debug, Clone)]
pub struct HeaderInfo<'a> {
    /// Source file name.
    pub source_name: &'a str,
    /// Conversion target.
    pub target_platform: TargetPlatform,
    /// Rule set used.
    pub rule_set: &'a str,
    /// Timestamp, rendered in UTC.
    pub generated_at: DateTime<Utc>,
    /// Number of rules that fired.
    pub rules_applied: usize,
}

/// Render the comment block (without shebang).
#[must_use]
pub fn render_header(info: &HeaderInfo<'_>) -> String {
    format!(
        "{RULE_LINE}\n\
         # {source} - converted for {platform} by IRUS\n\
         # Rule set: {rule_set}\n\
         # Generated: {generated}\n\
         # Rules applied: {applied}\n\
         {RULE_LINE}\n\n",
        source = info.source_name,
        platform = info.target_platform,
        rule_set = info.rule_set,
        generated = info.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        applied = info.rules_applied,
    )
}

/// Prepend the header to `body`.
///
/// A shebang is added in front unless `body` already starts with one, in
/// which case the existing shebang line stays first and the block follows it.
#[must_use]
pub fn prepend_header(info: &HeaderInfo<'_>, body: &str) -> String {
    let block = render_header(info);
    if body.starts_with("#!") {
        let (shebang, rest) = body.split_once('\n').unwrap_or((body, ""));
        format!("{shebang}\n{block}{rest}")
    } else {
        format!("{SHEBANG}\n{block}{body}")
    }
}
