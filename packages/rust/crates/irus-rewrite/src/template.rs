//! Replacement templates for regex rules.
//!
//! Rule files use `re.sub`-style references: `\1`, `\g<1>`, `\g<name>`,
//! plus the braced `${1}` / `${name}` form. A bare `$` is literal text.

use std::borrow::Cow;

use regex::{Captures, Regex, Replacer};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Group(usize),
    Named(String),
}

/// Parsed replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReplacementTemplate {
    parts: Vec<Part>,
}

impl ReplacementTemplate {
    /// Parse a template, rejecting malformed escapes and references.
    pub(crate) fn parse(template: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '\\' => {
                    let Some((_, escaped)) = chars.next() else {
                        return Err("trailing backslash at end of replacement".to_string());
                    };
                    match escaped {
                        '0' => literal.push('\0'),
                        d if d.is_ascii_digit() => {
                            let mut group = digit_value(d);
                            if let Some(&(_, next)) = chars.peek()
                                && next.is_ascii_digit()
                            {
                                group = group * 10 + digit_value(next);
                                chars.next();
                            }
                            flush(&mut literal, &mut parts);
                            parts.push(Part::Group(group));
                        }
                        'g' => {
                            if chars.next().map(|(_, ch)| ch) != Some('<') {
                                return Err(format!("missing '<' after \\g at position {pos}"));
                            }
                            let reference = read_until(&mut chars, '>')
                                .ok_or_else(|| format!("unterminated \\g< at position {pos}"))?;
                            flush(&mut literal, &mut parts);
                            parts.push(parse_reference(&reference, pos)?);
                        }
                        'n' => literal.push('\n'),
                        't' => literal.push('\t'),
                        'r' => literal.push('\r'),
                        'f' => literal.push('\x0c'),
                        'v' => literal.push('\x0b'),
                        'a' => literal.push('\x07'),
                        'b' => literal.push('\x08'),
                        '\\' => literal.push('\\'),
                        other if other.is_ascii_alphabetic() => {
                            return Err(format!("bad escape \\{other} at position {pos}"));
                        }
                        other => {
                            literal.push('\\');
                            literal.push(other);
                        }
                    }
                }
                '$' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    let reference = read_until(&mut chars, '}')
                        .ok_or_else(|| format!("unterminated ${{ at position {pos}"))?;
                    flush(&mut literal, &mut parts);
                    parts.push(parse_reference(&reference, pos)?);
                }
                other => literal.push(other),
            }
        }

        flush(&mut literal, &mut parts);
        Ok(Self { parts })
    }

    /// First group reference that `regex` cannot satisfy, described.
    pub(crate) fn missing_group(&self, regex: &Regex) -> Option<String> {
        self.parts.iter().find_map(|part| match part {
            Part::Group(index) if *index >= regex.captures_len() => Some(format!(
                "invalid group reference {index} (pattern has {} group(s))",
                regex.captures_len() - 1
            )),
            Part::Named(name) if !regex.capture_names().flatten().any(|n| n == name) => {
                Some(format!("unknown group name '{name}'"))
            }
            _ => None,
        })
    }
}

impl Replacer for &ReplacementTemplate {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        for part in &self.parts {
            match part {
                Part::Literal(text) => dst.push_str(text),
                Part::Group(index) => {
                    if let Some(m) = caps.get(*index) {
                        dst.push_str(m.as_str());
                    }
                }
                Part::Named(name) => {
                    if let Some(m) = caps.name(name) {
                        dst.push_str(m.as_str());
                    }
                }
            }
        }
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        match self.parts.as_slice() {
            [] => Some(Cow::Borrowed("")),
            [Part::Literal(text)] => Some(Cow::Borrowed(text.as_str())),
            _ => None,
        }
    }
}

fn digit_value(c: char) -> usize {
    c.to_digit(10).map_or(0, |d| d as usize)
}

fn flush(literal: &mut String, parts: &mut Vec<Part>) {
    if !literal.is_empty() {
        parts.push(Part::Literal(std::mem::take(literal)));
    }
}

fn read_until(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    terminator: char,
) -> Option<String> {
    let mut out = String::new();
    for (_, c) in chars.by_ref() {
        if c == terminator {
            return Some(out);
        }
        out.push(c);
    }
    None
}

fn parse_reference(reference: &str, pos: usize) -> Result<Part, String> {
    if reference.is_empty() {
        return Err(format!("empty group reference at position {pos}"));
    }
    if reference.chars().all(|c| c.is_ascii_digit()) {
        return reference
            .parse()
            .map(Part::Group)
            .map_err(|e| format!("bad group number '{reference}': {e}"));
    }
    let mut chars = reference.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_alphanumeric() || c == '_') {
        Ok(Part::Named(reference.to_string()))
    } else {
        Err(format!("bad group name '{reference}' at position {pos}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(pattern: &str, template: &str, input: &str) -> String {
        let regex = Regex::new(pattern).expect("pattern compiles");
        let template = ReplacementTemplate::parse(template).expect("template parses");
        regex.replace_all(input, &template).into_owned()
    }

    #[test]
    fn test_backslash_groups() {
        assert_eq!(
            expand(r"click\((\d+), (\d+)\)", r"move(\2, \1)", "click(10, 20)"),
            "move(20, 10)"
        );
    }

    #[test]
    fn test_g_syntax_and_braces() {
        assert_eq!(
            expand(r"(?P<key>\w+)=(\d+)", r"\g<key>: ${2} / \g<2>", "speed=5"),
            "speed: 5 / 5"
        );
    }

    #[test]
    fn test_dollar_is_literal() {
        assert_eq!(expand(r"cost", "$5 $1", "cost"), "$5 $1");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(expand("x", r"a\nb\\c\.d", "x"), "a\nb\\c\\.d");
    }

    #[test]
    fn test_bad_escape_rejected() {
        assert!(ReplacementTemplate::parse(r"\q").is_err());
        assert!(ReplacementTemplate::parse(r"\g<oops").is_err());
        assert!(ReplacementTemplate::parse("${1").is_err());
        assert!(ReplacementTemplate::parse("trailing\\").is_err());
    }

    #[test]
    fn test_missing_group_detected() {
        let regex = Regex::new(r"(a)").expect("pattern compiles");
        let template = ReplacementTemplate::parse(r"\2").expect("template parses");
        assert!(template.missing_group(&regex).is_some());

        let named = ReplacementTemplate::parse(r"\g<nope>").expect("template parses");
        assert!(named.missing_group(&regex).is_some());

        let fine = ReplacementTemplate::parse(r"\1\g<0>").expect("template parses");
        assert!(fine.missing_group(&regex).is_none());
    }

    #[test]
    fn test_non_participating_group_is_empty() {
        assert_eq!(expand(r"a(b)?", r"[\1]", "a"), "[]");
    }
}
