//! Text toolbox: counting and whole-text transformations.
//!
//! Lengths count Unicode scalar values, not UTF-16 units.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextOperation {
    Reverse,
    Capitalize,
    Alternating,
    RemoveSpaces,
    AddLineBreaks,
    Slugify,
    Uppercase,
    Lowercase,
    Bold,
}

/// How `Bold` marks up text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoldStyle {
    #[default]
    Markdown,
    Html,
    /// Mathematical sans-serif bold code points, for editors without markup (e.g. LinkedIn)
    Unicode,
}

pub fn apply(text: &str, operation: TextOperation, bold_style: BoldStyle) -> String {
    match operation {
        TextOperation::Reverse => reverse(text),
        TextOperation::Capitalize => capitalize_words(text),
        TextOperation::Alternating => alternating_case(text),
        TextOperation::RemoveSpaces => remove_whitespace(text),
        TextOperation::AddLineBreaks => add_line_breaks(text),
        TextOperation::Slugify => slugify(text),
        TextOperation::Uppercase => text.to_uppercase(),
        TextOperation::Lowercase => text.to_lowercase(),
        TextOperation::Bold => wrap_bold(text, bold_style),
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Runs of `.`, `!`, `?` end a sentence; blank fragments are not counted
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

pub fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}

/// Upper-case the first letter of each space-separated word, lower-case the rest
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn alternating_case(text: &str) -> String {
    text.chars()
        .enumerate()
        .flat_map(|(i, ch)| {
            if i % 2 == 0 {
                ch.to_lowercase().collect::<Vec<_>>()
            } else {
                ch.to_uppercase().collect::<Vec<_>>()
            }
        })
        .collect()
}

pub fn remove_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Put every sentence on its own paragraph
pub fn add_line_breaks(text: &str) -> String {
    let mut broken = String::with_capacity(text.len() + text.len() / 8);
    let mut after_terminator = false;

    for ch in text.chars() {
        if after_terminator && ch.is_whitespace() {
            continue;
        }
        after_terminator = false;
        broken.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            broken.push_str("\n\n");
            after_terminator = true;
        }
    }

    broken
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Lower-case, drop everything but ASCII word characters, whitespace and `-`, then dash-join
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_space = false;
    for ch in kept.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(ch);
            in_space = false;
        }
    }
    slug
}

pub fn wrap_bold(text: &str, style: BoldStyle) -> String {
    match style {
        BoldStyle::Markdown => format!("**{}**", text),
        BoldStyle::Html => format!("<b>{}</b>", text),
        BoldStyle::Unicode => unicode_bold(text),
    }
}

/// Map ASCII letters and digits to Mathematical Sans-Serif Bold
pub fn unicode_bold(text: &str) -> String {
    text.chars()
        .map(|ch| {
            let mapped = match ch {
                'a'..='z' => char::from_u32(0x1D5EE + (ch as u32 - 'a' as u32)),
                'A'..='Z' => char::from_u32(0x1D5D4 + (ch as u32 - 'A' as u32)),
                '0'..='9' => char::from_u32(0x1D7EC + (ch as u32 - '0' as u32)),
                _ => None,
            };
            mapped.unwrap_or(ch)
        })
        .collect()
}
