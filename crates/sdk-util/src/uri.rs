use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::error::{Result, SdkUtilError};
use crate::types::{ABSENT_MARKER, NamedValues, ReplacementSet, Value, render_value};

static QUERY_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("query placeholder pattern is valid"));

static PLACEHOLDER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("placeholder name pattern is valid")
});

/// A `key={placeholder}` pair found in the query string of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySlot<'a> {
    pub key: &'a str,
    pub placeholder: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder<'a> {
    Index(usize),
    Name(&'a str),
}

/// Formats a URI path template, or returns `None` when there is no template.
pub fn format_uri_path(template: Option<&str>, values: &ReplacementSet) -> Result<Option<String>> {
    template
        .map(|template| format_path(template, values))
        .transpose()
}

pub fn format_path(template: &str, values: &ReplacementSet) -> Result<String> {
    let substituted = substitute(template, values)?;
    Ok(remove_null_parameters(&substituted))
}

/// Lists the placeholder-bearing query parameters of a template, left to right.
///
/// A parameter counts when its value contains a `{...}` token anywhere, so
/// `x={0}suffix` is a slot named after `0`.
pub fn query_slots(template: &str) -> Vec<QuerySlot<'_>> {
    let Some((_, query)) = template.split_once('?') else {
        return Vec::new();
    };
    if !query.contains("={") {
        return Vec::new();
    }

    query
        .split('&')
        .filter_map(|segment| {
            let [key, value] = split_fields(segment, '=')[..] else {
                return None;
            };
            let captures = QUERY_PLACEHOLDER.captures(value)?;
            let placeholder = captures.get(1)?.as_str().trim();
            Some(QuerySlot {
                key: trim_controls(key),
                placeholder,
            })
        })
        .collect()
}

/// Converts a name/value mapping into the positional sequence for `template`.
///
/// Each query slot is looked up by its placeholder name first, then by its
/// query key. Slots with no mapping yield the absent marker.
pub fn derive_positional(template: &str, named: &NamedValues) -> Vec<Option<Value>> {
    query_slots(template)
        .iter()
        .map(|slot| lookup_slot(named, slot))
        .collect()
}

fn lookup_slot(named: &NamedValues, slot: &QuerySlot<'_>) -> Option<Value> {
    named
        .get(slot.placeholder)
        .or_else(|| named.get(slot.key))
        .cloned()
        .flatten()
}

/// Replaces the `{index}` and `{name}` placeholders of `template`.
///
/// Single quotes follow message-format rules: `''` is a literal quote and a
/// lone quote toggles a literal section in which braces are not special.
pub fn substitute(template: &str, values: &ReplacementSet) -> Result<String> {
    let resolver = Resolver::new(template, values);
    let mut output = String::with_capacity(template.len());
    let mut remaining = template;

    while let Some(special) = remaining.find(['\'', '{']) {
        output.push_str(&remaining[..special]);
        let rest = &remaining[special..];

        if let Some(after) = rest.strip_prefix("''") {
            output.push('\'');
            remaining = after;
            continue;
        }

        if let Some(after_quote) = rest.strip_prefix('\'') {
            remaining = take_quoted(after_quote, &mut output);
            continue;
        }

        let close = rest.find('}').ok_or(SdkUtilError::UnmatchedBrace {
            position: template.len() - rest.len(),
        })?;
        output.push_str(&resolver.resolve(&rest[1..close])?);
        remaining = &rest[close + 1..];
    }

    output.push_str(remaining);
    Ok(output)
}

fn take_quoted<'a>(input: &'a str, output: &mut String) -> &'a str {
    let mut remaining = input;
    while let Some(quote) = remaining.find('\'') {
        output.push_str(&remaining[..quote]);
        let rest = &remaining[quote + 1..];
        match rest.strip_prefix('\'') {
            Some(after) => {
                output.push('\'');
                remaining = after;
            }
            None => return rest,
        }
    }
    output.push_str(remaining);
    ""
}

struct Resolver<'a> {
    positional: Cow<'a, [Option<Value>]>,
    named: Option<&'a NamedValues>,
    slots: Vec<QuerySlot<'a>>,
}

impl<'a> Resolver<'a> {
    fn new(template: &'a str, values: &'a ReplacementSet) -> Self {
        match values {
            ReplacementSet::Positional(values) => Self {
                positional: Cow::Borrowed(values.as_slice()),
                named: None,
                slots: Vec::new(),
            },
            ReplacementSet::Named(named) => Self {
                positional: Cow::Owned(derive_positional(template, named)),
                named: Some(named),
                slots: query_slots(template),
            },
        }
    }

    fn resolve(&self, token: &str) -> Result<Cow<'_, str>> {
        match parse_placeholder(token)? {
            Placeholder::Index(index) => self
                .positional
                .get(index)
                .map(|value| render_value(value.as_ref()))
                .ok_or_else(|| SdkUtilError::MissingReplacement {
                    placeholder: token.to_string(),
                    supplied: self.positional.len(),
                }),
            Placeholder::Name(name) => self.resolve_name(name),
        }
    }

    fn resolve_name(&self, name: &str) -> Result<Cow<'_, str>> {
        let Some(named) = self.named else {
            return Err(SdkUtilError::NamedPlaceholder {
                name: name.to_string(),
            });
        };

        if let Some(value) = named.get(name) {
            return Ok(render_value(value.as_ref()));
        }

        self.slots
            .iter()
            .find(|slot| slot.placeholder == name)
            .map(|slot| match lookup_slot(named, slot) {
                Some(value) => Cow::Owned(value.to_string()),
                None => Cow::Borrowed(ABSENT_MARKER),
            })
            .ok_or_else(|| SdkUtilError::MissingReplacement {
                placeholder: name.to_string(),
                supplied: named.len(),
            })
    }
}

fn parse_placeholder(token: &str) -> Result<Placeholder<'_>> {
    let trimmed = token.trim();
    let invalid = || SdkUtilError::InvalidPlaceholder {
        placeholder: token.to_string(),
    };

    if !trimmed.is_empty() && trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return trimmed
            .parse()
            .map(Placeholder::Index)
            .map_err(|_| invalid());
    }

    if PLACEHOLDER_NAME.is_match(trimmed) {
        Ok(Placeholder::Name(trimmed))
    } else {
        Err(invalid())
    }
}

/// Drops query parameters that are malformed or whose value reads `null`.
///
/// Only the first `?` separates the path from the query. The delimiter is
/// kept even when no parameter survives.
pub fn remove_null_parameters(formatted: &str) -> String {
    let Some((path, query)) = formatted.split_once('?') else {
        return formatted.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|segment| keeps_parameter(segment))
        .collect();

    format!("{}?{}", trim_controls(path), kept.join("&"))
}

fn keeps_parameter(segment: &str) -> bool {
    match split_fields(segment, '=')[..] {
        [_, value] => !trim_controls(value).eq_ignore_ascii_case(ABSENT_MARKER),
        _ => false,
    }
}

// Strips every character up to and including U+0020 from both ends.
fn trim_controls(text: &str) -> &str {
    text.trim_matches(|character: char| character <= ' ')
}

// Trailing empty fields are discarded, so "x=" has a single field.
fn split_fields(text: &str, separator: char) -> Vec<&str> {
    let mut fields: Vec<&str> = text.split(separator).collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}
