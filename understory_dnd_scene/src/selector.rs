// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal selector matching.
//!
//! Supports comma separated groups of compound selectors built from a type
//! selector (`div`, `*`), classes (`.card`), ids (`#main`), and attribute
//! selectors (`[draggable]`, `[type=file]`, `[type="file"]`).
//! Combinators and pseudo-classes are not supported; a selector using them
//! never matches.

use alloc::string::String;

/// The subset of an element a selector looks at.
pub(crate) struct Subject<'a> {
    pub(crate) tag: &'a str,
    pub(crate) classes: &'a [String],
    pub(crate) attributes: &'a [(String, String)],
}

impl Subject<'_> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Returns true if `subject` matches any group of `selector`.
pub(crate) fn matches(subject: &Subject<'_>, selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .any(|group| matches_compound(subject, group))
}

fn matches_compound(subject: &Subject<'_>, compound: &str) -> bool {
    let bytes = compound.as_bytes();
    let mut i = 0;
    let mut matched_any = false;
    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                let end = ident_end(bytes, i + 1);
                let class = &compound[i + 1..end];
                if class.is_empty() || !subject.classes.iter().any(|c| c == class) {
                    return false;
                }
                i = end;
            }
            b'#' => {
                let end = ident_end(bytes, i + 1);
                let id = &compound[i + 1..end];
                if id.is_empty() || subject.attribute("id") != Some(id) {
                    return false;
                }
                i = end;
            }
            b'[' => {
                let Some(close) = compound[i..].find(']') else {
                    return false;
                };
                if !matches_attribute(subject, &compound[i + 1..i + close]) {
                    return false;
                }
                i += close + 1;
            }
            b'*' if i == 0 => i += 1,
            _ if i == 0 => {
                let end = ident_end(bytes, 0);
                if end == 0 || !subject.tag.eq_ignore_ascii_case(&compound[..end]) {
                    return false;
                }
                i = end;
            }
            // Combinators, pseudo-classes and anything else we do not model.
            _ => return false,
        }
        matched_any = true;
    }
    matched_any
}

fn matches_attribute(subject: &Subject<'_>, body: &str) -> bool {
    match body.split_once('=') {
        None => subject.attribute(body.trim()).is_some(),
        Some((name, value)) => {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            subject.attribute(name.trim()) == Some(value)
        }
    }
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len()
        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'-' || bytes[end] == b'_')
    {
        end += 1;
    }
    end
}
