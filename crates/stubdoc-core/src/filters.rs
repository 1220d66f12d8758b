//! Noise filters applied to a raw page diff
//!
//! The published reference pages carry boilerplate that locally built pages
//! never have (version banners, install callouts, section headings), and
//! stub sources drift from upstream in predictable ways (parameter lists,
//! data assignments, re-ordered entries). Each filter removes one class of
//! expected difference; whatever survives the pipeline is the residue that
//! gets reported.

use std::collections::HashMap;

use crate::diff::{DiffLine, DiffTag};

/// Banner sentences the reference site injects above the page content.
pub const VERSION_BANNERS: &[&str] = &[
    "This is the v1.23.0 version of the MicroPython",
    "documentation. The latest",
    "development version of this page may be more current.",
    "This is the documentation for the latest development branch of",
    "MicroPython and may refer to features that are not available in released",
    "versions.",
    "If you are looking for the documentation for a specific release, use",
    "the drop-down menu on the left and select the desired version.",
];

/// Sentences of the install callout appended to modules staged from the
/// library collections. One sentence per collection, plus the shared frame.
pub const INSTALL_TIPS: &[&str] = &[
    "Tip",
    "This is a micropython module from the micropython-lib repository.",
    "This is a python-stdlib module from the micropython-lib repository.",
    "This is a python-ecosys module from the micropython-lib repository.",
    "It can be installed to a MicroPython board using:",
];

/// Prefix of the rendered install command line.
pub const INSTALL_COMMAND_PREFIX: &str = "mpremote mip install";

/// Prefix of the rendered source attribution line.
pub const SOURCE_LINK_PREFIX: &str =
    "Source: https://github.com/micropython/micropython-lib/tree/master";

/// Section headings present in the reference template but not in the
/// generated one.
pub const TEMPLATE_HEADINGS: &[&str] = &[
    "Functions",
    "Classes",
    "Constants",
    "Exceptions",
    "Methods",
    "Constructor",
];

/// Title information taken from the first heading line of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTitle {
    /// Module name, the part before the separator (may be empty).
    pub module_name: String,
    /// Descriptive title, the part after the separator (may be empty).
    pub title: String,
    /// The full heading line the parts were taken from.
    pub line: String,
}

/// Find the page title in a sequence of extracted lines.
///
/// The title is the first non-empty line that is not indented, in the form
/// `name – description` (en dash or hyphen separator). Returns `None` when
/// no such line exists; when the line has no separator, both parts are
/// empty and only `line` is set.
#[must_use]
pub fn find_title(lines: &[String]) -> Option<PageTitle> {
    let line = lines
        .iter()
        .find(|l| !l.is_empty() && !l.starts_with(' '))?;

    for sep in ["\u{2013}", "-"] {
        if let Some((name, title)) = line.split_once(sep) {
            return Some(PageTitle {
                module_name: name.trim().to_string(),
                title: title.trim().to_string(),
                line: line.clone(),
            });
        }
    }
    Some(PageTitle {
        module_name: String::new(),
        title: String::new(),
        line: line.clone(),
    })
}

/// Run the full filter pipeline over a raw diff.
///
/// `local_lines` are the extracted lines of the local page, used to locate
/// the page title for the final restatement pass. Stage order is fixed.
#[must_use]
pub fn filter_page_diff(diff: Vec<DiffLine>, local_lines: &[String]) -> Vec<DiffLine> {
    let residue = drop_version_banners(diff);
    let residue = drop_install_tips(residue);
    let residue = drop_section_headings(residue);
    let residue = cancel_reordered_lines(residue);
    let residue = cancel_signature_pairs(residue);
    let residue = cancel_qualified_signature_pairs(residue);
    let residue = cancel_assignment_pairs(residue);
    let residue = drop_added_assignments(residue);
    drop_title_echo(residue, local_lines)
}

/// Drop unchanged lines, blank lines, and the version banner sentences.
#[must_use]
pub fn drop_version_banners(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    lines
        .into_iter()
        .filter(|line| {
            line.tag != DiffTag::Unchanged
                && !line.text.trim().is_empty()
                && !VERSION_BANNERS.contains(&line.text.trim())
        })
        .collect()
}

/// Drop the install callout the reference pages render for modules that
/// come from the library collections.
#[must_use]
pub fn drop_install_tips(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    lines
        .into_iter()
        .filter(|line| {
            !(INSTALL_TIPS.contains(&line.text.trim())
                || line.text.starts_with(INSTALL_COMMAND_PREFIX)
                || line.text.starts_with(SOURCE_LINK_PREFIX))
        })
        .collect()
}

/// Drop reference-side section headings that the generated template omits.
#[must_use]
pub fn drop_section_headings(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    lines
        .into_iter()
        .filter(|line| !(line.is_removed() && TEMPLATE_HEADINGS.contains(&line.text.as_str())))
        .collect()
}

/// Cancel pairs of lines with equal text and opposite markers.
///
/// A line that merely moved shows up once added and once removed; both
/// occurrences are dropped. Pairing is one-to-one by text: each line
/// cancels at most one opposite line, and unpaired duplicates survive.
#[must_use]
pub fn cancel_reordered_lines(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    let mut added: HashMap<&str, usize> = HashMap::new();
    let mut removed: HashMap<&str, usize> = HashMap::new();
    for line in &lines {
        match line.tag {
            DiffTag::Added => *added.entry(line.text.as_str()).or_insert(0) += 1,
            DiffTag::Removed => *removed.entry(line.text.as_str()).or_insert(0) += 1,
            DiffTag::Unchanged => {}
        }
    }

    let mut pairs: HashMap<String, usize> = HashMap::new();
    for (text, added_count) in &added {
        if let Some(removed_count) = removed.get(text) {
            pairs.insert((*text).to_string(), *added_count.min(removed_count));
        }
    }

    let mut added_budget = pairs.clone();
    let mut removed_budget = pairs;
    let mut result = Vec::with_capacity(lines.len());
    for line in lines {
        let budget = match line.tag {
            DiffTag::Added => added_budget.get_mut(&line.text),
            DiffTag::Removed => removed_budget.get_mut(&line.text),
            DiffTag::Unchanged => None,
        };
        match budget {
            Some(left) if *left > 0 => *left -= 1,
            _ => result.push(line),
        }
    }
    result
}

/// Cancel signature lines whose heads match across the two sides.
///
/// Stubs carry more precise parameter lists than the reference prose, so a
/// changed `name(params)` line is not a real difference when the opposite
/// side documents the same `name`, bare or with its own parameter list.
#[must_use]
pub fn cancel_signature_pairs(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    cancel_by_head(lines, false)
}

/// As [`cancel_signature_pairs`], with a `Class.`-style qualifier stripped
/// from the triggering line's head before matching. Only the triggering
/// side is dequalified; the opposite side is matched as written.
#[must_use]
pub fn cancel_qualified_signature_pairs(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    cancel_by_head(lines, true)
}

fn cancel_by_head(lines: Vec<DiffLine>, dequalify: bool) -> Vec<DiffLine> {
    let mut slots: Vec<Option<DiffLine>> = lines.into_iter().map(Some).collect();

    for current in 0..slots.len() {
        let (tag, head) = match &slots[current] {
            Some(line) if line.tag != DiffTag::Unchanged => match line.text.find('(') {
                Some(paren) => {
                    let mut head = line.text[..paren].trim_end();
                    if dequalify {
                        if let Some((_, rest)) = head.split_once('.') {
                            head = rest;
                        }
                    }
                    (line.tag, head.to_string())
                }
                None => continue,
            },
            _ => continue,
        };
        let want = if tag == DiffTag::Added {
            DiffTag::Removed
        } else {
            DiffTag::Added
        };

        let exact = position_of(&slots, |line| line.tag == want && line.text == head);
        let target = exact.or_else(|| {
            let prefix = format!("{head}(");
            position_of(&slots, |line| {
                line.tag == want && line.text.starts_with(&prefix)
            })
        });
        if let Some(found) = target {
            slots[current] = None;
            slots[found] = None;
        }
    }
    slots.into_iter().flatten().collect()
}

/// Cancel an added `lhs = rhs` line against a removed bare `lhs` line.
///
/// The reference lists constants by name only; the stub shows the value.
/// First matching removed line wins; each pair cancels exactly once.
#[must_use]
pub fn cancel_assignment_pairs(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    let mut slots: Vec<Option<DiffLine>> = lines.into_iter().map(Some).collect();

    for current in 0..slots.len() {
        let lhs = match &slots[current] {
            Some(line) if line.is_added() => match line.text.find('=') {
                Some(eq) => line.text[..eq].trim_end().to_string(),
                None => continue,
            },
            _ => continue,
        };
        let target = position_of(&slots, |line| line.is_removed() && line.text == lhs);
        if let Some(found) = target {
            slots[current] = None;
            slots[found] = None;
        }
    }
    slots.into_iter().flatten().collect()
}

/// Drop remaining added lines containing `=`.
///
/// Data declarations present only in the stub are not regressions.
#[must_use]
pub fn drop_added_assignments(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    lines
        .into_iter()
        .filter(|line| !(line.is_added() && line.text.contains('=')))
        .collect()
}

/// Remove an added line that restates the page title.
///
/// The generated pages repeat the descriptive title as their first
/// paragraph. Tries the capitalized sentence form first, then the raw
/// title; removes at most one line.
#[must_use]
pub fn drop_title_echo(lines: Vec<DiffLine>, local_lines: &[String]) -> Vec<DiffLine> {
    let Some(page_title) = find_title(local_lines) else {
        return lines;
    };
    if page_title.title.is_empty() {
        return lines;
    }

    let mut lines = lines;
    for candidate in [format!("{}.", capitalize(&page_title.title)), page_title.title] {
        if let Some(found) = lines
            .iter()
            .position(|line| line.is_added() && line.text == candidate)
        {
            lines.remove(found);
            break;
        }
    }
    lines
}

/// First char upper-cased, the rest lower-cased.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn position_of(slots: &[Option<DiffLine>], pred: impl Fn(&DiffLine) -> bool) -> Option<usize> {
    slots
        .iter()
        .position(|slot| slot.as_ref().is_some_and(&pred))
}
