//! Prompt text nodes.
//!
//! - `SimplePromptCombiner` -> [`combine_prompts`]
//! - `KeywordPromptComposer` -> [`compose_keyword`]
//! - `EnhancedKeywordPromptComposer` -> [`compose_enhanced`]
//! - `MultiFileKeywordPromptComposer` -> [`compose_multi`]
//! - `PipemindMultilineTextInput` -> [`multiline_text`]
//! - `PipemindShowTextFind` -> [`find_in_text`]
//!
//! ## Dynamic prompts
//!
//! `{a|b|c}` is replaced by one of its trimmed options.
//! `{N$$sep$$a|b|c}` is replaced by `N` distinct options joined with `sep`
//! (taken verbatim, so `{2$$ and $$x|y}` gives `"x and y"`); when fewer than
//! `N` options exist the group falls back to a single choice. Only innermost
//! groups are expanded: `{a{b|c}d}` keeps its outer braces.

use pipeline::{Delimiter, Seed};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Input slots on the combiner node.
pub const PROMPT_SLOTS: usize = 5;

/// Keyword data slots on the multi-source composer node.
pub const KEYWORD_SLOTS: usize = 5;

// ---------------------------------------------------------------------------
// Combiner
// ---------------------------------------------------------------------------

/// Trims each prompt, drops the blank ones and joins the rest.
pub fn combine_prompts(prompts: &[&str], delimiter: Delimiter) -> String {
    prompts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(delimiter.separator())
}

// ---------------------------------------------------------------------------
// Dynamic prompts
// ---------------------------------------------------------------------------

/// Builds the generator for one call: seeded when `seed` is given, from
/// entropy otherwise.
pub fn prompt_rng(seed: Option<Seed>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.as_u64()),
        None => StdRng::from_entropy(),
    }
}

/// Expands every innermost `{...}` group of `text`.
pub fn expand_dynamic_prompts<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut out = String::with_capacity(text.len());
    let mut emitted = 0;
    let mut open: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match c {
            '{' => open = Some(i),
            '}' => {
                if let Some(start) = open.take() {
                    let group = &text[start + 1..i];
                    if group.is_empty() {
                        continue;
                    }
                    out.push_str(&text[emitted..start]);
                    out.push_str(&expand_group(group, rng));
                    emitted = i + 1;
                }
            }
            _ => {}
        }
    }
    out.push_str(&text[emitted..]);
    out
}

fn expand_group<R: Rng + ?Sized>(group: &str, rng: &mut R) -> String {
    if let Some((count, separator, options)) = parse_multi_pick(group) {
        let options: Vec<&str> = options.split('|').map(str::trim).collect();
        if options.len() >= count {
            return options
                .choose_multiple(rng, count)
                .copied()
                .collect::<Vec<_>>()
                .join(separator);
        }
    }
    let options: Vec<&str> = group.split('|').map(str::trim).collect();
    options.choose(rng).copied().unwrap_or_default().to_string()
}

/// Splits `N$$sep$$options` into its parts.
fn parse_multi_pick(group: &str) -> Option<(usize, &str, &str)> {
    let (count, rest) = group.split_once("$$")?;
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (separator, options) = rest.split_once("$$")?;
    if separator.is_empty() || options.is_empty() {
        return None;
    }
    Some((count.parse().ok()?, separator, options))
}

// ---------------------------------------------------------------------------
// Keyword composers
// ---------------------------------------------------------------------------

/// Splits `key=value` on the first `=`, trimming both sides.
fn split_keyword(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim().to_string(), value.trim().to_string()))
}

/// Replaces `<key>` in `template` with the value of a single `key=value`
/// keyword. A keyword without `=` leaves the template unchanged.
pub fn compose_keyword(template: &str, keyword: &str) -> String {
    match split_keyword(keyword) {
        Some((key, value)) => template.replace(&format!("<{key}>"), &value),
        None => template.to_string(),
    }
}

/// Expands dynamic prompts in `template`, then applies one keyword.
pub fn compose_enhanced(template: &str, keyword: &str, seed: Option<Seed>) -> String {
    let expanded = expand_dynamic_prompts(template, &mut prompt_rng(seed));
    compose_keyword(&expanded, keyword)
}

/// Parses multi-line keyword data; blank lines, lines without `=` and empty
/// keys are skipped. A repeated key keeps its first position and last value.
pub fn parse_keyword_data(data: &str) -> Vec<(String, String)> {
    let mut keywords: Vec<(String, String)> = Vec::new();
    for line in data.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((key, value)) = split_keyword(line) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        upsert(&mut keywords, key, value);
    }
    keywords
}

fn upsert(keywords: &mut Vec<(String, String)>, key: String, value: String) {
    match keywords.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => keywords.push((key, value)),
    }
}

/// Expands dynamic prompts, then replaces placeholders using every keyword
/// source; later sources win on conflicting keys.
pub fn compose_multi(template: &str, sources: &[&str], seed: Option<Seed>) -> String {
    let mut merged = Vec::new();
    for source in sources {
        for (key, value) in parse_keyword_data(source) {
            upsert(&mut merged, key, value);
        }
    }
    let mut composed = expand_dynamic_prompts(template, &mut prompt_rng(seed));
    for (key, value) in &merged {
        composed = composed.replace(&format!("<{key}>"), value);
    }
    composed
}

// ---------------------------------------------------------------------------
// Multiline text
// ---------------------------------------------------------------------------

/// Returns `text`, expanding dynamic prompts with fresh entropy when enabled.
pub fn multiline_text(text: &str, enable_dynamic: bool) -> String {
    if enable_dynamic {
        expand_dynamic_prompts(text, &mut prompt_rng(None))
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Show text / find
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
}

/// Outputs of the show-text/find node: the text passed through, and a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindResult {
    pub text: String,
    pub search_results: String,
}

/// Searches the non-blank lines of `text` for `term`.
///
/// For `key=value` lines only the value (trailing commas removed) is compared.
/// Without `whole_word` the value must equal the term; with it, any
/// whitespace-separated word of the value may.
pub fn find_in_text(text: &str, term: &str, options: FindOptions) -> FindResult {
    let term = term.trim();
    let search_results = if term.is_empty() {
        "No search term provided".to_string()
    } else {
        let fold = |s: &str| {
            if options.case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };
        let wanted = fold(term);
        let matches: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|&line| {
                let value = match line.split('=').nth(1) {
                    Some(value) => value.trim_end_matches(',').trim(),
                    None => line,
                };
                let value = fold(value);
                if options.whole_word {
                    value.split_whitespace().any(|w| w == wanted)
                } else {
                    value == wanted
                }
            })
            .collect();
        if matches.is_empty() {
            "No matches found".to_string()
        } else {
            format!("Found {} matches:\n{}", matches.len(), matches.join("\n"))
        }
    };
    FindResult {
        text: text.to_string(),
        search_results,
    }
}
