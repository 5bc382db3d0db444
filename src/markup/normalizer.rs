//! Markup normalizer
//!
//! Rewrites a module's raw entry markup into the normalized classed dialect:
//! every semantic element becomes a `<div class="normalized-markup
//! normalized-<kind>" ...>` wrapper with the attribute payloads a renderer
//! needs (chapter/verse numbers on section titles, sID/eID anchors). The
//! whole transformation is the fixed rule pipeline in [`super::rules`];
//! options are passed per call, never held as shared state.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::{COLLAPSE_RULE, INTRO_RULES, PUNCTUATION_RULES, TAG_RULES};

static LEXICON_KEY_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(">[^<]*</w>").expect("valid pattern"));

/// Per-call normalization options
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Module carries lexicon-key tagging; key text gets non-breaking spaces
    pub lexicon_keys: bool,

    /// Chapter and verse to stamp onto section titles, for renderers that
    /// anchor headings to positions
    pub section_title_context: Option<(u32, u32)>,
}

/// Run a raw verse entry through the normalization pipeline
pub fn normalize_verse(raw: &str, options: &NormalizeOptions) -> String {
    let mut text = raw.trim().to_string();

    // Section titles pick up their position attributes before the generic
    // title rule can claim them.
    if let Some((chapter, verse)) = options.section_title_context {
        text = text.replace(
            "<title",
            &format!(
                "<div class=\"normalized-markup normalized-section-title\" chapter=\"{chapter}\" verse=\"{verse}\""
            ),
        );
    }

    for rule in TAG_RULES.iter() {
        text = rule.apply(&text);
    }
    for rule in PUNCTUATION_RULES.iter() {
        text = rule.apply(&text);
    }
    text = COLLAPSE_RULE.apply(&text);

    if options.lexicon_keys {
        text = nbsp_in_lexicon_keys(&text);
    }

    text
}

/// Normalize a book introduction entry (smaller rule inventory, book-level
/// titles)
pub fn normalize_book_introduction(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    for rule in INTRO_RULES.iter() {
        text = rule.apply(&text);
    }
    text
}

/// Replace embedded spaces inside rendered lexicon-key text with `&nbsp;`
/// so a key token never reflows across whitespace. Only the text between a
/// key marker's `>` and its `</w>` close is touched.
fn nbsp_in_lexicon_keys(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut tail = 0;

    for found in LEXICON_KEY_TEXT.find_iter(text) {
        output.push_str(&text[tail..found.start()]);
        output.push_str(&found.as_str().replace(' ', "&nbsp;"));
        tail = found.end();
    }
    output.push_str(&text[tail..]);

    output
}

/// Equalize `<div` and `</div>` counts.
///
/// Best-effort repair for modules flagged with the unbalanced-closer quirk:
/// excess closers are dropped one at a time from the end, missing closers
/// are appended. Well-formedness of the interior is not guaranteed.
pub fn rebalance_divs(text: &str) -> String {
    let opens = text.matches("<div").count();
    let closes = text.matches("</div>").count();

    let mut text = text.to_string();

    if closes > opens {
        for _ in 0..(closes - opens) {
            if let Some(position) = text.rfind("</div>") {
                text.replace_range(position..position + "</div>".len(), "");
            }
        }
    } else {
        for _ in 0..(opens - closes) {
            text.push_str("</div>");
        }
    }

    text
}
