//! Substitution rule tables
//!
//! The normalizer is an ordered pipeline of literal and regex substitutions,
//! not a parser. The ordering is load-bearing: tag-specific rewrites run
//! first, punctuation spacing runs after the div-class rewrites so attribute
//! values are never touched, and the self-closing collapse runs last. The
//! literal-vs-regex distinction per rule is deliberate and tuned against
//! real module output; do not "simplify" literals into patterns.

use once_cell::sync::Lazy;
use regex::Regex;

/// Class prefix carried by every normalized element
pub const CLASS_PREFIX: &str = "normalized-markup";

/// What to look for
#[derive(Debug)]
pub enum RulePattern {
    /// Exact substring, replaced everywhere
    Literal(&'static str),
    /// Regular expression, replaced everywhere
    Pattern(Regex),
}

/// One substitution step
#[derive(Debug)]
pub struct Rule {
    pub pattern: RulePattern,
    pub replacement: &'static str,
}

impl Rule {
    fn literal(pattern: &'static str, replacement: &'static str) -> Self {
        Self {
            pattern: RulePattern::Literal(pattern),
            replacement,
        }
    }

    fn regex(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: RulePattern::Pattern(Regex::new(pattern).expect("valid rule pattern")),
            replacement,
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match &self.pattern {
            RulePattern::Literal(pattern) => text.replace(pattern, self.replacement),
            RulePattern::Pattern(pattern) => pattern.replace_all(text, self.replacement).to_string(),
        }
    }
}

/// Tag-specific rewrites and strips, in pipeline order
pub static TAG_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // Stray markers some modules leave at the head of an entry.
        Rule::regex("<H[^>]*> ", ""),
        Rule::regex("<chapter[^>]*/>", ""),
        Rule::literal("<lb type=\"x-begin-paragraph\"/>", ""),
        Rule::literal(
            "<lb type=\"x-end-paragraph\"/>",
            "&nbsp;<div class=\"normalized-markup normalized-paragraph-end\"><br/></div>",
        ),
        Rule::literal("<lb ", "<div class=\"normalized-markup normalized-lb\" "),
        Rule::literal("<l ", "<div class=\"normalized-markup normalized-l\" "),
        Rule::literal("</l>", "</div>"),
        Rule::literal("<lg ", "<div class=\"normalized-markup normalized-lg\" "),
        Rule::literal("</lg>", "</div>"),
        Rule::literal("<note", "<div class=\"normalized-markup normalized-note\" "),
        Rule::literal("</note>", "</div>"),
        Rule::literal("<head", "<div class=\"normalized-markup normalized-head\" "),
        Rule::literal("</head>", "</div>"),
        Rule::literal("<app", "<div class=\"normalized-markup normalized-app\" "),
        Rule::literal("</app>", "</div>"),
        Rule::literal("<rtxt type=\"omit\"/>", ""),
        Rule::literal(
            "<title",
            "<div class=\"normalized-markup normalized-section-title\"",
        ),
        Rule::literal("</title>", "</div>"),
        Rule::literal(
            "<div type=\"x-milestone\"",
            "<div class=\"normalized-markup normalized-x-milestone\"",
        ),
        Rule::literal(
            "<milestone",
            "<div class=\"normalized-markup normalized-milestone\"",
        ),
        // Some modules run line-break milestones straight into the next word.
        Rule::literal("x-br\"/>", "x-br\"/> "),
        Rule::literal(
            "<div sID=",
            "<div class=\"normalized-markup normalized-sid\" sID=",
        ),
        Rule::literal(
            "<div eID=",
            "<div class=\"normalized-markup normalized-eid\" eID=",
        ),
        Rule::literal(
            "<q marker=\"\" who=\"Jesus\">",
            "<div class=\"normalized-markup normalized-quote-jesus\"/>",
        ),
        Rule::literal("<q ", "&quot;<div class=\"normalized-markup normalized-quote\" "),
        Rule::literal("<divineName>", ""),
        Rule::literal("</divineName>", ""),
        Rule::literal("<w lemma=", "<w class="),
    ]
});

/// Sentence-final punctuation glued to a following tag; runs after the div
/// rewrites
pub static PUNCTUATION_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::literal(".<", ". <"),
        Rule::literal("?<", "? <"),
        Rule::literal("!<", "! <"),
        Rule::literal(",<", ", <"),
        Rule::literal(";<", "; <"),
        Rule::literal(":<", ": <"),
    ]
});

/// Collapse self-closing normalized divs into explicit open/close pairs;
/// must run after every tag-specific rewrite
pub static COLLAPSE_RULE: Lazy<Rule> = Lazy::new(|| {
    Rule::regex(
        "<div class=\"normalized-markup ([^\"]*)\"([^>]*)/>",
        "<div class=\"normalized-markup ${1}\"${2}></div>",
    )
});

/// Book-introduction rewrites; intro entries carry a smaller tag inventory
/// and their titles are book-level, not section-level
pub static INTRO_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::literal(
            "<title",
            "<div class=\"normalized-markup normalized-book-title\"",
        ),
        Rule::literal("</title>", "</div>"),
        Rule::literal("<note", "<div class=\"normalized-markup normalized-note\""),
        Rule::literal("</note>", "</div>"),
        Rule::literal("<head", "<div class=\"normalized-markup normalized-head\""),
        Rule::literal("</head>", "</div>"),
        Rule::regex(
            "<div type=\"chapter\" n=\"[0-9]\" id=\"[-A-Z0-9]{1,8}\">",
            "",
        ),
    ]
});
