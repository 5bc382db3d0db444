//! Strong's lexicon entries
//!
//! Dictionary-side counterpart of the lexicon-key tagging in verse text: a
//! Strong's key (`H430`, `G2316`) is resolved against a dictionary module
//! and its raw entry parsed into transcription, phonetic transcription,
//! definition and cross-references. Two raw-entry generations exist in
//! published dictionaries; the module's version string selects the parser.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::module::traits::DictionaryDriver;

/// Highest Hebrew Strong's number
pub const HEBREW_KEY_MAX: u32 = 8674;

/// Highest Greek Strong's number
pub const GREEK_KEY_MAX: u32 = 5624;

/// Whether a key addresses an existing dictionary entry: `H` or `G` prefix
/// followed by a number inside the dictionary's key space
pub fn is_valid_strongs_key(key: &str) -> bool {
    if key.len() < 2 {
        return false;
    }

    let max = match key.as_bytes()[0] {
        b'H' => HEBREW_KEY_MAX,
        b'G' => GREEK_KEY_MAX,
        _ => return false,
    };

    match key[1..].parse::<u32>() {
        Ok(number) => number > 0 && number <= max,
        Err(_) => false,
    }
}

/// A cross-reference line inside a dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongsReference {
    /// The reference line as printed, e.g. `"see GREEK for 2767"`
    pub text: String,

    /// Parsed key (`G2767`), `None` when the line does not parse or the key
    /// falls outside the dictionary's key space
    pub key: Option<String>,
}

impl StrongsReference {
    /// Parse a reference line. The language literal's first letter becomes
    /// the key prefix and the number loses its leading zeros.
    pub fn parse(text: &str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let key = if tokens.len() == 4 {
            tokens[1]
                .chars()
                .next()
                .zip(tokens[3].parse::<u32>().ok())
                .map(|(lang, number)| format!("{lang}{number}"))
                .filter(|key| is_valid_strongs_key(key))
        } else {
            None
        };

        Self {
            text: text.to_string(),
            key,
        }
    }
}

/// One parsed dictionary entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongsEntry {
    /// The key the entry was requested under, e.g. `H430`
    pub key: String,

    /// Raw entry text as stored in the module
    pub raw_entry: String,

    pub transcription: String,
    pub phonetic_transcription: String,
    pub definition: String,

    /// Deduplicated cross-references carrying a valid key
    pub references: Vec<StrongsReference>,
}

/// Look up and parse a dictionary entry.
///
/// The dictionary is keyed by the bare number string, so the prefix letter
/// is cut off for the lookup. An absent key yields an entry with empty text
/// fields; only a key outside the dictionary's key space is an error.
pub fn strongs_entry(driver: &mut dyn DictionaryDriver, key: &str) -> Result<StrongsEntry> {
    if !is_valid_strongs_key(key) {
        return Err(EngineError::InvalidLexiconKey(key.to_string()));
    }

    let raw = driver.raw_entry(&key[1..]);

    // Version 1 modules store plain text, version 2 markup elements.
    let entry = if driver.version().starts_with('1') {
        parse_version1(key, &raw)
    } else {
        parse_version2(key, &raw)
    };

    Ok(entry)
}

/// Plain-text generation: first line is `NNNN  transcription  phonetic`,
/// then blank lines, then definition lines and `see ...` reference lines.
fn parse_version1(key: &str, raw: &str) -> StrongsEntry {
    let mut raw = raw.to_string();

    // Some entries run the first line straight into the definition with a
    // comma instead of a line break (G2147).
    if let Some(comma) = raw.find(',') {
        if comma < raw.find('\n').unwrap_or(usize::MAX) {
            raw.replace_range(comma..=comma, "\n");
        }
    }

    let mut entry = StrongsEntry {
        key: key.to_string(),
        raw_entry: raw.clone(),
        ..Default::default()
    };

    let mut lines = raw.lines();
    let Some(first_line) = lines.next() else {
        return entry;
    };

    let columns: Vec<&str> = first_line.split_whitespace().collect();
    if columns.len() >= 2 {
        entry.transcription = columns[1].to_string();
    }
    if columns.len() >= 3 {
        entry.phonetic_transcription = columns[2].to_string();
    }

    let body: Vec<&str> = lines.skip_while(|line| line.trim().is_empty()).collect();
    let (definition, references) = collect_definition_and_references(&body);
    entry.definition = definition;
    entry.references = references;

    entry
}

/// Markup generation: transcription and phonetic transcription live in
/// `<orth>`/`<pron>` elements on the first line, the definition inside
/// `<def>` up to the first `<lb/>`, references after it.
fn parse_version2(key: &str, raw: &str) -> StrongsEntry {
    let mut entry = StrongsEntry {
        key: key.to_string(),
        raw_entry: raw.to_string(),
        ..Default::default()
    };

    let Some(first_line) = raw.lines().next() else {
        return entry;
    };

    entry.transcription =
        element_content(first_line, "<orth rend=\"bold\" type=\"trans\">", "</orth>");
    entry.phonetic_transcription = element_content(first_line, "<pron rend=\"italic\">{", "}");

    let definition_element = element_content(raw, "<def>", "</def>");

    match definition_element.split_once("<lb/>") {
        Some((definition, references)) => {
            entry.definition = definition.trim().to_string();
            let lines: Vec<&str> = references.trim().split("<lb/> ").collect();
            let (_, references) = collect_definition_and_references(&lines);
            entry.references = references;
        }
        None => {
            entry.definition = definition_element.trim().to_string();
        }
    }

    entry
}

/// Split body lines into definition text and `see ...` reference lines.
///
/// Reference lines are deduplicated by their printed text (entries like
/// H3069 repeat a reference) and only references with a valid key are kept.
fn collect_definition_and_references(lines: &[&str]) -> (String, Vec<StrongsReference>) {
    let mut definition_lines = Vec::new();
    let mut seen = Vec::new();
    let mut references = Vec::new();

    for line in lines {
        if line.starts_with("see ") || line.starts_with(" see ") {
            let line = line.trim();
            if seen.contains(&line) {
                continue;
            }
            seen.push(line);

            let reference = StrongsReference::parse(line);
            if reference.key.is_some() {
                references.push(reference);
            }
        } else {
            definition_lines.push(*line);
        }
    }

    let definition = definition_lines
        .join("\n")
        .replace("\n\n", "\n")
        .trim()
        .to_string();

    (definition, references)
}

fn element_content(text: &str, start_tag: &str, end_tag: &str) -> String {
    let Some(start) = text.find(start_tag) else {
        return String::new();
    };
    let content = &text[start + start_tag.len()..];
    match content.find(end_tag) {
        Some(end) => content[..end].to_string(),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::memory::MemoryDictionary;

    #[test]
    fn test_key_space_bounds() {
        assert!(is_valid_strongs_key("H1"));
        assert!(is_valid_strongs_key("H8674"));
        assert!(!is_valid_strongs_key("H8675"));
        assert!(is_valid_strongs_key("G5624"));
        assert!(!is_valid_strongs_key("G5625"));
        for bad in ["", "H", "H0", "X123", "G12a", "h430"] {
            assert!(!is_valid_strongs_key(bad), "expected rejection for {bad:?}");
        }
    }

    #[test]
    fn test_reference_key_parsing() {
        let reference = StrongsReference::parse("see GREEK for 2767");
        assert_eq!(reference.key.as_deref(), Some("G2767"));
        assert_eq!(reference.text, "see GREEK for 2767");

        // Leading zeros vanish in the parsed key.
        let reference = StrongsReference::parse("see HEBREW for 0433");
        assert_eq!(reference.key.as_deref(), Some("H433"));

        assert_eq!(StrongsReference::parse("see also").key, None);
        assert_eq!(StrongsReference::parse("see GREEK for 9999").key, None);
    }

    #[test]
    fn test_version1_entry() {
        let raw = "430  'elohiym  el-o-heem'\n\n gods in the ordinary sense; but\n \
                   specifically used of the supreme God\n see HEBREW for 0410\n \
                   see HEBREW for 0410";
        let entry = parse_version1("H430", raw);

        assert_eq!(entry.key, "H430");
        assert_eq!(entry.transcription, "'elohiym");
        assert_eq!(entry.phonetic_transcription, "el-o-heem'");
        assert!(entry.definition.starts_with("gods in the ordinary sense"));
        assert!(!entry.definition.contains("see HEBREW"));
        // The duplicated reference collapses to one.
        assert_eq!(entry.references.len(), 1);
        assert_eq!(entry.references[0].key.as_deref(), Some("H410"));
    }

    #[test]
    fn test_version1_comma_run_on_first_line() {
        // Entries like G2147 run the definition into the first line behind
        // a comma instead of a line break.
        let raw = "2147  heurisko  hyoo-ris'-ko, a prolonged form of a primary word\n\
                   see GREEK for 2240";
        let entry = parse_version1("G2147", raw);

        assert_eq!(entry.transcription, "heurisko");
        assert_eq!(entry.phonetic_transcription, "hyoo-ris'-ko");
        assert_eq!(entry.definition, "a prolonged form of a primary word");
        assert_eq!(entry.references[0].key.as_deref(), Some("G2240"));
    }

    #[test]
    fn test_version1_empty_raw_entry() {
        let entry = parse_version1("H431", "");
        assert!(entry.transcription.is_empty());
        assert!(entry.definition.is_empty());
        assert!(entry.references.is_empty());
    }

    #[test]
    fn test_version2_entry() {
        let raw = "<entryFree><orth rend=\"bold\" type=\"trans\">elohiym</orth> \
                   <pron rend=\"italic\">{el-o-heem'}</pron> \
                   <def>gods in the ordinary sense <lb/> \
                   see HEBREW for 410 <lb/> see HEBREW for 433</def></entryFree>";
        let entry = parse_version2("H430", raw);

        assert_eq!(entry.transcription, "elohiym");
        assert_eq!(entry.phonetic_transcription, "el-o-heem'");
        assert_eq!(entry.definition, "gods in the ordinary sense");
        let keys: Vec<&str> = entry
            .references
            .iter()
            .filter_map(|r| r.key.as_deref())
            .collect();
        assert_eq!(keys, vec!["H410", "H433"]);
    }

    #[test]
    fn test_version2_entry_without_references() {
        let raw = "<orth rend=\"bold\" type=\"trans\">abba</orth> \
                   <pron rend=\"italic\">{ab-bah'}</pron>\n<def>father</def>";
        let entry = parse_version2("G5", raw);
        assert_eq!(entry.definition, "father");
        assert!(entry.references.is_empty());
    }

    #[test]
    fn test_lookup_strips_key_prefix_and_selects_parser() {
        let dictionary = MemoryDictionary::builder("StrongsHebrew", "1.5")
            .entry("430", "430  'elohiym  el-o-heem'\n\n gods in the ordinary sense")
            .build();
        let mut driver = dictionary.into_driver();

        let entry = strongs_entry(driver.as_mut(), "H430").unwrap();
        assert_eq!(entry.key, "H430");
        assert_eq!(entry.transcription, "'elohiym");
    }

    #[test]
    fn test_out_of_range_key_is_an_error() {
        let mut driver = MemoryDictionary::builder("StrongsHebrew", "1.5")
            .build()
            .into_driver();
        assert!(matches!(
            strongs_entry(driver.as_mut(), "H9999"),
            Err(EngineError::InvalidLexiconKey(_))
        ));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = StrongsEntry {
            key: "H430".to_string(),
            phonetic_transcription: "el-o-heem'".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["phoneticTranscription"], "el-o-heem'");
        assert_eq!(json["rawEntry"], "");
    }
}
