//! # Text Rules
//!
//! Pure string predicates and extractors shared by the manifest validator and
//! the builders: ASCII encodability, trailing whitespace, data-model and
//! sourcetype indicators in searches, and extraction of the macros, lookups
//! and data models a search refers to.

/// Substrings whose presence in a search means it reads from a data model.
pub const DATA_MODEL_INDICATORS: [&str; 2] = ["tstats", "datamodel"];

/// Substring whose presence in a search means it filters on a sourcetype.
pub const SOURCETYPE_INDICATOR: &str = "sourcetype";

/// Search commands whose first positional argument names a lookup.
const LOOKUP_COMMANDS: [&str; 3] = ["lookup", "inputlookup", "outputlookup"];

/// Whether `text` is representable in the single-byte ASCII encoding.
pub fn is_ascii(text: &str) -> bool {
    text.is_ascii()
}

/// Whether `text` ends with any whitespace character.
pub fn has_trailing_whitespace(text: &str) -> bool {
    text.ends_with(char::is_whitespace)
}

/// Whether the search reads from a data model.
pub fn references_data_model(search: &str) -> bool {
    DATA_MODEL_INDICATORS.iter().any(|i| search.contains(i))
}

/// Whether the search filters on a sourcetype.
pub fn references_sourcetype(search: &str) -> bool {
    search.contains(SOURCETYPE_INDICATOR)
}

/// Names of the backtick-quoted macros in a search, in order of first use.
///
/// Arguments are stripped: `` `ctime(firstTime)` `` yields `ctime`.
pub fn extract_macros(search: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for (i, segment) in search.split('`').enumerate() {
        if i % 2 == 0 || segment.is_empty() || segment.contains(char::is_whitespace) {
            continue;
        }
        let name = segment.split('(').next().unwrap_or(segment);
        if !name.is_empty() && !found.iter().any(|f| f == name) {
            found.push(name.to_string());
        }
    }
    found
}

/// Names of the lookups used by `lookup`, `inputlookup` and `outputlookup`
/// commands in a search, in order of first use.
pub fn extract_lookups(search: &str) -> Vec<String> {
    let tokens: Vec<&str> = search
        .split(|c: char| c.is_whitespace() || c == '|' || c == '[' || c == ']')
        .filter(|t| !t.is_empty())
        .collect();

    let mut found: Vec<String> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if !LOOKUP_COMMANDS.contains(token) {
            continue;
        }
        // Skip `key=value` options between the command and the table name.
        let target = tokens[i + 1..].iter().find(|t| !t.contains('='));
        if let Some(name) = target {
            let name = name.trim_matches(|c| c == '"' || c == '\'');
            if !name.is_empty() && !found.iter().any(|f| f == name) {
                found.push(name.to_string());
            }
        }
    }
    found
}

/// Data model names referenced as `datamodel=Name.Dataset`,
/// `datamodel:Name` or `from datamodel Name`, sorted and deduplicated.
pub fn extract_datamodels(search: &str) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    let mut rest = search;
    while let Some(pos) = rest.find("datamodel") {
        rest = &rest[pos + "datamodel".len()..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '=' || c == ':');
        let name: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() && !models.contains(&name) {
            models.push(name);
        }
    }
    models.sort();
    models
}

/// Lower-case, underscore-separated form of a content name, as used for
/// generated macro names.
pub fn snake_case(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '.' | '/' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
