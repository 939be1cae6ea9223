//! Robust JSON recovery for LLM text output.
//!
//! Chat models wrap otherwise-valid JSON in prose, markdown fences, and
//! trailing punctuation, and occasionally emit malformed JSON outright
//! (trailing commas, unquoted keys, smart quotes, comments). A single strict
//! parse has an unacceptable failure rate against that, so extraction runs a
//! fixed ladder of strategies and only gives up after all of them fail.
//!
//! The ladder, in order:
//! 1. already-structured values pass through `Extracted::from_value`
//! 2. narrow to a ``` / ```json fenced block containing a brace span
//! 3. narrow to the first `{` or `[` through the last matching closer
//! 4. strict parse
//! 5. repair pass (trailing commas, unquoted keys, smart quotes), then parse
//! 6. lenient parse (comments, single quotes, unquoted keys)
//! 7. log the raw text and return `Empty`
//!
//! `extract` never fails. Callers treat `Empty` as "no data", not as an
//! error, and continue with typed defaults.

use serde_json::{Map, Value};
use tracing::warn;

/// Result of JSON recovery. The tagged variants keep object/array confusion
/// visible at the call site instead of letting a stage that expects a list
/// silently receive a mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// No recoverable JSON substructure. Callers degrade to typed defaults.
    Empty,
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

/// Which rung of the ladder produced the result. Exposed so tests can pin
/// the strategy ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Strict,
    Repair,
    Lenient,
    GaveUp,
}

impl Extracted {
    /// Classifies an already-parsed value without reparsing. Scalars carry no
    /// usable structure and collapse to `Empty`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Extracted::Object(map),
            Value::Array(items) => Extracted::Array(items),
            _ => Extracted::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extracted::Empty)
    }

    /// Converts back to a `serde_json::Value`; `Empty` becomes `{}` so the
    /// sentinel stays a mapping on the wire.
    pub fn into_value(self) -> Value {
        match self {
            Extracted::Empty => Value::Object(Map::new()),
            Extracted::Object(map) => Value::Object(map),
            Extracted::Array(items) => Value::Array(items),
        }
    }

    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            Extracted::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            Extracted::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Recovers a JSON object or array from raw LLM text. Never fails.
pub fn extract(text: &str) -> Extracted {
    extract_traced(text).0
}

/// Same as [`extract`] but reports which strategy succeeded.
pub fn extract_traced(text: &str) -> (Extracted, Strategy) {
    let narrowed = narrow(text);

    if let Ok(value) = serde_json::from_str::<Value>(narrowed) {
        let extracted = Extracted::from_value(value);
        if !extracted.is_empty() {
            return (extracted, Strategy::Strict);
        }
    }

    let repaired = repair(narrowed);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        let extracted = Extracted::from_value(value);
        if !extracted.is_empty() {
            return (extracted, Strategy::Repair);
        }
    }

    // The lenient reader gets both spellings: the narrowed original, then
    // the repaired text (whose smart quotes are already ASCII).
    if let Some(value) = lenient_parse(narrowed).or_else(|| lenient_parse(&repaired)) {
        let extracted = Extracted::from_value(value);
        if !extracted.is_empty() {
            return (extracted, Strategy::Lenient);
        }
    }

    warn!("all JSON recovery strategies failed, raw text: {text}");
    (Extracted::Empty, Strategy::GaveUp)
}

// ────────────────────────────────────────────────────────────────────────────
// Narrowing
// ────────────────────────────────────────────────────────────────────────────

/// Narrows raw text to its most promising JSON span: a fenced block first,
/// then the outermost brace span inside whatever is left.
fn narrow(text: &str) -> &str {
    let candidate = fenced_block(text).unwrap_or(text);
    brace_span(candidate).unwrap_or(candidate)
}

/// Returns the interior of the first complete ``` / ```json fenced block that
/// contains a `{` or `[`. An unclosed fence is not a block.
fn fenced_block(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find("```") {
        let open = search_from + rel + 3;
        let after_tag = match text[open..].strip_prefix("json") {
            Some(_) => open + 4,
            None => open,
        };
        let close_rel = text[after_tag..].find("```")?;
        let inner = &text[after_tag..after_tag + close_rel];
        if inner.contains('{') || inner.contains('[') {
            return Some(inner);
        }
        search_from = after_tag + close_rel + 3;
    }
    None
}

/// Narrows to the span from the first `{` or `[` through the last matching
/// closer. Mirrors a greedy `(\{.*\}|\[.*\])` match without caring about
/// nesting; the parse ladder decides whether the span is usable. An opener
/// with no closer anywhere after it is skipped, so a stray `{` does not
/// hide a complete array later in the text.
fn brace_span(text: &str) -> Option<&str> {
    let mut best: Option<(usize, usize)> = None;
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
            if end > start && best.map_or(true, |(s, _)| start < s) {
                best = Some((start, end));
            }
        }
    }
    best.map(|(start, end)| &text[start..=end])
}

// ────────────────────────────────────────────────────────────────────────────
// Repair pass
// ────────────────────────────────────────────────────────────────────────────

/// Rewrites the most common LLM malformations into strict JSON: smart quotes
/// become ASCII quotes, trailing commas are dropped, and bare object keys are
/// quoted. String contents are left untouched.
fn repair(text: &str) -> String {
    let text: String = text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    // Container stack tracks whether a bare identifier sits in key position.
    let mut containers: Vec<char> = Vec::new();
    let mut expect_key = false;

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                // Copy the string body verbatim, honoring escapes. Single
                // quotes stay: strict parsing will still reject them and the
                // lenient reader takes over, but their contents must not be
                // mistaken for bare keys here.
                let quote = c;
                out.push(quote);
                while let Some(sc) = chars.next() {
                    out.push(sc);
                    match sc {
                        '\\' => {
                            if let Some(esc) = chars.next() {
                                out.push(esc);
                            }
                        }
                        _ if sc == quote => break,
                        _ => {}
                    }
                }
                if containers.last() == Some(&'{') && expect_key {
                    expect_key = false;
                }
            }
            '{' => {
                containers.push('{');
                expect_key = true;
                out.push(c);
            }
            '[' => {
                containers.push('[');
                expect_key = false;
                out.push(c);
            }
            '}' | ']' => {
                // Drop a trailing comma already emitted before this closer.
                trim_trailing_comma(&mut out);
                containers.pop();
                expect_key = false;
                out.push(c);
            }
            ',' => {
                out.push(c);
                expect_key = containers.last() == Some(&'{');
            }
            ':' => {
                out.push(c);
                expect_key = false;
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                // Bare word: quote it when it sits in key position.
                let mut word = String::new();
                word.push(c);
                while let Some(&nc) = chars.peek() {
                    if nc.is_alphanumeric() || nc == '_' || nc == '$' || nc == '-' {
                        word.push(nc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let in_key_position = containers.last() == Some(&'{') && expect_key;
                if in_key_position && !matches!(word.as_str(), "true" | "false" | "null") {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                    expect_key = false;
                } else {
                    out.push_str(&word);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Removes a comma that directly precedes the current write position,
/// ignoring whitespace.
fn trim_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        let tail: String = out[trimmed_len..].to_string();
        out.truncate(trimmed_len - 1);
        out.push_str(&tail);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient parser
// ────────────────────────────────────────────────────────────────────────────

/// Forgiving recursive-descent JSON reader. Tolerates `//` and `/* */`
/// comments, single-quoted strings, unquoted keys, bare-word values, and
/// trailing commas. Anything after the first complete value is ignored.
fn lenient_parse(text: &str) -> Option<Value> {
    let mut parser = Lenient {
        chars: text.chars().collect(),
        pos: 0,
    };
    parser.skip_trivia();
    let value = parser.parse_value()?;
    match value {
        Value::Object(_) | Value::Array(_) => Some(value),
        _ => None,
    }
}

struct Lenient {
    chars: Vec<char>,
    pos: usize,
}

impl Lenient {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Skips whitespace and both comment styles.
    fn skip_trivia(&mut self) {
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace()) {
                self.pos += 1;
            }
            match (self.peek(), self.chars.get(self.pos + 1).copied()) {
                (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    while self.pos < self.chars.len() {
                        if self.peek() == Some('*')
                            && self.chars.get(self.pos + 1).copied() == Some('/')
                        {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_trivia();
        match self.peek()? {
            '{' => self.parse_object(),
            '[' => self.parse_array(),
            '"' | '\'' => self.parse_string().map(Value::String),
            c if c == '-' || c == '+' || c.is_ascii_digit() => self.parse_number(),
            _ => self.parse_bare_word(),
        }
    }

    fn parse_object(&mut self) -> Option<Value> {
        self.bump(); // '{'
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match self.peek()? {
                '}' => {
                    self.bump();
                    return Some(Value::Object(map));
                }
                ',' => {
                    self.bump();
                }
                _ => {
                    let key = match self.peek()? {
                        '"' | '\'' => self.parse_string()?,
                        _ => self.parse_identifier()?,
                    };
                    self.skip_trivia();
                    if self.peek() != Some(':') {
                        return None;
                    }
                    self.bump();
                    let value = self.parse_value()?;
                    map.insert(key, value);
                }
            }
        }
    }

    fn parse_array(&mut self) -> Option<Value> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek()? {
                ']' => {
                    self.bump();
                    return Some(Value::Array(items));
                }
                ',' => {
                    self.bump();
                }
                _ => items.push(self.parse_value()?),
            }
        }
    }

    /// Reads a single- or double-quoted string with the standard escapes.
    fn parse_string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut s = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(s),
                '\\' => match self.bump()? {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    'b' => s.push('\u{0008}'),
                    'f' => s.push('\u{000C}'),
                    'u' => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            code = code * 16 + self.bump()?.to_digit(16)?;
                        }
                        s.push(char::from_u32(code)?);
                    }
                    other => s.push(other),
                },
                c => s.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> Option<Value> {
        let mut repr = String::new();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || "+-.eE".contains(c))
        {
            repr.push(self.bump()?);
        }
        if let Ok(i) = repr.parse::<i64>() {
            return Some(Value::from(i));
        }
        repr.parse::<f64>().ok().map(Value::from)
    }

    fn parse_identifier(&mut self) -> Option<String> {
        let mut word = String::new();
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '-')
        {
            word.push(self.bump()?);
        }
        if word.is_empty() {
            None
        } else {
            Some(word)
        }
    }

    /// Bare words: the JSON literals keep their meaning, anything else is
    /// read as a string (models love unquoted enum-ish values).
    fn parse_bare_word(&mut self) -> Option<Value> {
        let word = self.parse_identifier()?;
        Some(match word.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => Value::String(word),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(extracted: Extracted) -> Value {
        extracted.into_value()
    }

    #[test]
    fn test_plain_object_parses_strict() {
        let (result, strategy) = extract_traced(r#"{"a": 1, "b": [2, 3]}"#);
        assert_eq!(obj(result), json!({"a": 1, "b": [2, 3]}));
        assert_eq!(strategy, Strategy::Strict);
    }

    #[test]
    fn test_object_wrapped_in_prose() {
        let text = r#"Sure! Here is the analysis you asked for: {"a": 1} Hope this helps."#;
        let (result, strategy) = extract_traced(text);
        assert_eq!(obj(result), json!({"a": 1}));
        assert_eq!(strategy, Strategy::Strict);
    }

    #[test]
    fn test_fenced_block_with_json_tag() {
        let text = "Here you go:\n```json\n{\"key\": \"value\"}\n```\nLet me know!";
        let (result, strategy) = extract_traced(text);
        assert_eq!(obj(result), json!({"key": "value"}));
        assert_eq!(strategy, Strategy::Strict);
    }

    #[test]
    fn test_fenced_block_without_tag() {
        let text = "```\n[{\"task_name\": \"Review code\"}]\n```";
        let result = extract(text);
        assert_eq!(result.into_value(), json!([{"task_name": "Review code"}]));
    }

    #[test]
    fn test_fence_and_prose_equal_direct_parse() {
        // Embedded JSON recovered from prose must deep-equal a direct parse.
        let embedded = json!({
            "job_title": "Backend Developer",
            "key_responsibilities": [{"responsibility": "Design APIs", "importance": "High"}]
        });
        let text = format!("Certainly. The description follows.\n```json\n{embedded}\n```\nDone.");
        assert_eq!(extract(&text).into_value(), embedded);
    }

    #[test]
    fn test_array_result_is_array_variant() {
        let result = extract(r#"[{"a": 1}, {"a": 2}]"#);
        assert!(matches!(result, Extracted::Array(ref items) if items.len() == 2));
    }

    #[test]
    fn test_no_json_returns_empty() {
        let (result, strategy) = extract_traced("I cannot help with that request.");
        assert!(result.is_empty());
        assert_eq!(strategy, Strategy::GaveUp);
    }

    #[test]
    fn test_empty_input_returns_empty() {
        assert!(extract("").is_empty());
        assert!(extract("   \n\t").is_empty());
    }

    #[test]
    fn test_empty_sentinel_serializes_as_empty_mapping() {
        assert_eq!(extract("no json here").into_value(), json!({}));
    }

    #[test]
    fn test_bare_scalar_is_not_structure() {
        // A lone string or number parses as JSON but carries no structure.
        assert!(extract(r#""just a string""#).is_empty());
        assert!(extract("42").is_empty());
    }

    #[test]
    fn test_trailing_comma_requires_repair() {
        let text = r#"{"a": 1, "b": 2,}"#;
        assert!(
            serde_json::from_str::<Value>(text).is_err(),
            "fixture must fail the strict parse"
        );
        let (result, strategy) = extract_traced(text);
        assert_eq!(obj(result), json!({"a": 1, "b": 2}));
        assert_eq!(strategy, Strategy::Repair);
    }

    #[test]
    fn test_trailing_comma_in_array() {
        let (result, strategy) = extract_traced(r#"[1, 2, 3,]"#);
        assert_eq!(result.into_value(), json!([1, 2, 3]));
        assert_eq!(strategy, Strategy::Repair);
    }

    #[test]
    fn test_unquoted_keys_repaired() {
        let (result, strategy) = extract_traced(r#"{status: "APPROVED", corrections_made: []}"#);
        assert_eq!(
            obj(result),
            json!({"status": "APPROVED", "corrections_made": []})
        );
        assert_eq!(strategy, Strategy::Repair);
    }

    #[test]
    fn test_smart_quotes_repaired() {
        let text = "{\u{201C}a\u{201D}: \u{201C}b\u{201D}}";
        let (result, strategy) = extract_traced(text);
        assert_eq!(obj(result), json!({"a": "b"}));
        assert_eq!(strategy, Strategy::Repair);
    }

    #[test]
    fn test_smart_single_quotes_reach_lenient_via_repair() {
        // Repair normalizes the curly quotes to ASCII; the lenient reader
        // then handles the single-quoted strings.
        let text = "{\u{2018}a\u{2019}: \u{2018}b\u{2019}}";
        let (result, strategy) = extract_traced(text);
        assert_eq!(obj(result), json!({"a": "b"}));
        assert_eq!(strategy, Strategy::Lenient);
    }

    #[test]
    fn test_repair_leaves_string_contents_alone() {
        // A comma-brace sequence inside a string is data, not a malformation.
        let text = r#"{"a": "x,}", "b": 1,}"#;
        let result = extract(text);
        assert_eq!(obj(result), json!({"a": "x,}", "b": 1}));
    }

    #[test]
    fn test_single_quotes_need_lenient_parse() {
        let text = "{'gap_level': 4, 'skill_name': 'Kubernetes'}";
        let (result, strategy) = extract_traced(text);
        assert_eq!(
            obj(result),
            json!({"gap_level": 4, "skill_name": "Kubernetes"})
        );
        assert_eq!(strategy, Strategy::Lenient);
    }

    #[test]
    fn test_comments_need_lenient_parse() {
        let text = "{\n  // the model explains itself\n  \"a\": 1,\n  /* inline */ \"b\": 'two'\n}";
        let (result, strategy) = extract_traced(text);
        assert_eq!(obj(result), json!({"a": 1, "b": "two"}));
        assert_eq!(strategy, Strategy::Lenient);
    }

    #[test]
    fn test_lenient_bare_word_value() {
        let (result, _) = extract_traced("{'status': APPROVED}");
        assert_eq!(obj(result), json!({"status": "APPROVED"}));
    }

    #[test]
    fn test_lenient_non_ascii_string() {
        let (result, strategy) = extract_traced(r#"{'note': 'café'}"#);
        assert_eq!(obj(result), json!({"note": "café"}));
        assert_eq!(strategy, Strategy::Lenient);
    }

    #[test]
    fn test_nested_closers_inside_strings() {
        let text = r#"The payload: {"html": "<b>}</b>", "ok": true} trailing."#;
        assert_eq!(
            obj(extract(text)),
            json!({"html": "<b>}</b>", "ok": true})
        );
    }

    #[test]
    fn test_unclosed_fence_falls_back_to_brace_span() {
        let text = "```json\n{\"a\": 1}";
        assert_eq!(obj(extract(text)), json!({"a": 1}));
    }

    #[test]
    fn test_from_value_classifies() {
        assert!(matches!(
            Extracted::from_value(json!({"a": 1})),
            Extracted::Object(_)
        ));
        assert!(matches!(
            Extracted::from_value(json!([1, 2])),
            Extracted::Array(_)
        ));
        assert!(Extracted::from_value(json!("scalar")).is_empty());
        assert!(Extracted::from_value(Value::Null).is_empty());
    }

    #[test]
    fn test_into_object_and_into_array() {
        assert!(extract(r#"{"a": 1}"#).into_object().is_some());
        assert!(extract(r#"{"a": 1}"#).into_array().is_none());
        assert!(extract(r#"[1]"#).into_array().is_some());
    }

    #[test]
    fn test_stray_opener_does_not_hide_later_array() {
        // An unclosed `{` earlier in the text must not swallow the array.
        let (result, _) = extract_traced("{broken [1, 2]");
        assert_eq!(result.into_value(), json!([1, 2]));
    }

    #[test]
    fn test_garbage_braces_return_empty() {
        let (result, strategy) = extract_traced("{{{{ not json at all ]]");
        assert!(result.is_empty());
        assert_eq!(strategy, Strategy::GaveUp);
    }
}
