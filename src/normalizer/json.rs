use super::{costs, normalize_website, parse_amount};
use crate::model::{RecommendationRecord, UNKNOWN};
use log::{debug, warn};
use serde_json::{Map, Value};

const NAME_KEYS: &[&str] = &["name", "name_of_place", "place"];
const LOCATION_KEYS: &[&str] = &["location", "address"];
const TRAVEL_TIME_KEYS: &[&str] = &["travel_time", "time_to_travel", "estimated_travel_time"];
const DESCRIPTION_KEYS: &[&str] = &["description", "reason"];
const WEBSITE_KEYS: &[&str] = &["website", "url"];
const COST_LOCAL_KEYS: &[&str] = &["cost_krw"];
const COST_REFERENCE_KEYS: &[&str] = &["cost_usd"];

/// The first ``` fenced block of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// Language tag right after the opening fence, possibly empty
    pub info: &'a str,
    pub body: &'a str,
}

impl FencedBlock<'_> {
    /// Tagged `json`, or a body that opens like JSON.
    pub fn is_json(&self) -> bool {
        self.info.eq_ignore_ascii_case("json") || self.body.starts_with(|c| c == '[' || c == '{')
    }
}

/// Locate the first fence. An unterminated fence runs to the end of the
/// input; a one-line fence keeps its body on the opening line.
pub fn fenced_block(text: &str) -> Option<FencedBlock<'_>> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];

    let info_len = after_open
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
        .unwrap_or(after_open.len());
    let info = &after_open[..info_len];
    let rest = &after_open[info_len..];

    let line_end = rest.find('\n').unwrap_or(rest.len());
    let body = if rest[..line_end].trim().is_empty() {
        &rest[line_end..]
    } else {
        rest
    };

    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    Some(FencedBlock {
        info,
        body: body.trim(),
    })
}

/// Body of the first ``` fence, without the info string.
pub fn extract_fenced_block(text: &str) -> Option<&str> {
    fenced_block(text).map(|block| block.body)
}

/// Drop trailing commas before `]`/`}`, then `//` and `/* */` comments.
/// Both passes leave string literals alone.
pub fn repair_json(text: &str) -> String {
    strip_comments(&strip_trailing_commas(text))
}

pub(super) fn records_from_json(body: &str, exchange_rate: f64) -> Vec<RecommendationRecord> {
    let value = match parse_with_repair(body) {
        Some(value) => value,
        None => return Vec::new(),
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("recommendations") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                object.insert("recommendations".to_string(), other);
                vec![Value::Object(object)]
            }
            None => vec![Value::Object(object)],
        },
        other => {
            warn!("Generator JSON is neither an array nor an object: {}", other);
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(object) => Some(record_from_object(object, index, exchange_rate)),
            other => {
                warn!("Skipping non-object recommendation at index {}: {}", index, other);
                None
            }
        })
        .collect()
}

fn parse_with_repair(body: &str) -> Option<Value> {
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(first) => {
            debug!("Strict JSON parse failed ({}), retrying after repair", first);
            match serde_json::from_str(&repair_json(body)) {
                Ok(value) => Some(value),
                Err(second) => {
                    warn!("Generator output is not valid JSON after repair: {}", second);
                    None
                }
            }
        }
    }
}

fn record_from_object(
    mut object: Map<String, Value>,
    index: usize,
    exchange_rate: f64,
) -> RecommendationRecord {
    let name = take_text(&mut object, NAME_KEYS);
    let location = take_text(&mut object, LOCATION_KEYS);
    let travel_time = take_text(&mut object, TRAVEL_TIME_KEYS);
    let description = take_text(&mut object, DESCRIPTION_KEYS);
    let website = take_text(&mut object, WEBSITE_KEYS);
    let cost_local = take_number(&mut object, COST_LOCAL_KEYS);
    let cost_reference = take_number(&mut object, COST_REFERENCE_KEYS);

    let name = name
        .or_else(|| location.clone().filter(|l| !l.eq_ignore_ascii_case(UNKNOWN)))
        .unwrap_or_else(|| format!("Recommendation {}", index + 1));

    let mut record = RecommendationRecord::named(name);
    if let Some(location) = location {
        record.location = location;
    }
    if let Some(travel_time) = travel_time {
        record.travel_time = travel_time;
    }
    record.description = description.unwrap_or_default();
    record.website = normalize_website(website.as_deref().unwrap_or_default());
    (record.cost_local, record.cost_reference) = costs(cost_local, cost_reference, exchange_rate);

    for (key, value) in object {
        if let Some(text) = attribute_text(&value) {
            record.extra_attributes.insert(key, text);
        }
    }

    record
}

/// First non-blank string under any of `keys`; every alias is consumed.
fn take_text(object: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    let mut found = None;
    for key in keys {
        if let Some(value) = object.remove(*key) {
            if found.is_none() {
                found = attribute_text(&value).filter(|s| !s.is_empty());
            }
        }
    }
    found
}

fn take_number(object: &mut Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let mut found = None;
    for key in keys {
        if let Some(value) = object.remove(*key) {
            if found.is_none() {
                found = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => parse_amount(&s),
                    _ => None,
                };
            }
        }
    }
    found
}

fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(attribute_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match (c, chars.get(i + 1)) {
            ('"', _) => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
                out.push(' ');
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' && matches!(next_significant(&chars, i + 1), Some(']') | Some('}')) {
            continue;
        }
        out.push(c);
    }

    out
}

/// Next character that is neither whitespace nor inside a comment.
fn next_significant(chars: &[char], mut i: usize) -> Option<char> {
    while i < chars.len() {
        match (chars[i], chars.get(i + 1)) {
            (c, _) if c.is_whitespace() => i += 1,
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            (c, _) => return Some(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_block() {
        let text = "```json\n[1, 2]\n```\n";
        assert_eq!(extract_fenced_block(text), Some("[1, 2]"));
    }

    #[test]
    fn test_extract_fenced_block_without_language() {
        let text = "intro\n```\n{\"a\": 1}\n```";
        assert_eq!(extract_fenced_block(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_unterminated_fence() {
        let text = "```json\n[{\"name\": \"Park\"}]";
        assert_eq!(extract_fenced_block(text), Some("[{\"name\": \"Park\"}]"));
    }

    #[test]
    fn test_extract_one_line_fence() {
        let text = "```json [{\"name\":\"Park\",\"location\":\"Seoul\"}] ```\nEnjoy!";
        let block = fenced_block(text).unwrap();
        assert_eq!(block.info, "json");
        assert_eq!(block.body, "[{\"name\":\"Park\",\"location\":\"Seoul\"}]");
        assert_eq!(extract_fenced_block("```[1, 2]```"), Some("[1, 2]"));
    }

    #[test]
    fn test_fence_is_json() {
        assert!(fenced_block("```JSON\nnot yet valid\n```").unwrap().is_json());
        assert!(fenced_block("```\n{\"a\": 1}\n```").unwrap().is_json());
        let prose = fenced_block("```\n**Name of Place:** Cafe X\n```").unwrap();
        assert_eq!(prose.info, "");
        assert!(!prose.is_json());
    }

    #[test]
    fn test_no_fence() {
        assert_eq!(extract_fenced_block("[1, 2]"), None);
    }

    #[test]
    fn test_repair_trailing_commas() {
        assert_eq!(repair_json("[1, 2,]"), "[1, 2]");
        assert_eq!(repair_json("{\"a\": 1,\n}"), "{\"a\": 1\n}");
    }

    #[test]
    fn test_repair_keeps_commas_in_strings() {
        let repaired = repair_json(r#"{"a": "x,]", "b": "y,}",}"#);
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"], "x,]");
        assert_eq!(value["b"], "y,}");
    }

    #[test]
    fn test_repair_comments() {
        let text = "[\n  // first\n  {\"website\": \"http://a.kr\"}, /* tail */\n]";
        let value: Value = serde_json::from_str(&repair_json(text)).unwrap();
        assert_eq!(value[0]["website"], "http://a.kr");
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_unrepairable_json_is_empty() {
        assert!(records_from_json("[{\"name\": \"Park\"", 0.00073).is_empty());
        assert!(records_from_json("not json at all", 0.00073).is_empty());
    }

    #[test]
    fn test_scalar_json_is_empty() {
        assert!(records_from_json("42", 0.00073).is_empty());
    }

    #[test]
    fn test_recommendations_wrapper_is_unwrapped() {
        let records = records_from_json(
            r#"{"recommendations": [{"name": "A"}, {"name": "B"}]}"#,
            0.00073,
        );
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let records = records_from_json(r#"[{"name": "A"}, "stray", 3]"#, 0.00073);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "A");
    }

    #[test]
    fn test_defaults_for_missing_keys() {
        let records = records_from_json("[{}]", 0.00073);
        let record = &records[0];
        assert_eq!(record.name, "Recommendation 1");
        assert_eq!(record.location, "unknown");
        assert_eq!(record.travel_time, "unknown");
        assert_eq!(record.description, "");
        assert_eq!(record.website, "N/A");
        assert_eq!(record.cost_local, 0.0);
        assert_eq!(record.cost_reference, 0.0);
        assert!(record.extra_attributes.is_empty());
        assert!(record.latitude.is_none());
    }

    #[test]
    fn test_name_falls_back_to_location() {
        let records = records_from_json(r#"[{"location": "Gyeongbokgung"}]"#, 0.00073);
        assert_eq!(records[0].name, "Gyeongbokgung");
    }

    #[test]
    fn test_extra_attributes_and_string_costs() {
        let records = records_from_json(
            r#"[{
                "name": "Han River Park",
                "cost_krw": "12,000",
                "clothing": "Light jacket",
                "essentials": ["water", "sunscreen"],
                "rating": 4.5,
                "nested": {"ignored": true}
            }]"#,
            0.00073,
        );
        let record = &records[0];
        assert_eq!(record.cost_local, 12000.0);
        assert_eq!(record.cost_reference, 8.76);
        assert_eq!(record.extra_attributes["clothing"], "Light jacket");
        assert_eq!(record.extra_attributes["essentials"], "water, sunscreen");
        assert_eq!(record.extra_attributes["rating"], "4.5");
        assert!(!record.extra_attributes.contains_key("nested"));
        assert!(!record.extra_attributes.contains_key("name"));
    }
}
