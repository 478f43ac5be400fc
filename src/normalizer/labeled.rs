use super::{costs, normalize_website, parse_amount};
use crate::model::{LabeledBlock, RecommendationRecord};

const NAME_LABELS: &[&str] = &["Name of Place", "Name", "Place"];
const LOCATION_LABELS: &[&str] = &["Location", "Address"];
const TRAVEL_TIME_LABELS: &[&str] = &[
    "Time to Travel",
    "Travel Time",
    "Estimated Time to Travel",
    "Estimated Travel Time",
];
const DESCRIPTION_LABELS: &[&str] = &["Reason", "Description", "Why"];
const WEBSITE_LABELS: &[&str] = &["Website", "Destination's Website"];

/// Plain-text rendering of generator output: bullets removed, blank lines
/// dropped, one empty line between the remaining lines.
pub fn clean_generated_text(raw: &str) -> String {
    raw.lines()
        .map(strip_bullet)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split labeled prose into blocks. Blocks without a single labeled line
/// (intros, sign-offs) are dropped.
pub fn parse_labeled_blocks(text: &str) -> Vec<LabeledBlock> {
    split_blocks(&clean_labeled_text(text))
        .into_iter()
        .filter_map(|lines| block_from_lines(&lines))
        .collect()
}

/// `**Field:** value` or `**Field**: value`; the label is returned verbatim.
pub fn parse_labeled_line(line: &str) -> Option<(String, String)> {
    let rest = line.trim().strip_prefix("**")?;

    let (key, value) = if let Some(end) = rest.find(":**") {
        (&rest[..end], &rest[end + 3..])
    } else {
        let end = rest.find("**")?;
        let value = rest[end + 2..].strip_prefix(':')?;
        (&rest[..end], value)
    };

    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Bare place names from free text: lines without a colon or digit, under
/// ten words, not starting with "note". First occurrence wins.
pub fn extract_place_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.contains(':')
            || line.chars().any(|c| c.is_ascii_digit())
            || line.split_whitespace().count() >= 10
            || line.to_lowercase().starts_with("note")
        {
            continue;
        }
        if !names.iter().any(|n| n == line) {
            names.push(line.to_string());
        }
    }

    names
}

pub(super) fn record_from_block(
    block: LabeledBlock,
    index: usize,
    exchange_rate: f64,
) -> RecommendationRecord {
    let name = if block.name.is_empty() {
        format!("Recommendation {}", index + 1)
    } else {
        block.name
    };
    let mut record = RecommendationRecord::named(name);
    let mut description: Vec<String> = Vec::new();
    let mut cost_local = None;
    let mut cost_reference = None;

    for (key, value) in block.fields {
        if value.is_empty() || is_one_of(&key, NAME_LABELS) {
            continue;
        }

        if is_one_of(&key, LOCATION_LABELS) {
            record.location = value;
        } else if is_one_of(&key, TRAVEL_TIME_LABELS) {
            record.travel_time = value;
        } else if is_one_of(&key, DESCRIPTION_LABELS) {
            description.push(value);
        } else if is_one_of(&key, WEBSITE_LABELS) {
            record.website = normalize_website(link_target(&value));
        } else if key.to_lowercase().starts_with("cost") {
            if key.to_lowercase().contains("usd") {
                cost_reference = parse_amount(&value);
            } else {
                cost_local = cost_local.or_else(|| parse_amount(&value));
                cost_reference = cost_reference.or_else(|| dollar_amount(&value));
            }
        } else {
            record.extra_attributes.insert(key, value);
        }
    }

    description.extend(block.free_text);
    record.description = description.join(" ");
    (record.cost_local, record.cost_reference) = costs(cost_local, cost_reference, exchange_rate);
    record
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some('*' | '-' | '+'), Some(next)) if next.is_whitespace() => trimmed[1..].trim(),
        _ => line.trim_end(),
    }
}

fn clean_labeled_text(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(strip_bullet) {
        let blank = line.trim().is_empty();
        if blank && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(if blank { "" } else { line });
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    text.split("\n\n")
        .map(|block| block.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>())
        .filter(|lines| !lines.is_empty())
        .collect()
}

fn block_from_lines(lines: &[&str]) -> Option<LabeledBlock> {
    let mut block = LabeledBlock::default();
    let (first, rest) = lines.split_first()?;

    let heading = match parse_labeled_line(first) {
        Some(pair) => {
            block.fields.push(pair);
            None
        }
        None => Some(clean_heading(first)),
    };

    for line in rest {
        match parse_labeled_line(line) {
            Some(pair) => block.fields.push(pair),
            None => block.free_text.push(line.trim().to_string()),
        }
    }

    if block.fields.is_empty() {
        return None;
    }

    block.name = heading
        .filter(|h| !h.is_empty())
        .or_else(|| {
            NAME_LABELS
                .iter()
                .find_map(|label| block.get(label))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .or_else(|| {
            block
                .fields
                .iter()
                .map(|(_, value)| value.clone())
                .find(|value| !value.is_empty())
        })
        .unwrap_or_default();

    Some(block)
}

/// `1. **Lotte World**` -> `Lotte World`
fn clean_heading(line: &str) -> String {
    let mut heading = line.trim().trim_start_matches('#').trim();

    let digits = heading.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = heading[digits..]
            .strip_prefix('.')
            .or_else(|| heading[digits..].strip_prefix(')'))
        {
            heading = rest.trim();
        }
    }

    heading
        .trim_matches('*')
        .trim()
        .trim_end_matches(':')
        .trim_matches('*')
        .trim()
        .to_string()
}

/// `[site](https://a.kr)` -> `https://a.kr`
fn link_target(value: &str) -> &str {
    let value = value.trim();
    if value.starts_with('[') {
        if let (Some(open), Some(close)) = (value.find("]("), value.rfind(')')) {
            if open + 2 < close {
                return &value[open + 2..close];
            }
        }
    }
    value
}

/// USD amount written alongside a KRW cost, e.g. `15,000 KRW (~$11)`.
fn dollar_amount(value: &str) -> Option<f64> {
    let start = value.find('$')?;
    parse_amount(&value[start..])
}

fn is_one_of(key: &str, labels: &[&str]) -> bool {
    labels.iter().any(|label| key.eq_ignore_ascii_case(label))
}
