use crate::error::RecommendError;
use crate::model::{RecommendationRecord, RecommendationReport, NOT_AVAILABLE};
use crate::normalizer::clean_generated_text;
use crate::providers::group_thousands;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::json;
use std::fmt::Write;
use std::str::FromStr;

/// How a report is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// HTML fragment with map marker data
    #[default]
    Html,
    /// Plain text
    Text,
    /// Structured JSON
    Json,
    /// JSON list of place names only
    Places,
}

impl OutputFormat {
    /// File extension used when saving a report
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Text => "txt",
            OutputFormat::Json | OutputFormat::Places => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "places" => Ok(OutputFormat::Places),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

pub fn render(report: &RecommendationReport, format: OutputFormat) -> Result<String, RecommendError> {
    match format {
        OutputFormat::Html => render_html(report),
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Places => Ok(json!({ "places": report.place_names() }).to_string()),
    }
}

/// Display label for a record's cost.
///
/// Zero is ambiguous between "free" and "not reported"; it is only called
/// free when the record's own text says so.
pub fn cost_label(record: &RecommendationRecord) -> String {
    if record.cost_local == 0.0 && record.cost_reference == 0.0 {
        let mentions_free = std::iter::once(&record.description)
            .chain(record.extra_attributes.values())
            .any(|text| text.to_lowercase().contains("free"));
        if mentions_free {
            return "Free".to_string();
        }
    }

    format!(
        "{} KRW (${:.2})",
        group_thousands(record.cost_local.round() as u64),
        record.cost_reference
    )
}

fn budget_label(budget_krw: f64) -> String {
    if budget_krw > 0.0 {
        format!("{} KRW", group_thousands(budget_krw.round() as u64))
    } else {
        "Any".to_string()
    }
}

fn render_html(report: &RecommendationReport) -> Result<String, RecommendError> {
    let context = &report.context;
    let weather = &context.weather;
    let markers = serde_json::to_string(&report.markers())?;
    let mut html = String::new();

    // Writing to a String cannot fail
    let _ = write!(
        html,
        "<h2>Weather in {}</h2>\n\
         <p><b>Temperature:</b> {}°C</p>\n\
         <p><b>Description:</b> {}</p>\n\
         <p><b>Humidity:</b> {}%</p>\n\
         <p><b>Budget:</b> {}</p>\n\
         <h3>AI Recommendations</h3>\n",
        encode_text(&context.address),
        weather.temperature_celsius,
        encode_text(&weather.description),
        weather.humidity,
        budget_label(context.budget_krw),
    );

    if report.records.is_empty() {
        html.push_str("<p>No recommendations available.</p>\n");
        return Ok(html);
    }

    let _ = writeln!(
        html,
        "<ul class=\"recommendations\" data-markers=\"{}\">",
        encode_double_quoted_attribute(&markers)
    );
    for record in &report.records {
        html.push_str("<li>\n");
        let _ = writeln!(html, "<h4>{}</h4>", encode_text(&record.name));
        html_field(&mut html, "Location", &record.location);
        html_field(&mut html, "Time to travel", &record.travel_time);
        html_field(&mut html, "Cost", &cost_label(record));
        if record.website != NOT_AVAILABLE {
            let _ = writeln!(
                html,
                "<p><b>Website:</b> <a href=\"{}\">{}</a></p>",
                encode_double_quoted_attribute(&record.website),
                encode_text(&record.website)
            );
        }
        if !record.description.is_empty() {
            let _ = writeln!(html, "<p>{}</p>", encode_text(&record.description));
        }
        for (key, value) in &record.extra_attributes {
            html_field(&mut html, key, value);
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n");

    Ok(html)
}

fn html_field(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "<p><b>{}:</b> {}</p>",
        encode_text(label),
        encode_text(value)
    );
}

fn render_text(report: &RecommendationReport) -> String {
    let context = &report.context;
    let mut text = format!(
        "Weather in {}\nTemperature: {}°C\nDescription: {}\nHumidity: {}%\nBudget: {}\n",
        context.address,
        context.weather.temperature_celsius,
        context.weather.description,
        context.weather.humidity,
        budget_label(context.budget_krw),
    );

    // Unstructured output is still worth showing as plain text
    if report.records.is_empty() {
        let cleaned = clean_generated_text(&report.raw_text);
        if cleaned.is_empty() {
            text.push_str("\nNo recommendations available.\n");
        } else {
            let _ = writeln!(text, "\n{}", cleaned);
        }
        return text;
    }

    for (index, record) in report.records.iter().enumerate() {
        let _ = write!(
            text,
            "\n{}. {}\n   Location: {}\n   Time to travel: {}\n   Cost: {}\n",
            index + 1,
            record.name,
            record.location,
            record.travel_time,
            cost_label(record)
        );
        if record.website != NOT_AVAILABLE {
            let _ = writeln!(text, "   Website: {}", record.website);
        }
        if !record.description.is_empty() {
            let _ = writeln!(text, "   {}", record.description);
        }
        for (key, value) in &record.extra_attributes {
            let _ = writeln!(text, "   {}: {}", key, value);
        }
    }

    text
}

fn render_json(report: &RecommendationReport) -> Result<String, RecommendError> {
    let context = &report.context;
    let body = json!({
        "weather": {
            "location": context.address,
            "temperature": context.weather.temperature_celsius,
            "description": context.weather.description,
            "humidity": context.weather.humidity,
            "budget_krw": context.budget_krw,
        },
        "recommendations": report.records,
        "markers": report.markers(),
    });
    Ok(serde_json::to_string_pretty(&body)?)
}
