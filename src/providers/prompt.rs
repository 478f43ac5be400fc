use crate::model::RequestContext;

/// The system prompt describing the expected JSON output.
///
/// Loaded from `prompt.txt` at compile time using `include_str!`, so the
/// wording can be edited without dealing with Rust string syntax.
pub const RECOMMENDATION_SYSTEM_PROMPT: &str = include_str!("prompt.txt");

/// Build the full prompt for one request.
pub fn build_recommendation_prompt(
    context: &RequestContext,
    count: usize,
    exchange_rate: f64,
) -> String {
    let weather = &context.weather;
    let mut prompt = format!(
        "{}\n\nThe current weather in {} is {} with a temperature of {}°C and {}% humidity.\n\
         I am currently at coordinates ({}, {}).\n\
         Suggest {} fun or useful things I can do near me in {}. Consider {}.",
        RECOMMENDATION_SYSTEM_PROMPT.trim_end(),
        context.address,
        weather.description,
        weather.temperature_celsius,
        weather.humidity,
        context.coordinates.latitude,
        context.coordinates.longitude,
        count,
        context.address,
        budget_phrase(context.budget_krw, exchange_rate),
    );

    let interests: Vec<&str> = context
        .interests
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect();
    if !interests.is_empty() {
        prompt.push_str(&format!(
            "\nPrefer suggestions related to: {}.",
            interests.join(", ")
        ));
    }

    prompt
}

fn budget_phrase(budget_krw: f64, exchange_rate: f64) -> String {
    if budget_krw <= 0.0 {
        return "any budget".to_string();
    }

    let krw = group_thousands(budget_krw.round() as u64);
    if exchange_rate > 0.0 {
        format!(
            "a budget of {} KRW (approximately ${:.2} USD)",
            krw,
            budget_krw * exchange_rate
        )
    } else {
        format!("a budget of {} KRW (unable to convert to USD)", krw)
    }
}

/// `50000` -> `50,000`
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
