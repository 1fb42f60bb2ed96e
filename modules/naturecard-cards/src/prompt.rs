use crate::types::CardRequest;

/// Build the card-writing prompt for one species.
pub fn build_prompt(request: &CardRequest) -> String {
    let summary = if request.summary.trim().is_empty() {
        "none"
    } else {
        request.summary.trim()
    };

    format!(
        r#"You are a children's nature educator. Write a parent-and-child knowledge card about the species below, suitable for a 3-year-old.

Species: {common} ({scientific})
Category: {category}
Encyclopedia summary: {summary}
Place: {place}
Month: {month_name}

Respond with ONLY this JSON object, no other text and no markdown code fences:
{{
  "recognition": "How to recognize it, using visual features a small child can understand, 2-3 sentences",
  "fun_fact": "Its most distinctive or fun habit, described vividly, 3-4 sentences",
  "talk_to_kid": "Something the parent can say directly to the child, natural and spoken, 1-2 sentences, including one interactive prompt"
}}

Tone: warm and playful, with personification and simple comparisons a 3-year-old can follow. Emoji are welcome."#,
        common = request.common_name,
        scientific = request.scientific_name,
        category = request.category,
        summary = summary,
        place = request.place_name,
        month_name = month_name(request.month),
    )
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "unknown",
    }
}
