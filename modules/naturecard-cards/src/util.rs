/// Strip markdown code fences from an LLM response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// The first `{` through the last `}` of a response, after fences are removed.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let body = strip_code_blocks(response);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object_is_returned_as_is() {
        let raw = r#"{"a": 1}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn fenced_object_is_unwrapped() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn surrounding_chatter_is_dropped() {
        let raw = "Here is your card:\n{\"a\": {\"b\": 2}}\nEnjoy!";
        assert_eq!(extract_json_object(raw), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(extract_json_object("I can't help with that."), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
