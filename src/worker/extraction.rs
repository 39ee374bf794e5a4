//! Few-shot extraction prompt and structured-output decoding.

use serde::Deserialize;

use crate::error::ParseError;
use crate::services::context::render_chat_prompt;

const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are a markdown assistant. Help me to get knowledge in markdown file";

/// One `{heading, content}` record extracted by the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractedSection {
    pub heading: String,
    pub content: String,
}

impl ExtractedSection {
    /// The `"<heading>-<content>"` form carried by `WorkerEvent::Complete`.
    pub fn labeled(&self) -> String {
        format!("{}-{}", self.heading, self.content)
    }
}

/// Render the fixed few-shot prompt instructing the model to segment
/// markdown by heading markers into a JSON array of records.
pub fn render_extraction_prompt(content: &str) -> String {
    let instructions = format!(
        r#"Split the input into knowledge points. Every line starting with # , ## , ### begins a knowledge point; all knowledge points must be output and none may be missing. Output a JSON array of {{"heading": ..., "content": ...}} records and nothing else, such as

[INPUT]
# ABC
...............

## CDF
..........
### GGG
.....
[END INPUT]

[OUTPUT]
[{{"heading": "ABC", "content": "..............."}},{{"heading": "CDF", "content": ".........."}},{{"heading": "GGG", "content": "....."}}]
[END OUTPUT]

[INPUT]
# ABC
...............

### GGG
.....

### www
.....
[END INPUT]

[OUTPUT]
[{{"heading": "ABC", "content": "..............."}},{{"heading": "GGG", "content": "....."}},{{"heading": "www", "content": "....."}}]
[END OUTPUT]

[INPUT]
{content}
[END INPUT]

[OUTPUT]"#
    );
    render_chat_prompt(EXTRACTION_SYSTEM_PROMPT, None, &instructions)
}

/// Decode-and-validate for the model's structured output.
///
/// The payload is the slice from the first `[` through the first `]`;
/// anything malformed is a typed [`ParseError`], never repaired.
pub fn parse_extraction(raw: &str) -> Result<Vec<ExtractedSection>, ParseError> {
    let start = raw.find('[').ok_or(ParseError::MissingArray)?;
    let end = raw[start..]
        .find(']')
        .map(|i| start + i)
        .ok_or(ParseError::UnterminatedArray)?;

    let sections: Vec<ExtractedSection> = serde_json::from_str(&raw[start..=end])?;
    if sections.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(sections)
}
