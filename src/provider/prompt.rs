/// Maximum prior conversation turns forwarded to the provider.
pub const MAX_CONTEXT_TURNS: usize = 10;

/// System prompt demanding a strict JSON assessment. The validator still
/// treats the response as untrusted — models routinely wrap the object in
/// prose or fences despite the instruction.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are a mental wellness analysis assistant.
You must output ONLY valid JSON. No markdown. No extra text.

Return JSON with EXACT keys:
{
  \"stress\": number (0.0-1.0),
  \"anxiety\": number (0.0-1.0),
  \"depression\": number (0.0-1.0),
  \"risk_level\": one of \"low\", \"moderate\", \"high\", \"critical\",
  \"summary\": string (1-2 sentences),
  \"supportive_message\": string (empathetic, supportive, non-judgmental),
  \"recommendations\": array of 3-6 short strings
}

Important:
- This is not a medical diagnosis.
- Avoid absolute certainty; use cautious language.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_every_expected_key() {
        for key in [
            "stress",
            "anxiety",
            "depression",
            "risk_level",
            "summary",
            "supportive_message",
            "recommendations",
        ] {
            assert!(
                ANALYSIS_SYSTEM_PROMPT.contains(key),
                "prompt missing key {key}"
            );
        }
    }
}
