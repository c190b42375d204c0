use serde::{Deserialize, Serialize, Serializer};

/// Generation parameters sent along with every prompt.
///
/// Field order is fixed by the struct, so the serialized body and its
/// payload hash are reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationConfig {
    /// Upper bound of tokens generated for one prompt.
    pub max_token_count: u32,
    /// Sampling temperature.
    #[serde(serialize_with = "serialize_number")]
    pub temperature: f64,
    /// Nucleus sampling threshold.
    #[serde(serialize_with = "serialize_number")]
    pub top_p: f64,
    /// Sequences that stop generation when produced.
    pub stop_sequences: Vec<String>,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            max_token_count: 256,
            temperature: 0.7,
            top_p: 1.0,
            stop_sequences: Vec::new(),
        }
    }
}

/// Whole numbers are written as integers: `1` instead of `1.0`.
fn serialize_number<S: Serializer>(v: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // 2^53, the last integer f64 represents exactly.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if v.fract() == 0.0 && v.abs() <= MAX_EXACT {
        serializer.serialize_i64(*v as i64)
    } else {
        serializer.serialize_f64(*v)
    }
}

/// Body of an `InvokeModel` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest<'a> {
    /// Prompt to complete.
    pub input_text: &'a str,
    /// Generation parameters.
    pub text_generation_config: &'a TextGenerationConfig,
}

/// Parsed body of a successful `InvokeModel` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub input_text_token_count: Option<u32>,
    /// Generated results, the first one is the answer.
    #[serde(default)]
    pub results: Vec<InvokeResult>,
}

impl InvokeResponse {
    /// Take the generated text of the first result.
    pub fn into_output_text(self) -> Option<String> {
        self.results.into_iter().next().map(|r| r.output_text)
    }
}

/// One generated result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResult {
    /// Tokens generated for this result.
    #[serde(default)]
    pub token_count: Option<u32>,
    /// Generated text.
    pub output_text: String,
    /// Why generation stopped, for example `FINISH` or `LENGTH`.
    #[serde(default)]
    pub completion_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invoke_request_serialization() -> anyhow::Result<()> {
        let config = TextGenerationConfig::default();
        let body = serde_json::to_string(&InvokeRequest {
            input_text: "hello",
            text_generation_config: &config,
        })?;

        assert_eq!(
            body,
            r#"{"inputText":"hello","textGenerationConfig":{"maxTokenCount":256,"temperature":0.7,"topP":1,"stopSequences":[]}}"#
        );
        Ok(())
    }

    #[test]
    fn test_invoke_request_escapes_prompt() -> anyhow::Result<()> {
        let config = TextGenerationConfig {
            stop_sequences: vec!["User:".to_string()],
            ..Default::default()
        };
        let body = serde_json::to_string(&InvokeRequest {
            input_text: "say \"hi\"\n",
            text_generation_config: &config,
        })?;

        assert_eq!(
            body,
            r#"{"inputText":"say \"hi\"\n","textGenerationConfig":{"maxTokenCount":256,"temperature":0.7,"topP":1,"stopSequences":["User:"]}}"#
        );
        Ok(())
    }

    #[test]
    fn test_fractional_numbers_keep_their_fraction() -> anyhow::Result<()> {
        let config = TextGenerationConfig {
            max_token_count: 512,
            temperature: 1.0,
            top_p: 0.9,
            stop_sequences: Vec::new(),
        };
        let body = serde_json::to_string(&config)?;

        assert_eq!(
            body,
            r#"{"maxTokenCount":512,"temperature":1,"topP":0.9,"stopSequences":[]}"#
        );
        Ok(())
    }

    #[test]
    fn test_invoke_response_deserialization() -> anyhow::Result<()> {
        let resp: InvokeResponse = serde_json::from_str(
            r#"{
                "inputTextTokenCount": 3,
                "results": [
                    {"tokenCount": 5, "outputText": "Hi there!", "completionReason": "FINISH"},
                    {"tokenCount": 2, "outputText": "Hello"}
                ]
            }"#,
        )?;

        assert_eq!(resp.input_text_token_count, Some(3));
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].completion_reason.as_deref(), Some("FINISH"));
        assert_eq!(resp.results[1].completion_reason, None);
        assert_eq!(resp.into_output_text().as_deref(), Some("Hi there!"));
        Ok(())
    }

    #[test]
    fn test_empty_response_has_no_output() -> anyhow::Result<()> {
        let resp: InvokeResponse = serde_json::from_str("{}")?;
        assert_eq!(resp.into_output_text(), None);
        Ok(())
    }
}
