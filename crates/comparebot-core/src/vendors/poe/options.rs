/// Per-query generation options forwarded to every bot.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoeRequestOptions {
    /// Sampling temperature hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Ask the bot to skip its own system prompt.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub skip_system_prompt: bool,
    /// Sequences that end generation early.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stop_sequences: Vec<String>,
}

impl PoeRequestOptions {
    /// Sets the temperature hint.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the `skip_system_prompt` flag.
    pub fn skip_system_prompt(mut self, skip: bool) -> Self {
        self.skip_system_prompt = skip;
        self
    }

    /// Adds a stop sequence.
    pub fn stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequences.push(stop.into());
        self
    }
}
