use std::collections::BTreeMap;

const INTRODUCTION: &str = "Hi! I am a bot that allows you to compare responses from two \
other bots. Please provide me your query followed by a string that looks like \"bot1 vs \
bot2\" in order to see and compare responses from the two bots.";

/// Capabilities advertised to the hosting platform.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SettingsResponse {
    /// Number of downstream bot calls allowed per request, keyed by bot name
    /// (`any` covers every bot).
    pub server_bot_dependencies: BTreeMap<String, u32>,
    pub allow_attachments: bool,
    pub introduction_message: String,
}

impl Default for SettingsResponse {
    fn default() -> Self {
        Self {
            server_bot_dependencies: BTreeMap::from([("any".to_string(), 2)]),
            allow_attachments: true,
            introduction_message: INTRODUCTION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_allow_two_bot_calls() {
        let value = serde_json::to_value(SettingsResponse::default()).expect("serialize");
        assert_eq!(value["server_bot_dependencies"]["any"], 2);
        assert_eq!(value["allow_attachments"], true);
        assert!(
            value["introduction_message"]
                .as_str()
                .is_some_and(|m| m.contains("bot1 vs bot2"))
        );
    }
}
