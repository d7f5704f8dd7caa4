/// Author of a message in the shared conversation history.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Bot,
}

fn default_content_type() -> String {
    "text/markdown".to_string()
}

/// One message of the conversation history.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProtocolMessage {
    pub role: Role,
    pub content: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl ProtocolMessage {
    /// Creates a markdown message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            content_type: default_content_type(),
        }
    }

    /// Creates a user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a bot-authored message.
    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content)
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Returns a copy of this message with `content` replaced.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            role: self.role,
            content: content.into(),
            content_type: self.content_type.clone(),
        }
    }
}

/// Request dispatched to every compared bot, oldest message first.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QueryRequest {
    pub query: Vec<ProtocolMessage>,
    pub user_id: String,
    pub conversation_id: String,
    pub message_id: String,
}

impl QueryRequest {
    /// Creates a request with fresh conversation and message ids.
    pub fn new(query: Vec<ProtocolMessage>) -> Self {
        Self {
            query,
            user_id: String::new(),
            conversation_id: uuid::Uuid::new_v4().to_string(),
            message_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Sets the user id forwarded to the bots.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Returns the most recent user-authored message, if any.
    pub fn latest_user_message(&self) -> Option<&ProtocolMessage> {
        self.query.iter().rev().find(|m| m.role == Role::User)
    }
}
