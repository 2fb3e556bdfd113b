//! Dialect tags, translation directions, and direction resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two wire dialects the bridge speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiType {
    #[serde(rename = "response")]
    Response,
    #[serde(rename = "chat_completions")]
    ChatCompletions,
}

impl ApiType {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiType::Response => "response",
            ApiType::ChatCompletions => "chat_completions",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "response" => Ok(ApiType::Response),
            "chat_completions" => Ok(ApiType::ChatCompletions),
            other => Err(format!(
                "unknown api type '{other}' (expected 'response' or 'chat_completions')"
            )),
        }
    }
}

/// Whether a payload is a request body or a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationDirection {
    ChatToResponse,
    ResponseToChat,
    ChatToResponseResponse,
    ResponseToChatResponse,
}

impl TranslationDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatToResponse => "chat_to_response",
            Self::ResponseToChat => "response_to_chat",
            Self::ChatToResponseResponse => "chat_to_response_response",
            Self::ResponseToChatResponse => "response_to_chat_response",
        }
    }

    /// The direction that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::ChatToResponse => Self::ResponseToChat,
            Self::ResponseToChat => Self::ChatToResponse,
            Self::ChatToResponseResponse => Self::ResponseToChatResponse,
            Self::ResponseToChatResponse => Self::ChatToResponseResponse,
        }
    }

    pub fn source(self) -> ApiType {
        match self {
            Self::ChatToResponse | Self::ChatToResponseResponse => ApiType::ChatCompletions,
            Self::ResponseToChat | Self::ResponseToChatResponse => ApiType::Response,
        }
    }

    pub fn target(self) -> ApiType {
        self.inverse().source()
    }

    pub fn kind(self) -> PayloadKind {
        match self {
            Self::ChatToResponse | Self::ResponseToChat => PayloadKind::Request,
            Self::ChatToResponseResponse | Self::ResponseToChatResponse => PayloadKind::Response,
        }
    }
}

impl fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationMode {
    Translate,
    PassThrough,
}

impl TranslationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TranslationMode::Translate => "translate",
            TranslationMode::PassThrough => "pass_through",
        }
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of direction resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Translate(TranslationDirection),
    PassThrough,
}

impl Resolution {
    pub fn mode(self) -> TranslationMode {
        match self {
            Resolution::Translate(_) => TranslationMode::Translate,
            Resolution::PassThrough => TranslationMode::PassThrough,
        }
    }

    pub fn direction(self) -> Option<TranslationDirection> {
        match self {
            Resolution::Translate(direction) => Some(direction),
            Resolution::PassThrough => None,
        }
    }
}

/// Pick the translation direction for a payload currently in `source` that must end up
/// in `target`. Equal dialects always pass through.
pub fn resolve_direction(source: ApiType, target: ApiType, kind: PayloadKind) -> Resolution {
    if source == target {
        return Resolution::PassThrough;
    }

    let direction = match (source, kind) {
        (ApiType::ChatCompletions, PayloadKind::Request) => TranslationDirection::ChatToResponse,
        (ApiType::Response, PayloadKind::Request) => TranslationDirection::ResponseToChat,
        (ApiType::ChatCompletions, PayloadKind::Response) => {
            TranslationDirection::ChatToResponseResponse
        }
        (ApiType::Response, PayloadKind::Response) => TranslationDirection::ResponseToChatResponse,
    };

    Resolution::Translate(direction)
}
