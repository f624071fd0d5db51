use serde::{Deserialize, Serialize};

use crate::autocomplete::AutoCompleteResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompleteRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompleteResponse {
    pub input_text: String,
    pub output_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecuteResponse {
    pub text: String,
    pub handled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandListResponse {
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryResponse {
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    ListCommands,
    Complete(CompleteRequest),
    Execute(ExecuteRequest),
    History,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    ListCommands(CommandListResponse),
    Complete(CompleteResponse),
    Execute(ExecuteResponse),
    History(HistoryResponse),
}

impl From<AutoCompleteResult> for CompleteResponse {
    fn from(value: AutoCompleteResult) -> Self {
        Self {
            input_text: value.input_text,
            output_text: value.output_text,
        }
    }
}
