//! Contract between the semantic token pipeline and the classification backend.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ClassifyResult;

/// A substring of a file to classify, in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRequest {
    pub file: String,
    pub start: u32,
    pub length: u32,
}

/// Lexer state at the end of the classified range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EndOfLineState {
    #[default]
    None,
    InMultiLineCommentTrivia,
    InSingleQuoteStringLiteral,
    InDoubleQuoteStringLiteral,
    InTemplateHeadOrNoSubstitutionTemplate,
    InTemplateMiddleOrTail,
    InTemplateSubstitutionPosition,
}

impl TryFrom<u8> for EndOfLineState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => EndOfLineState::None,
            1 => EndOfLineState::InMultiLineCommentTrivia,
            2 => EndOfLineState::InSingleQuoteStringLiteral,
            3 => EndOfLineState::InDoubleQuoteStringLiteral,
            4 => EndOfLineState::InTemplateHeadOrNoSubstitutionTemplate,
            5 => EndOfLineState::InTemplateMiddleOrTail,
            6 => EndOfLineState::InTemplateSubstitutionPosition,
            other => return Err(format!("unknown end-of-line state {other}")),
        })
    }
}

impl From<EndOfLineState> for u8 {
    fn from(state: EndOfLineState) -> Self {
        state as u8
    }
}

/// Successful classification of one request range.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResponse {
    #[serde(default)]
    pub end_of_line_state: EndOfLineState,
    /// Flat `offset, length, classification` triplets in emission order
    pub spans: Vec<u32>,
}

/// Backend able to classify ranges of a file.
///
/// Any error, including a missing response body or the cancellation signal
/// firing, aborts the whole semantic tokens operation.
pub trait ClassificationSource: Send + Sync {
    fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = ClassifyResult<ClassificationResponse>> + Send;
}

impl<T: ClassificationSource> ClassificationSource for Arc<T> {
    fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = ClassifyResult<ClassificationResponse>> + Send {
        (**self).classify(request, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_body_deserializes_from_backend_shape() {
        let body = json!({ "spans": [6, 1, 257, 12, 3, 11], "endOfLineState": 1 });
        let response: ClassificationResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.spans, vec![6, 1, 257, 12, 3, 11]);
        assert_eq!(
            response.end_of_line_state,
            EndOfLineState::InMultiLineCommentTrivia
        );
    }

    #[test]
    fn missing_end_of_line_state_defaults_to_none() {
        let response: ClassificationResponse =
            serde_json::from_value(json!({ "spans": [] })).unwrap();
        assert_eq!(response.end_of_line_state, EndOfLineState::None);
    }

    #[test]
    fn unknown_end_of_line_state_is_rejected() {
        let result =
            serde_json::from_value::<ClassificationResponse>(json!({ "spans": [], "endOfLineState": 9 }));
        assert!(result.is_err());
    }
}
