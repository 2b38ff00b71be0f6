//! Value objects of the participant session.

use std::fmt;

use crate::error::ValidationError;

/// Quiz identifier as typed by the participant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuizId(String);

/// PIN handed out by the quiz host
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pin(String);

/// Participant name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

macro_rules! text_value_object {
    ($name:ident) => {
        impl $name {
            /// Returns `None` for blank input.
            pub fn parse(value: &str) -> Option<Self> {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_value_object!(QuizId);
text_value_object!(Pin);
text_value_object!(Username);

/// Server-assigned question identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(i64);

impl QuestionId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a question's option list, sent back verbatim when chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionToken(i64);

impl OptionToken {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated join parameters, the scope of one push subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub quiz_id: QuizId,
    pub pin: Pin,
    pub username: Username,
}

impl JoinRequest {
    /// Validate the three join fields
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming every blank field.
    pub fn new(quiz_id: &str, pin: &str, username: &str) -> Result<Self, ValidationError> {
        let quiz_id_vo = QuizId::parse(quiz_id);
        let pin_vo = Pin::parse(pin);
        let username_vo = Username::parse(username);

        match (quiz_id_vo, pin_vo, username_vo) {
            (Some(quiz_id), Some(pin), Some(username)) => Ok(Self {
                quiz_id,
                pin,
                username,
            }),
            (quiz_id, pin, username) => {
                let missing = [
                    ("quizId", quiz_id.is_none()),
                    ("pin", pin.is_none()),
                    ("username", username.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, is_missing)| is_missing.then_some(field))
                .collect();
                Err(ValidationError { missing })
            }
        }
    }
}
