// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four answer slots every question offers.
/// Serialized as the sheet column names ("Option1" .. "Option4").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionSlot {
    Option1,
    Option2,
    Option3,
    Option4,
}

impl OptionSlot {
    pub const ALL: [OptionSlot; 4] = [
        OptionSlot::Option1,
        OptionSlot::Option2,
        OptionSlot::Option3,
        OptionSlot::Option4,
    ];

    /// Column name in the question sheet.
    pub fn as_str(self) -> &'static str {
        match self {
            OptionSlot::Option1 => "Option1",
            OptionSlot::Option2 => "Option2",
            OptionSlot::Option3 => "Option3",
            OptionSlot::Option4 => "Option4",
        }
    }

    /// Zero-based position inside `QuestionRecord::options`.
    pub fn position(self) -> usize {
        match self {
            OptionSlot::Option1 => 0,
            OptionSlot::Option2 => 1,
            OptionSlot::Option3 => 2,
            OptionSlot::Option4 => 3,
        }
    }
}

impl fmt::Display for OptionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A multiple-choice question as loaded from the question sheet.
///
/// Identity is the position in the loaded sequence; records never change
/// after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRecord {
    /// The question text. Never empty.
    pub prompt: String,

    /// Texts for `Option1` .. `Option4`. Missing cells are empty strings.
    pub options: [String; 4],
}

impl QuestionRecord {
    pub fn option(&self, slot: OptionSlot) -> &str {
        &self.options[slot.position()]
    }
}
