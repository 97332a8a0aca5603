//! Session state machine: current question, selected answers, and the
//! navigation affordances derived from them.

use std::sync::Arc;

use serde::Serialize;

use crate::models::{
    question::{OptionSlot, QuestionRecord},
    submission::AnswerMap,
};

/// The button shown in the "forward" position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    Next,
    Submit,
}

/// Everything a client needs to render the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub current_index: usize,
    pub total: usize,
    pub question: QuestionRecord,
    pub selected_option: Option<OptionSlot>,
    pub has_next: bool,
    pub has_previous: bool,
    pub is_last_question: bool,
    /// `has_next` and the current question is answered.
    pub can_advance: bool,
    pub primary_action: PrimaryAction,
}

/// What the session presents right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Screen {
    /// The sheet had no questions; there is nothing to navigate.
    Empty,
    Question(SessionView),
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Arc<[QuestionRecord]>,
    index: usize,
    answers: AnswerMap,
}

impl QuizSession {
    pub fn new(questions: Arc<[QuestionRecord]>) -> Self {
        Self {
            questions,
            index: 0,
            answers: AnswerMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Records `slot` for the current question, replacing any earlier choice.
    pub fn select_option(&mut self, slot: OptionSlot) {
        if self.is_empty() {
            return;
        }
        self.answers.insert(self.index, slot);
    }

    /// Moves forward once the current question is answered.
    /// Returns whether the index moved.
    pub fn go_next(&mut self) -> bool {
        if !self.has_next() || !self.answers.contains_key(&self.index) {
            return false;
        }
        self.index += 1;
        true
    }

    /// Moves back unless already at the first question.
    pub fn go_previous(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn is_last_question(&self) -> bool {
        !self.is_empty() && self.index == self.len() - 1
    }

    fn has_next(&self) -> bool {
        self.index + 1 < self.len()
    }

    pub fn screen(&self) -> Screen {
        let Some(question) = self.questions.get(self.index) else {
            return Screen::Empty;
        };

        let selected_option = self.answers.get(&self.index).copied();
        let has_next = self.has_next();
        let is_last_question = self.is_last_question();

        Screen::Question(SessionView {
            current_index: self.index,
            total: self.len(),
            question: question.clone(),
            selected_option,
            has_next,
            has_previous: self.index > 0,
            is_last_question,
            can_advance: has_next && selected_option.is_some(),
            primary_action: if is_last_question {
                PrimaryAction::Submit
            } else {
                PrimaryAction::Next
            },
        })
    }
}
