//! Two-choice trivia answered by pointing at a choice box.
//!
//! The quiz alternates between two phases. While a question is active the
//! first accepted selection scores it and starts the feedback phase; during
//! feedback every selection is ignored until the replacement delay elapses
//! and a freshly sampled question becomes active.

use crate::{
    constants::{
        QUIZ_BANNER_HEIGHT, QUIZ_BANNER_MARGIN, QUIZ_BANNER_Y, QUIZ_CHOICE_BOTTOM_OFFSET, QUIZ_CHOICE_GAP,
        QUIZ_CHOICE_HEIGHT, QUIZ_CHOICE_WIDTH, QUIZ_DEBOUNCE_MS, QUIZ_FEEDBACK_WINDOW_MS, QUIZ_QUESTION_DELAY_MS,
    },
    interaction::{CanvasSize, Region},
    Error, Result,
};
use log::info;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// One trivia question with exactly two choices
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizQuestion {
    #[serde(alias = "soru")]
    pub text: String,
    #[serde(alias = "secenekler")]
    pub choices: [String; 2],
    #[serde(alias = "dogru")]
    pub correct_index: usize,
}

/// Static set of questions loaded at startup
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<QuizQuestion>,
}

impl QuestionBank {
    /// # Errors
    ///
    /// Returns an error if any question has a correct index other than 0 or 1
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self> {
        if let Some((i, q)) = questions.iter().enumerate().find(|(_, q)| q.correct_index > 1) {
            return Err(Error::Quiz(format!(
                "Question {i} ('{}') has correct index {}",
                q.text, q.correct_index
            )));
        }
        Ok(Self { questions })
    }

    /// Parse a JSON array of question records
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid records
    pub fn from_json(json: &str) -> Result<Self> {
        let questions: Vec<QuizQuestion> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Uniformly sample a question
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuestionBank` if there is nothing to sample
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<QuizQuestion> {
        if self.questions.is_empty() {
            return Err(Error::EmptyQuestionBank);
        }
        let index = rng.gen_range(0..self.questions.len());
        Ok(self.questions[index].clone())
    }
}

/// Quiz timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTimings {
    /// Minimum spacing between accepted selections
    pub debounce: Duration,
    /// Delay from a selection to the next question
    pub question_delay: Duration,
    /// How long the correct/incorrect overlay stays up
    pub feedback_window: Duration,
}

impl Default for QuizTimings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(QUIZ_DEBOUNCE_MS),
            question_delay: Duration::from_millis(QUIZ_QUESTION_DELAY_MS),
            feedback_window: Duration::from_millis(QUIZ_FEEDBACK_WINDOW_MS),
        }
    }
}

/// A recorded answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub choice_index: usize,
    pub correct: bool,
    pub at: Instant,
}

/// Quiz phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for an answer
    QuestionActive,
    /// Showing the result; the next question arrives at `next_question_at`
    FeedbackShown { next_question_at: Instant },
}

/// Feedback overlay variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

impl Feedback {
    /// Overlay text, in the language of the bundled question bank
    pub const fn label(self) -> &'static str {
        match self {
            Self::Correct => "Doğru!",
            Self::Incorrect => "Yanlış!",
        }
    }
}

/// Mutable quiz state, driven from the frame loop
#[derive(Debug, Clone)]
pub struct QuizState {
    question: QuizQuestion,
    score: u32,
    phase: QuizPhase,
    last_selection: Option<Selection>,
    timings: QuizTimings,
    wrong_answer_penalty: u32,
}

impl QuizState {
    pub fn new(first_question: QuizQuestion, timings: QuizTimings) -> Self {
        Self {
            question: first_question,
            score: 0,
            phase: QuizPhase::QuestionActive,
            last_selection: None,
            timings,
            wrong_answer_penalty: 0,
        }
    }

    /// Points removed for a wrong answer (score never drops below zero)
    pub const fn with_penalty(mut self, penalty: u32) -> Self {
        self.wrong_answer_penalty = penalty;
        self
    }

    pub const fn question(&self) -> &QuizQuestion {
        &self.question
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub const fn last_selection(&self) -> Option<&Selection> {
        self.last_selection.as_ref()
    }

    pub const fn accepts_selection(&self) -> bool {
        matches!(self.phase, QuizPhase::QuestionActive)
    }

    fn debouncing(&self, now: Instant) -> bool {
        self.last_selection
            .is_some_and(|s| now.saturating_duration_since(s.at) < self.timings.debounce)
    }

    /// Answer the current question
    ///
    /// Returns the recorded selection, or `None` if the selection was ignored
    /// because feedback is showing or the debounce window is still open.
    pub fn select(&mut self, choice_index: usize, now: Instant) -> Option<Selection> {
        if !self.accepts_selection() || self.debouncing(now) || choice_index > 1 {
            return None;
        }

        let correct = choice_index == self.question.correct_index;
        if correct {
            self.score += 1;
        } else {
            self.score = self.score.saturating_sub(self.wrong_answer_penalty);
        }

        let selection = Selection {
            choice_index,
            correct,
            at: now,
        };
        self.last_selection = Some(selection);
        self.phase = QuizPhase::FeedbackShown {
            next_question_at: now + self.timings.question_delay,
        };
        info!(
            "Answered '{}' with choice {}: {} (score {})",
            self.question.text,
            choice_index,
            if correct { "correct" } else { "incorrect" },
            self.score
        );
        Some(selection)
    }

    /// Advance timers; returns true when a new question became active
    ///
    /// # Errors
    ///
    /// Returns an error if the bank is empty when a new question is due
    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, bank: &QuestionBank, rng: &mut R) -> Result<bool> {
        match self.phase {
            QuizPhase::FeedbackShown { next_question_at } if now >= next_question_at => {
                self.question = bank.random(rng)?;
                self.phase = QuizPhase::QuestionActive;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Overlay to draw right now, if the feedback window is open
    pub fn feedback(&self, now: Instant) -> Option<Feedback> {
        let selection = self.last_selection?;
        if now.saturating_duration_since(selection.at) >= self.timings.feedback_window {
            return None;
        }
        Some(if selection.correct {
            Feedback::Correct
        } else {
            Feedback::Incorrect
        })
    }
}

/// Question banner rectangle
pub fn banner_region(canvas: CanvasSize) -> Region {
    Region::new(
        QUIZ_BANNER_MARGIN,
        QUIZ_BANNER_Y - QUIZ_BANNER_HEIGHT / 2.0,
        (canvas.width - 2.0 * QUIZ_BANNER_MARGIN).max(0.0),
        QUIZ_BANNER_HEIGHT,
    )
}

/// Left and right choice boxes, tagged with their choice index
pub fn choice_regions(canvas: CanvasSize) -> [(Region, usize); 2] {
    let top = canvas.height - QUIZ_CHOICE_BOTTOM_OFFSET;
    let left_x = canvas.width / 2.0 - QUIZ_CHOICE_WIDTH - QUIZ_CHOICE_GAP / 2.0;
    let right_x = canvas.width / 2.0 + QUIZ_CHOICE_GAP / 2.0;
    [
        (Region::new(left_x, top, QUIZ_CHOICE_WIDTH, QUIZ_CHOICE_HEIGHT), 0),
        (Region::new(right_x, top, QUIZ_CHOICE_WIDTH, QUIZ_CHOICE_HEIGHT), 1),
    ]
}
