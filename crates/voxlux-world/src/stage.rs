//! Per-world Stage Machine.
//!
//! ```text
//! Intro -(timer)-> Sun -> Moon -> GoldenThread -> Extra(0..n)
//!     -> QuizActive -(passed)-> FinalRitual
//!                   -(failed)-> Exited
//!     -> Completed                     (no quiz)
//! ```

use serde::{Deserialize, Serialize};
use voxlux_content::domain::world::SlotRef;

/// A stage of a mounted world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "index", rename_all = "snake_case")]
pub enum Stage {
    /// Narrative intro; left only by the presentation timer.
    Intro,
    /// `sun_content`.
    Sun,
    /// `moon_content`.
    Moon,
    /// `golden_thread`.
    GoldenThread,
    /// `extra_modules[index]`.
    Extra(usize),
    /// The world's quiz is being taken.
    QuizActive,
    /// Diploma ritual after a passed quiz. Terminal.
    FinalRitual,
    /// Content finished and there was no quiz. Terminal.
    Completed,
    /// The quiz was failed; the view must be left. Terminal.
    Exited,
}

impl Stage {
    /// The content slot shown in this stage.
    #[must_use]
    pub fn slot(self) -> Option<SlotRef> {
        match self {
            Self::Sun => Some(SlotRef::Sun),
            Self::Moon => Some(SlotRef::Moon),
            Self::GoldenThread => Some(SlotRef::GoldenThread),
            Self::Extra(i) => Some(SlotRef::Extra(i)),
            _ => None,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::FinalRitual | Self::Completed | Self::Exited)
    }
}

/// Side effect a transition asks the caller to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEffect {
    /// Record the world as complete. Raised at most once per machine.
    WorldCompleted,
    /// Leave the world view; a new mount starts from `Intro`.
    ExitView,
}

/// Result of the world's quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizOutcome {
    /// Score reached the threshold.
    Passed,
    /// Score fell short.
    Failed,
}

/// Whether the mounted world has a quiz. Starts `Unknown` until the
/// quiz lookup settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizAvailability {
    /// Lookup still in flight.
    #[default]
    Unknown,
    /// A quiz follows the content.
    Available,
    /// No quiz; the world completes after its last content stage.
    Absent,
}

/// Sequential stage machine for one mounted world.
#[derive(Debug, Clone)]
pub struct StageMachine {
    stage: Stage,
    extra_count: usize,
    quiz: QuizAvailability,
    completion_raised: bool,
}

impl StageMachine {
    /// Starts in `Intro`. Until [`StageMachine::set_quiz_available`] is
    /// called, advancing past the last content stage holds in place.
    #[must_use]
    pub fn new(extra_count: usize) -> Self {
        Self {
            stage: Stage::Intro,
            extra_count,
            quiz: QuizAvailability::Unknown,
            completion_raised: false,
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Number of extra modules.
    #[must_use]
    pub fn extra_count(&self) -> usize {
        self.extra_count
    }

    /// Current knowledge about the world's quiz.
    #[must_use]
    pub fn quiz_availability(&self) -> QuizAvailability {
        self.quiz
    }

    /// Records whether the world has a quiz.
    pub fn set_quiz_available(&mut self, available: bool) {
        self.quiz = if available {
            QuizAvailability::Available
        } else {
            QuizAvailability::Absent
        };
    }

    /// Whether the next advance would leave the content while quiz
    /// availability is still unknown.
    #[must_use]
    pub fn awaiting_quiz_availability(&self) -> bool {
        self.quiz == QuizAvailability::Unknown && self.stage == self.last_content_stage()
    }

    /// Updates the extra count after remote overrides land. A current
    /// extra stage past the new end moves to the last remaining content.
    pub fn set_extra_count(&mut self, extra_count: usize) {
        self.extra_count = extra_count;
        if let Stage::Extra(i) = self.stage
            && i >= extra_count
        {
            self.stage = self.last_content_stage();
        }
    }

    /// Fires the intro timer. Returns whether a transition happened.
    pub fn intro_elapsed(&mut self) -> bool {
        if self.stage == Stage::Intro {
            self.stage = Stage::Sun;
            true
        } else {
            false
        }
    }

    /// User "advance" action. A no-op in `Intro`, `QuizActive` and terminal
    /// stages, and on the last content stage while quiz availability is
    /// unknown.
    pub fn advance(&mut self) -> Option<StageEffect> {
        match self.stage {
            Stage::Sun => self.stage = Stage::Moon,
            Stage::Moon => self.stage = Stage::GoldenThread,
            Stage::GoldenThread if self.extra_count > 0 => self.stage = Stage::Extra(0),
            Stage::Extra(i) if i + 1 < self.extra_count => self.stage = Stage::Extra(i + 1),
            Stage::GoldenThread | Stage::Extra(_) => return self.end_of_content(),
            Stage::Intro
            | Stage::QuizActive
            | Stage::FinalRitual
            | Stage::Completed
            | Stage::Exited => {}
        }
        None
    }

    /// User "back" action: one step backwards. Returns whether the stage
    /// changed. Nothing moves back from `Intro` or a terminal stage.
    pub fn back(&mut self) -> bool {
        let previous = match self.stage {
            Stage::Sun => Stage::Intro,
            Stage::Moon => Stage::Sun,
            Stage::GoldenThread => Stage::Moon,
            Stage::Extra(0) => Stage::GoldenThread,
            Stage::Extra(i) => Stage::Extra(i - 1),
            Stage::QuizActive => self.last_content_stage(),
            Stage::Intro | Stage::FinalRitual | Stage::Completed | Stage::Exited => return false,
        };
        self.stage = previous;
        true
    }

    /// Feeds the quiz result. Ignored outside `QuizActive`.
    pub fn quiz_result(&mut self, outcome: QuizOutcome) -> Option<StageEffect> {
        if self.stage != Stage::QuizActive {
            return None;
        }
        match outcome {
            QuizOutcome::Passed => {
                self.stage = Stage::FinalRitual;
                self.raise_completion()
            }
            QuizOutcome::Failed => {
                self.stage = Stage::Exited;
                Some(StageEffect::ExitView)
            }
        }
    }

    fn end_of_content(&mut self) -> Option<StageEffect> {
        match self.quiz {
            QuizAvailability::Unknown => None,
            QuizAvailability::Available => {
                self.stage = Stage::QuizActive;
                None
            }
            QuizAvailability::Absent => {
                self.stage = Stage::Completed;
                self.raise_completion()
            }
        }
    }

    fn raise_completion(&mut self) -> Option<StageEffect> {
        if self.completion_raised {
            return None;
        }
        self.completion_raised = true;
        Some(StageEffect::WorldCompleted)
    }

    fn last_content_stage(&self) -> Stage {
        match self.extra_count {
            0 => Stage::GoldenThread,
            n => Stage::Extra(n - 1),
        }
    }
}
