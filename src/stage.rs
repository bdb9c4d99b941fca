//! The five fixed pipeline stages and their presentation metadata.

use std::fmt;

static ORDER: [Stage; 5] = Stage::ALL;

/// One step of the prompt pipeline. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Description,
    Missions,
    Technologies,
    Enhancements,
    TransitionPlan,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Description,
        Stage::Missions,
        Stage::Technologies,
        Stage::Enhancements,
        Stage::TransitionPlan,
    ];

    /// 1-based position in the pipeline.
    pub fn position(self) -> usize {
        match self {
            Stage::Description => 1,
            Stage::Missions => 2,
            Stage::Technologies => 3,
            Stage::Enhancements => 4,
            Stage::TransitionPlan => 5,
        }
    }

    /// Stable machine-readable key, used in structured log fields.
    pub fn key(self) -> &'static str {
        match self {
            Stage::Description => "description",
            Stage::Missions => "missions",
            Stage::Technologies => "technologies",
            Stage::Enhancements => "enhancements",
            Stage::TransitionPlan => "transition_plan",
        }
    }

    /// Section heading shown on the console and in exported markdown.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Description => "Job Description",
            Stage::Missions => "Missions, Deliverables & Tasks",
            Stage::Technologies => "Technology Recommendations",
            Stage::Enhancements => "AI Augmentation Opportunities",
            Stage::TransitionPlan => "Transition to AI-Augmented Role",
        }
    }

    /// Progress line printed before the stage's request is sent.
    pub fn progress_message(self) -> &'static str {
        match self {
            Stage::Description => "Generating job description...",
            Stage::Missions => "Extracting missions and tasks...",
            Stage::Technologies => "Recommending technologies...",
            Stage::Enhancements => "Identifying AI enhancements...",
            Stage::TransitionPlan => "Creating transition plan...",
        }
    }

    /// Delimiter line fencing this stage's output when it is embedded in a
    /// later prompt.
    pub fn delimiter(self) -> &'static str {
        match self {
            Stage::Description => "---DESCRIPTION---",
            Stage::Missions => "---MISSIONS---",
            Stage::Technologies => "---TECHNOLOGIES---",
            Stage::Enhancements => "---ENHANCEMENTS---",
            Stage::TransitionPlan => "---TRANSITION_PLAN---",
        }
    }

    /// Placeholder used when rendering templates without real outputs.
    pub fn placeholder(self) -> &'static str {
        match self {
            Stage::Description => "{{DESCRIPTION}}",
            Stage::Missions => "{{MISSIONS}}",
            Stage::Technologies => "{{TECHNOLOGIES}}",
            Stage::Enhancements => "{{ENHANCEMENTS}}",
            Stage::TransitionPlan => "{{TRANSITION_PLAN}}",
        }
    }

    /// Stages that run before this one.
    pub fn predecessors(self) -> &'static [Stage] {
        &ORDER[..self.position() - 1]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Description => "Description",
            Stage::Missions => "Missions",
            Stage::Technologies => "Technologies",
            Stage::Enhancements => "Enhancements",
            Stage::TransitionPlan => "TransitionPlan",
        };
        f.write_str(name)
    }
}
