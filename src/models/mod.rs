//! Data Transfer Objects
//!
//! Request and response types exchanged with the analysis API.
//! The client does not enforce invariants on these beyond decoding.

mod analysis;
mod assistant;
mod history;
mod number;
mod preset;
mod user;

pub use analysis::{
    AiJudgeScore, AnalysisEnvelope, AnalysisResult, CommunicationCycles, CommunicationMetrics,
    EmotionDictionary, EmotionPoint, EmotionTimeline, FamilyRoles, HiddenEmotion, NeedsMap,
    PresetSection, PresetSummary, PresetValidation, ProfessionalGrowth, PsychologicalSafety,
    SafetyCheck, ScoreBreakdown, SkillAssessment, SocialCompass, Subtlety, Summary,
    TeamAnalytics,
};
pub use assistant::{ChatReply, SuggestedResponse};
pub use history::{DeleteResponse, HistoryDetail, HistoryItem};
pub use preset::{AnalysisCard, Preset};
pub use user::{LoginResponse, RegisterResponse, User};

pub(crate) use assistant::{ChatRequest, SuggestionsRequest, SuggestionsResponse};
pub(crate) use user::{LoginRequest, RegisterRequest};
