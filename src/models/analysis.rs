//! Analysis result types
//!
//! The structured result returned by every analysis endpoint. Core blocks use
//! camelCase on the wire; preset-specific blocks use snake_case.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::number::lenient_u32;
use super::preset::AnalysisCard;

/// Response envelope: `{ "result": { ... } }`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisEnvelope {
    pub result: AnalysisResult,
}

/// Full analysis of one conversation
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub emotion_timeline: EmotionTimeline,
    #[serde(default)]
    pub ai_judge_score: AiJudgeScore,
    #[serde(default)]
    pub subtleties: Vec<Subtlety>,

    /// Preset the analysis ran with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<PresetSummary>,
    /// Whether the conversation actually fits the preset
    #[serde(
        default,
        rename = "preset_validation",
        skip_serializing_if = "Option::is_none"
    )]
    pub preset_validation: Option<PresetValidation>,

    // Teen navigator
    #[serde(default, rename = "safety_check", skip_serializing_if = "Option::is_none")]
    pub safety_check: Option<SafetyCheck>,
    #[serde(
        default,
        rename = "emotion_dictionary",
        skip_serializing_if = "Option::is_none"
    )]
    pub emotion_dictionary: Option<EmotionDictionary>,
    #[serde(default, rename = "social_compass", skip_serializing_if = "Option::is_none")]
    pub social_compass: Option<SocialCompass>,

    // Family balance
    #[serde(
        default,
        rename = "communication_cycles",
        skip_serializing_if = "Option::is_none"
    )]
    pub communication_cycles: Option<CommunicationCycles>,
    #[serde(default, rename = "needs_map", skip_serializing_if = "Option::is_none")]
    pub needs_map: Option<NeedsMap>,
    #[serde(default, rename = "family_roles", skip_serializing_if = "Option::is_none")]
    pub family_roles: Option<FamilyRoles>,

    // Strategic HR
    #[serde(default, rename = "team_analytics", skip_serializing_if = "Option::is_none")]
    pub team_analytics: Option<TeamAnalytics>,
    #[serde(
        default,
        rename = "psychological_safety",
        skip_serializing_if = "Option::is_none"
    )]
    pub psychological_safety: Option<PsychologicalSafety>,
    #[serde(
        default,
        rename = "professional_growth",
        skip_serializing_if = "Option::is_none"
    )]
    pub professional_growth: Option<ProfessionalGrowth>,

    /// Blocks this client does not model yet
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub participants: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub message_count: u32,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub main_topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionTimeline {
    #[serde(default)]
    pub emotions: Vec<EmotionPoint>,
    #[serde(default)]
    pub dominant_emotion: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub emotional_shifts: u32,
}

/// One point on the emotion timeline
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EmotionPoint {
    pub time: String,
    pub emotion: String,
    /// Either a 0..1 fraction or a 0..100 percentage, depending on the model
    pub intensity: f64,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiJudgeScore {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub overall_score: u32,
    #[serde(default)]
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub verdict: String,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScoreBreakdown {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub clarity: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub empathy: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub professionalism: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub resolution: u32,
}

/// A detected implicit meaning
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Subtlety {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    /// Either a 0..1 fraction or a 0..100 percentage, depending on the model
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PresetSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom_cards: Vec<AnalysisCard>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PresetValidation {
    pub is_valid: bool,
    #[serde(default)]
    pub reason: String,
}

// ============================================
// Preset-specific blocks
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SafetyCheck {
    pub bullying_indicators: Vec<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub safety_level: u32,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmotionDictionary {
    pub hidden_emotions: Vec<HiddenEmotion>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HiddenEmotion {
    pub text: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SocialCompass {
    pub group_dynamics: String,
    pub inner_circles: Vec<String>,
    pub navigation_tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommunicationCycles {
    pub patterns: Vec<String>,
    pub trigger_points: Vec<String>,
    pub interruption_techniques: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeedsMap {
    pub expressed_needs: Vec<String>,
    pub unexpressed_needs: Vec<String>,
    pub overlap_areas: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FamilyRoles {
    pub role_distribution: Vec<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub responsibility_balance: u32,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TeamAnalytics {
    pub communication_metrics: CommunicationMetrics,
    #[serde(deserialize_with = "lenient_u32")]
    pub decision_efficiency: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub goal_achievement: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommunicationMetrics {
    #[serde(deserialize_with = "lenient_u32")]
    pub participation_rate: u32,
    pub response_time: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub engagement_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PsychologicalSafety {
    #[serde(deserialize_with = "lenient_u32")]
    pub safety_level: u32,
    pub trust_indicators: Vec<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub openness_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfessionalGrowth {
    pub skill_analysis: Vec<SkillAssessment>,
    pub growth_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SkillAssessment {
    pub skill: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub current_level: u32,
    pub development_area: String,
}

/// A preset-specific block present in a result, in display order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresetSection<'a> {
    SafetyCheck(&'a SafetyCheck),
    EmotionDictionary(&'a EmotionDictionary),
    SocialCompass(&'a SocialCompass),
    CommunicationCycles(&'a CommunicationCycles),
    NeedsMap(&'a NeedsMap),
    FamilyRoles(&'a FamilyRoles),
    TeamAnalytics(&'a TeamAnalytics),
    PsychologicalSafety(&'a PsychologicalSafety),
    ProfessionalGrowth(&'a ProfessionalGrowth),
}

impl PresetSection<'_> {
    /// Card id as used by preset `custom_cards`
    pub fn card_id(&self) -> &'static str {
        match self {
            PresetSection::SafetyCheck(_) => "safety_check",
            PresetSection::EmotionDictionary(_) => "emotion_dictionary",
            PresetSection::SocialCompass(_) => "social_compass",
            PresetSection::CommunicationCycles(_) => "communication_cycles",
            PresetSection::NeedsMap(_) => "needs_map",
            PresetSection::FamilyRoles(_) => "family_roles",
            PresetSection::TeamAnalytics(_) => "team_analytics",
            PresetSection::PsychologicalSafety(_) => "psychological_safety",
            PresetSection::ProfessionalGrowth(_) => "professional_growth",
        }
    }
}

impl AnalysisResult {
    /// Preset-specific blocks carried by this result
    pub fn preset_sections(&self) -> Vec<PresetSection<'_>> {
        let mut sections = Vec::new();

        if let Some(block) = &self.safety_check {
            sections.push(PresetSection::SafetyCheck(block));
        }
        if let Some(block) = &self.emotion_dictionary {
            sections.push(PresetSection::EmotionDictionary(block));
        }
        if let Some(block) = &self.social_compass {
            sections.push(PresetSection::SocialCompass(block));
        }
        if let Some(block) = &self.communication_cycles {
            sections.push(PresetSection::CommunicationCycles(block));
        }
        if let Some(block) = &self.needs_map {
            sections.push(PresetSection::NeedsMap(block));
        }
        if let Some(block) = &self.family_roles {
            sections.push(PresetSection::FamilyRoles(block));
        }
        if let Some(block) = &self.team_analytics {
            sections.push(PresetSection::TeamAnalytics(block));
        }
        if let Some(block) = &self.psychological_safety {
            sections.push(PresetSection::PsychologicalSafety(block));
        }
        if let Some(block) = &self.professional_growth {
            sections.push(PresetSection::ProfessionalGrowth(block));
        }

        sections
    }

    /// True when every block a report needs is populated
    pub fn is_well_formed(&self) -> bool {
        !self.summary.overview.is_empty()
            && !self.emotion_timeline.emotions.is_empty()
            && !self.emotion_timeline.dominant_emotion.is_empty()
            && self.ai_judge_score.overall_score <= 100
            && !self.ai_judge_score.verdict.is_empty()
    }

    /// Text digest of the analysis, sent as context for suggested replies
    pub fn digest(&self) -> String {
        let or_unknown = |s: &str| {
            if s.is_empty() {
                "not specified".to_string()
            } else {
                s.to_string()
            }
        };

        let topics = if self.summary.main_topics.is_empty() {
            "not specified".to_string()
        } else {
            self.summary.main_topics.join(", ")
        };

        let subtleties = if self.subtleties.is_empty() {
            "not specified".to_string()
        } else {
            self.subtleties
                .iter()
                .map(|s| format!("{}: {}", s.kind, s.message))
                .collect::<Vec<_>>()
                .join("; ")
        };

        format!(
            "Conversation analysis:\n\
             - Overview: {}\n\
             - Participants: {}\n\
             - Messages: {}\n\
             - Duration: {}\n\
             - Main topics: {}\n\
             - Dominant emotion: {}\n\
             - Emotional shifts: {}\n\
             - AI judge score: {}/100\n\
             - Recommendation: {}\n\
             - Subtleties: {}",
            or_unknown(&self.summary.overview),
            self.summary.participants,
            self.summary.message_count,
            or_unknown(&self.summary.duration),
            topics,
            or_unknown(&self.emotion_timeline.dominant_emotion),
            self.emotion_timeline.emotional_shifts,
            self.ai_judge_score.overall_score,
            or_unknown(&self.ai_judge_score.recommendation),
            subtleties,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGIC_HR_RESULT: &str = r##"{
        "summary": {
            "overview": "Weekly sync",
            "participants": 4,
            "messageCount": 31,
            "duration": "20 minutes",
            "mainTopics": ["roadmap", "hiring"]
        },
        "emotionTimeline": {
            "emotions": [
                {"time": "10:00", "emotion": "Focus", "intensity": 70, "color": "#FFD700"}
            ],
            "dominantEmotion": "Focus",
            "emotionalShifts": 1
        },
        "aiJudgeScore": {
            "overallScore": 78,
            "breakdown": {"clarity": 80, "empathy": 70, "professionalism": 85, "resolution": 77},
            "verdict": "Solid meeting",
            "recommendation": "Rotate the facilitator"
        },
        "subtleties": [
            {"type": "Hesitation", "message": "Deadline was avoided", "confidence": 0.6, "context": "Q3 plan"}
        ],
        "preset": {"id": "strategic_hr", "name": "Strategic HR", "custom_cards": []},
        "preset_validation": {"is_valid": true, "reason": "Work conversation"},
        "team_analytics": {
            "communication_metrics": {"participation_rate": 85, "response_time": "2-3 minutes", "engagement_score": 80},
            "decision_efficiency": 75,
            "goal_achievement": 90
        },
        "professional_growth": {
            "skill_analysis": [{"skill": "Active listening", "current_level": 4, "development_area": "Paraphrasing"}],
            "growth_recommendations": ["Listening workshop"]
        },
        "meeting_minutes": {"items": 3}
    }"##;

    #[test]
    fn test_decodes_core_and_preset_blocks() {
        let result: AnalysisResult = serde_json::from_str(STRATEGIC_HR_RESULT).unwrap();

        assert_eq!(result.summary.message_count, 31);
        assert_eq!(result.emotion_timeline.dominant_emotion, "Focus");
        assert_eq!(result.ai_judge_score.breakdown.professionalism, 85);
        assert_eq!(result.subtleties[0].kind, "Hesitation");
        assert!(result.preset_validation.as_ref().unwrap().is_valid);

        let analytics = result.team_analytics.as_ref().unwrap();
        assert_eq!(analytics.communication_metrics.response_time, "2-3 minutes");
        assert!(result.safety_check.is_none());
    }

    #[test]
    fn test_unknown_blocks_are_kept() {
        let result: AnalysisResult = serde_json::from_str(STRATEGIC_HR_RESULT).unwrap();
        assert!(result.extra.contains_key("meeting_minutes"));
        assert!(!result.extra.contains_key("summary"));

        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["meeting_minutes"]["items"], 3);
        assert_eq!(encoded["aiJudgeScore"]["overallScore"], 78);
    }

    #[test]
    fn test_preset_sections_in_display_order() {
        let result: AnalysisResult = serde_json::from_str(STRATEGIC_HR_RESULT).unwrap();
        let ids: Vec<_> = result.preset_sections().iter().map(|s| s.card_id()).collect();
        assert_eq!(ids, vec!["team_analytics", "professional_growth"]);
    }

    #[test]
    fn test_sparse_result_decodes_with_defaults() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"summary": {"overview": "Short"}}"#).unwrap();
        assert_eq!(result.summary.overview, "Short");
        assert!(result.subtleties.is_empty());
        assert!(!result.is_well_formed());
    }

    #[test]
    fn test_fractional_scores_are_rounded() {
        let json = r#"{
            "summary": {"overview": "Call", "participants": 2.0, "messageCount": 14.6},
            "aiJudgeScore": {
                "overallScore": 78.5,
                "breakdown": {"clarity": 80.2, "empathy": "71", "professionalism": null, "resolution": 65}
            },
            "family_roles": {"responsibility_balance": 49.5},
            "professional_growth": {"skill_analysis": [{"skill": "Focus", "current_level": 3.5}]}
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.summary.participants, 2);
        assert_eq!(result.summary.message_count, 15);
        assert_eq!(result.ai_judge_score.overall_score, 79);
        assert_eq!(result.ai_judge_score.breakdown.clarity, 80);
        assert_eq!(result.ai_judge_score.breakdown.empathy, 71);
        assert_eq!(result.ai_judge_score.breakdown.professionalism, 0);
        assert_eq!(result.family_roles.unwrap().responsibility_balance, 50);
        assert_eq!(
            result.professional_growth.unwrap().skill_analysis[0].current_level,
            4
        );
    }

    #[test]
    fn test_incomplete_subtlety_keeps_result() {
        let json = r#"{
            "subtleties": [
                {"type": "Irony"},
                {"message": "Left on read", "confidence": 80}
            ]
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.subtleties.len(), 2);
        assert_eq!(result.subtleties[0].kind, "Irony");
        assert!(result.subtleties[0].message.is_empty());
        assert_eq!(result.subtleties[0].confidence, 0.0);
        assert!(result.subtleties[1].kind.is_empty());
        assert_eq!(result.subtleties[1].confidence, 80.0);
    }

    #[test]
    fn test_digest_mentions_key_facts() {
        let result: AnalysisResult = serde_json::from_str(STRATEGIC_HR_RESULT).unwrap();
        let digest = result.digest();
        assert!(digest.contains("Participants: 4"));
        assert!(digest.contains("Main topics: roadmap, hiring"));
        assert!(digest.contains("AI judge score: 78/100"));
        assert!(digest.contains("Hesitation: Deadline was avoided"));

        let empty = AnalysisResult::default().digest();
        assert!(empty.contains("Overview: not specified"));
    }
}
