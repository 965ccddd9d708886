//! Demo payloads
//!
//! Canned data substituted for a failed call when the client runs in demo
//! mode. Callers always receive it wrapped in [`crate::client::Outcome::Demo`].

use crate::models::{
    AiJudgeScore, AnalysisResult, EmotionPoint, EmotionTimeline, HistoryItem, Preset,
    ScoreBreakdown, SuggestedResponse, Subtlety, Summary,
};

fn emotion(time: &str, emotion: &str, intensity: f64, color: &str) -> EmotionPoint {
    EmotionPoint {
        time: time.to_string(),
        emotion: emotion.to_string(),
        intensity,
        color: color.to_string(),
    }
}

fn topics() -> Vec<String> {
    vec![
        "Communication".to_string(),
        "Emotions".to_string(),
        "Mutual understanding".to_string(),
    ]
}

fn sincere_interest() -> Vec<Subtlety> {
    vec![Subtlety {
        kind: "Emotion".to_string(),
        message: "Signs of sincere interest".to_string(),
        confidence: 0.9,
        context: "Emoji and positive wording".to_string(),
    }]
}

/// `scores` = overall, clarity, empathy, professionalism, resolution
fn judge(scores: [u32; 5], verdict: &str) -> AiJudgeScore {
    let [overall, clarity, empathy, professionalism, resolution] = scores;
    AiJudgeScore {
        overall_score: overall,
        breakdown: ScoreBreakdown {
            clarity,
            empathy,
            professionalism,
            resolution,
        },
        verdict: verdict.to_string(),
        recommendation: "Keep it up!".to_string(),
    }
}

/// Result for a pasted conversation; message count follows the input
pub fn text_analysis(text: &str) -> AnalysisResult {
    AnalysisResult {
        summary: Summary {
            overview: "Positive emotions dominate the conversation. Both participants show good communication skills.".to_string(),
            participants: 2,
            message_count: text.split_whitespace().count() as u32,
            duration: "5 minutes".to_string(),
            main_topics: topics(),
        },
        emotion_timeline: EmotionTimeline {
            emotions: vec![
                emotion("00:00", "Joy", 0.8, "#10b981"),
                emotion("00:02", "Interest", 0.7, "#3b82f6"),
                emotion("00:04", "Happiness", 0.9, "#f59e0b"),
            ],
            dominant_emotion: "Happiness".to_string(),
            emotional_shifts: 3,
        },
        ai_judge_score: judge([85, 90, 85, 80, 85], "Excellent communication"),
        subtleties: sincere_interest(),
        ..Default::default()
    }
}

/// Result for a single uploaded file
pub fn file_analysis() -> AnalysisResult {
    AnalysisResult {
        summary: Summary {
            overview: "The file analysis shows positive emotions dominate the conversation.".to_string(),
            participants: 2,
            message_count: 50,
            duration: "5 minutes".to_string(),
            main_topics: topics(),
        },
        emotion_timeline: EmotionTimeline {
            emotions: vec![
                emotion("00:00", "Joy", 0.8, "#10b981"),
                emotion("00:02", "Interest", 0.7, "#3b82f6"),
            ],
            dominant_emotion: "Joy".to_string(),
            emotional_shifts: 2,
        },
        ai_judge_score: judge([80, 85, 80, 75, 80], "Good communication"),
        subtleties: sincere_interest(),
        ..Default::default()
    }
}

/// Result for a batch of screenshots
pub fn multi_file_analysis() -> AnalysisResult {
    AnalysisResult {
        summary: Summary {
            overview: "Across the screenshots, positive emotions dominate the conversation.".to_string(),
            participants: 3,
            message_count: 75,
            duration: "10 minutes".to_string(),
            main_topics: topics(),
        },
        emotion_timeline: EmotionTimeline {
            emotions: vec![
                emotion("00:00", "Joy", 0.8, "#10b981"),
                emotion("00:05", "Interest", 0.7, "#3b82f6"),
                emotion("00:10", "Happiness", 0.9, "#f59e0b"),
            ],
            dominant_emotion: "Happiness".to_string(),
            emotional_shifts: 3,
        },
        ai_judge_score: judge([85, 90, 85, 80, 85], "Excellent communication"),
        subtleties: sincere_interest(),
        ..Default::default()
    }
}

pub fn history() -> Vec<HistoryItem> {
    let entry = |id: &str, date: &str, emotion: &str, score: u32, messages: u32, participants: u32, file_type: &str| {
        HistoryItem {
            id: id.to_string(),
            title: format!("Analysis {}", id),
            date: date.to_string(),
            dominant_emotion: emotion.to_string(),
            overall_score: score,
            message_count: messages,
            participants,
            file_type: file_type.to_string(),
        }
    };

    vec![
        entry("1", "2023-10-27", "Happiness", 85, 120, 5, "text"),
        entry("2", "2023-10-26", "Shame", 70, 80, 3, "image"),
        entry("3", "2023-10-25", "Fear", 90, 150, 6, "text"),
    ]
}

pub fn presets() -> Vec<Preset> {
    let preset = |id: &str,
                  name: &str,
                  description: &str,
                  icon: &str,
                  color: &str,
                  audience: &str,
                  style: [&str; 3],
                  focus: [&str; 3],
                  temperature: f32| Preset {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        target_audience: Some(audience.to_string()),
        report_style: Some(style.iter().map(|s| s.to_string()).collect()),
        focus_analysis: Some(focus.iter().map(|s| s.to_string()).collect()),
        temperature,
        custom_cards: None,
    };

    vec![
        preset(
            "teen_navigator",
            "Teen Navigator",
            "Analysis of teenage communication",
            "👥",
            "slate",
            "Teenagers 13-18",
            ["Friendly", "Clear", "Motivating"],
            ["Emotional state", "Social skills", "Conflicts"],
            0.7,
        ),
        preset(
            "hr_assessment",
            "HR Assessment",
            "Soft-skill analysis of candidates",
            "💼",
            "blue",
            "HR specialists and recruiters",
            ["Professional", "Detailed", "Objective"],
            ["Communication skills", "Emotional intelligence", "Professionalism"],
            0.5,
        ),
        preset(
            "relationship_counselor",
            "Relationship Counselor",
            "Analysis of couple relationships",
            "💕",
            "emerald",
            "Couples and family counselors",
            ["Empathetic", "Constructive", "Supportive"],
            ["Emotional connection", "Conflicts", "Mutual understanding"],
            0.6,
        ),
    ]
}

pub fn suggested_responses() -> Vec<SuggestedResponse> {
    vec![
        SuggestedResponse {
            text: "I see where you're coming from! 🤝".to_string(),
            reason: "Shows empathy and openness to dialogue".to_string(),
        },
        SuggestedResponse {
            text: "Tell me more, your opinion matters to me 💬".to_string(),
            reason: "Encourages open communication".to_string(),
        },
        SuggestedResponse {
            text: "Let's take a break and come back to this later ⏰".to_string(),
            reason: "Helps avoid escalating the conflict".to_string(),
        },
    ]
}

pub fn chat_reply() -> String {
    "Great question! 😊 Based on the analysis, the conversation was constructive. \
     Both participants showed empathy and professionalism. Keep communicating this way! 👍"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_payloads_are_well_formed() {
        for result in [text_analysis("a b c"), file_analysis(), multi_file_analysis()] {
            assert!(result.is_well_formed());
            assert!(!result.subtleties.is_empty());
            assert!(result.preset.is_none());
        }
    }

    #[test]
    fn test_text_message_count_follows_input() {
        assert_eq!(text_analysis("hi there  friend\nbye").summary.message_count, 4);
        assert_eq!(text_analysis("").summary.message_count, 0);
    }

    #[test]
    fn test_lists_are_populated() {
        assert_eq!(history().len(), 3);
        let presets = presets();
        assert_eq!(presets.len(), 3);
        assert!(presets.iter().all(|p| (0.0..=1.0).contains(&p.temperature)));
        assert_eq!(suggested_responses().len(), 3);
        assert!(!chat_reply().is_empty());
    }
}
