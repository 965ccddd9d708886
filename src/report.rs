//! Plain-text analysis report
//!
//! Renders an [`AnalysisResult`] as the report cards of the dashboard:
//! summary, emotions, AI-judge score, subtleties and whatever preset
//! blocks the result carries.

use crate::history::ScoreBand;
use crate::models::{AnalysisResult, EmotionPoint, PresetSection, Subtlety};

/// Accumulates report lines under section headings
struct Report {
    lines: Vec<String>,
}

impl Report {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn section(&mut self, title: &str) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(title.to_uppercase());
        self.lines.push("-".repeat(title.chars().count()));
    }

    fn field(&mut self, name: &str, value: impl std::fmt::Display) {
        self.lines.push(format!("{:<18} {}", format!("{}:", name), value));
    }

    fn list(&mut self, name: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        self.lines.push(format!("{}:", name));
        for item in items {
            self.lines.push(format!("  - {}", item));
        }
    }

    fn text(&mut self, line: String) {
        self.lines.push(line);
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Values up to 1.0 are fractions, anything above is already a percentage
fn percent(value: f64) -> u32 {
    let value = if value <= 1.0 { value * 100.0 } else { value };
    value.clamp(0.0, 100.0).round() as u32
}

/// Intensity as a 0..100 percentage; models send either scale
pub fn intensity_percent(point: &EmotionPoint) -> u32 {
    percent(point.intensity)
}

/// Confidence as a 0..100 percentage
pub fn confidence_percent(subtlety: &Subtlety) -> u32 {
    percent(subtlety.confidence)
}

fn bar(percent: u32) -> String {
    let filled = (percent as usize + 5) / 10;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled.min(10)))
}

/// Render the full report
pub fn render(result: &AnalysisResult) -> String {
    let mut report = Report::new();

    if let Some(preset) = &result.preset {
        report.section("Preset");
        report.field("Name", &preset.name);
        if let Some(validation) = &result.preset_validation {
            let verdict = if validation.is_valid {
                "fits this conversation"
            } else {
                "does not fit this conversation"
            };
            report.field("Validation", verdict);
            if !validation.reason.is_empty() {
                report.field("Reason", &validation.reason);
            }
        }
    }

    let summary = &result.summary;
    report.section("Summary");
    report.text(summary.overview.clone());
    report.field("Participants", summary.participants);
    report.field("Messages", summary.message_count);
    report.field("Duration", &summary.duration);
    report.list("Main topics", &summary.main_topics);

    let timeline = &result.emotion_timeline;
    report.section("Emotions");
    report.field("Dominant", &timeline.dominant_emotion);
    report.field("Shifts", timeline.emotional_shifts);
    for point in &timeline.emotions {
        let percent = intensity_percent(point);
        report.text(format!(
            "  {:<6} {:<14} {} {:>3}%",
            point.time,
            point.emotion,
            bar(percent),
            percent
        ));
    }

    let score = &result.ai_judge_score;
    report.section("AI judge");
    report.field(
        "Overall",
        format!(
            "{}/100 ({})",
            score.overall_score,
            ScoreBand::of(score.overall_score).label()
        ),
    );
    report.field("Clarity", score.breakdown.clarity);
    report.field("Empathy", score.breakdown.empathy);
    report.field("Professionalism", score.breakdown.professionalism);
    report.field("Resolution", score.breakdown.resolution);
    report.field("Verdict", &score.verdict);
    report.field("Recommendation", &score.recommendation);

    if !result.subtleties.is_empty() {
        report.section("Subtleties");
        for subtlety in &result.subtleties {
            report.text(format!(
                "  [{}] {} ({}% confidence)",
                subtlety.kind,
                subtlety.message,
                confidence_percent(subtlety)
            ));
            if !subtlety.context.is_empty() {
                report.text(format!("      {}", subtlety.context));
            }
        }
    }

    for section in result.preset_sections() {
        render_section(&mut report, &section);
    }

    report.finish()
}

fn render_section(report: &mut Report, section: &PresetSection<'_>) {
    match section {
        PresetSection::SafetyCheck(block) => {
            report.section("Safety check");
            report.field("Safety level", format!("{}/100", block.safety_level));
            report.list("Bullying indicators", &block.bullying_indicators);
            report.list("Recommendations", &block.recommendations);
        }
        PresetSection::EmotionDictionary(block) => {
            report.section("Emotion dictionary");
            for hidden in &block.hidden_emotions {
                report.text(format!("  \"{}\": {}", hidden.text, hidden.explanation));
            }
        }
        PresetSection::SocialCompass(block) => {
            report.section("Social compass");
            report.field("Group dynamics", &block.group_dynamics);
            report.list("Inner circles", &block.inner_circles);
            report.list("Navigation tips", &block.navigation_tips);
        }
        PresetSection::CommunicationCycles(block) => {
            report.section("Communication cycles");
            report.list("Patterns", &block.patterns);
            report.list("Trigger points", &block.trigger_points);
            report.list("Interruption techniques", &block.interruption_techniques);
        }
        PresetSection::NeedsMap(block) => {
            report.section("Needs map");
            report.list("Expressed", &block.expressed_needs);
            report.list("Unexpressed", &block.unexpressed_needs);
            report.list("Overlap", &block.overlap_areas);
        }
        PresetSection::FamilyRoles(block) => {
            report.section("Family roles");
            report.field(
                "Balance",
                format!("{}/100", block.responsibility_balance),
            );
            report.list("Roles", &block.role_distribution);
            report.list("Recommendations", &block.recommendations);
        }
        PresetSection::TeamAnalytics(block) => {
            let metrics = &block.communication_metrics;
            report.section("Team analytics");
            report.field("Participation", format!("{}%", metrics.participation_rate));
            report.field("Response time", &metrics.response_time);
            report.field("Engagement", format!("{}/100", metrics.engagement_score));
            report.field("Decisions", format!("{}/100", block.decision_efficiency));
            report.field("Goals", format!("{}/100", block.goal_achievement));
        }
        PresetSection::PsychologicalSafety(block) => {
            report.section("Psychological safety");
            report.field("Safety level", format!("{}/100", block.safety_level));
            report.field("Openness", format!("{}/100", block.openness_score));
            report.list("Trust indicators", &block.trust_indicators);
        }
        PresetSection::ProfessionalGrowth(block) => {
            report.section("Professional growth");
            for skill in &block.skill_analysis {
                report.text(format!(
                    "  {} {}/5: {}",
                    skill.skill, skill.current_level, skill.development_area
                ));
            }
            report.list("Recommendations", &block.growth_recommendations);
        }
    }
}
