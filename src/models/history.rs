//! History DTOs

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResult;
use super::number::lenient_u32;

/// One row of the analysis history list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    /// ISO 8601 date or datetime, as sent by the backend
    pub date: String,
    pub dominant_emotion: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub overall_score: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub message_count: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub participants: u32,
    pub file_type: String,
}

impl HistoryItem {
    /// Parse `date`, accepting RFC 3339, naive datetimes and plain dates
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        let raw = self.date.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

/// Full record returned by `GET /history/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryDetail {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    pub date: String,
    pub file_type: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_url: Option<String>,
    pub analysis_results: AnalysisResult,
    #[serde(default)]
    pub dominant_emotion: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub overall_score: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub message_count: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub participants: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of a successful `DELETE /history/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(date: &str) -> HistoryItem {
        HistoryItem {
            id: "1".into(),
            title: "Chat".into(),
            date: date.into(),
            dominant_emotion: "Joy".into(),
            overall_score: 80,
            message_count: 10,
            participants: 2,
            file_type: "text".into(),
        }
    }

    #[test]
    fn test_parsed_date_formats() {
        assert!(item("2024-03-01").parsed_date().is_some());
        assert!(item("2024-03-01T10:15:00.123456").parsed_date().is_some());
        assert!(item("2024-03-01T10:15:00+00:00").parsed_date().is_some());
        assert!(item("yesterday").parsed_date().is_none());
    }

    #[test]
    fn test_detail_decodes_nested_result() {
        let json = r#"{
            "id": "7b0d",
            "title": "Text analysis",
            "date": "2024-03-01T10:15:00",
            "file_type": "text",
            "file_name": "text_input.txt",
            "analysis_results": {"summary": {"overview": "Fine", "participants": 2}},
            "overall_score": 64
        }"#;
        let detail: HistoryDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.analysis_results.summary.participants, 2);
        assert_eq!(detail.overall_score, 64);
        assert!(detail.file_url.is_none());
    }

    #[test]
    fn test_list_row_rounds_scores() {
        let json = r#"{
            "id": "9", "title": "Chat", "date": "2024-03-01",
            "dominant_emotion": "Calm", "overall_score": 72.6,
            "message_count": 12, "participants": 2, "file_type": "text"
        }"#;
        let row: HistoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(row.overall_score, 73);
        assert_eq!(row.message_count, 12);
    }
}
