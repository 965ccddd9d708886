//! Client-side history filtering and sorting
//!
//! The history endpoint returns every analysis for the user; searching,
//! score filtering and ordering happen locally.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::HistoryItem;

/// Quality band of an AI-judge score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreBand {
    #[default]
    All,
    /// 80 and above
    High,
    /// 60 to 79
    Medium,
    /// Below 60
    Low,
}

impl ScoreBand {
    /// Band a concrete score falls into (never `All`)
    pub fn of(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::High
        } else if score >= 60 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn matches(&self, score: u32) -> bool {
        *self == ScoreBand::All || *self == ScoreBand::of(score)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::All => "all",
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }
}

impl FromStr for ScoreBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ScoreBand::All),
            "high" => Ok(ScoreBand::High),
            "medium" => Ok(ScoreBand::Medium),
            "low" => Ok(ScoreBand::Low),
            other => Err(format!("Unknown score band: {}. Use: all, high, medium, low", other)),
        }
    }
}

/// Sort key, always descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySort {
    /// Newest first
    #[default]
    Date,
    Score,
    Messages,
}

impl FromStr for HistorySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(HistorySort::Date),
            "score" => Ok(HistorySort::Score),
            "messages" => Ok(HistorySort::Messages),
            other => Err(format!("Unknown sort: {}. Use: date, score, messages", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub query: String,
    pub band: ScoreBand,
    pub sort: HistorySort,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn band(mut self, band: ScoreBand) -> Self {
        self.band = band;
        self
    }

    pub fn sort(mut self, sort: HistorySort) -> Self {
        self.sort = sort;
        self
    }

    fn matches(&self, item: &HistoryItem) -> bool {
        let needle = self.query.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || item.title.to_lowercase().contains(&needle)
            || item.dominant_emotion.to_lowercase().contains(&needle);

        matches_search && self.band.matches(item.overall_score)
    }

    /// Filtered and sorted copy of `items`
    pub fn apply(&self, items: &[HistoryItem]) -> Vec<HistoryItem> {
        let mut selected: Vec<HistoryItem> =
            items.iter().filter(|i| self.matches(i)).cloned().collect();

        match self.sort {
            HistorySort::Date => selected.sort_by(|a, b| {
                match (a.parsed_date(), b.parsed_date()) {
                    (Some(a), Some(b)) => b.cmp(&a),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }),
            HistorySort::Score => selected.sort_by(|a, b| b.overall_score.cmp(&a.overall_score)),
            HistorySort::Messages => {
                selected.sort_by(|a, b| b.message_count.cmp(&a.message_count))
            }
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str, date: &str, score: u32, messages: u32) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            dominant_emotion: "Calm".to_string(),
            overall_score: score,
            message_count: messages,
            participants: 2,
            file_type: "text".to_string(),
        }
    }

    fn sample() -> Vec<HistoryItem> {
        vec![
            item("1", "Work chat", "2024-01-10", 85, 40),
            item("2", "Family dinner", "2024-03-02T18:00:00", 62, 120),
            item("3", "Argument", "2024-02-14", 41, 15),
            item("4", "Undated", "sometime", 90, 5),
        ]
    }

    fn ids(items: &[HistoryItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::of(80), ScoreBand::High);
        assert_eq!(ScoreBand::of(79), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(60), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(59), ScoreBand::Low);
        assert!(ScoreBand::All.matches(0));
    }

    #[test]
    fn test_date_sort_newest_first_unparsed_last() {
        let sorted = HistoryFilter::new().apply(&sample());
        assert_eq!(ids(&sorted), vec!["2", "3", "1", "4"]);
    }

    #[test]
    fn test_score_and_message_sorts() {
        let by_score = HistoryFilter::new().sort(HistorySort::Score).apply(&sample());
        assert_eq!(ids(&by_score), vec!["4", "1", "2", "3"]);

        let by_messages = HistoryFilter::new().sort(HistorySort::Messages).apply(&sample());
        assert_eq!(ids(&by_messages), vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn test_band_and_search_combine() {
        let high = HistoryFilter::new().band(ScoreBand::High).apply(&sample());
        assert_eq!(ids(&high), vec!["1", "4"]);

        let search = HistoryFilter::new().query("  FAMILY ").apply(&sample());
        assert_eq!(ids(&search), vec!["2"]);

        let none = HistoryFilter::new()
            .query("family")
            .band(ScoreBand::Low)
            .apply(&sample());
        assert!(none.is_empty());
    }

    #[test]
    fn test_parse_band_and_sort() {
        assert_eq!("Medium".parse::<ScoreBand>().unwrap(), ScoreBand::Medium);
        assert!("great".parse::<ScoreBand>().is_err());
        assert_eq!("messages".parse::<HistorySort>().unwrap(), HistorySort::Messages);
    }
}
