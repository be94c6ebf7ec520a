//! Itinerary text parsing.
//!
//! # Overview
//! Users paste free-form itinerary text ("Day 1", one activity per line)
//! and get back structured days ready to attach to a plan. Parsing is
//! line-based and forgiving: blank lines are skipped, a `Day N` heading
//! starts a new day, an optional leading `HH:MM` is split off as the
//! activity time, and activity lines appearing before any heading fall
//! into an implicit day 1.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DAY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^day\s+(\d+)\s*:?\s*(.*)$").expect("day heading pattern"));

static TIME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)\s+(.+)$").expect("time prefix pattern"));

/// One activity line within a day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItineraryItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub activity: String,
}

/// One day of an itinerary, with its activities in input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItineraryDay {
    pub day: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<ItineraryItem>,
}

impl ItineraryDay {
    fn new(day: u32, title: Option<String>) -> Self {
        Self {
            day,
            title,
            items: Vec::new(),
        }
    }
}

/// Parse pasted itinerary text into structured days.
///
/// Repeated `Day N` headings start separate entries even when N repeats;
/// the caller decides whether to merge them.
pub fn parse_itinerary(text: &str) -> Vec<ItineraryDay> {
    let mut days: Vec<ItineraryDay> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = DAY_HEADING.captures(line) {
            if let Ok(number) = caps[1].parse::<u32>() {
                let title = match caps[2].trim() {
                    "" => None,
                    rest => Some(rest.to_string()),
                };
                days.push(ItineraryDay::new(number, title));
                continue;
            }
        }

        if days.is_empty() {
            days.push(ItineraryDay::new(1, None));
        }

        let item = match TIME_PREFIX.captures(line) {
            Some(caps) => ItineraryItem {
                time: Some(format!("{}:{}", &caps[1], &caps[2])),
                activity: caps[3].trim().to_string(),
            },
            None => ItineraryItem {
                time: None,
                activity: line.to_string(),
            },
        };
        // days is non-empty here
        if let Some(current) = days.last_mut() {
            current.items.push(item);
        }
    }

    days
}
