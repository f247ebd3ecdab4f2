// src/app/schedule.rs — typed view of the cinema `shows` payload
use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::error::ScheduleError;

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    data: ScheduleData,
}

#[derive(Debug, Deserialize)]
struct ScheduleData {
    movies: Vec<Movie>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Screening {
    #[serde(rename = "tm", default)]
    pub time: Option<String>,
    #[serde(rename = "th", default)]
    pub hall: Option<String>,
    #[serde(rename = "tp", default)]
    pub format: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Showing {
    #[serde(rename = "showDate")]
    pub date: String,
    #[serde(rename = "plist", default)]
    pub screenings: Vec<Screening>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Movie {
    #[serde(rename = "nm")]
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(rename = "dur")]
    pub duration: u32,
    #[serde(rename = "shows", default)]
    pub showings: Vec<Showing>,
}

impl Movie {
    /// Second `|` segment of the description, e.g. "2024上映|剧情|118分钟" → "剧情".
    pub fn genre(&self) -> Option<&str> {
        self.description.split('|').nth(1)
    }

    /// Showings whose trimmed `showDate` equals `date`, the same key [`Schedule::available_dates`] lists.
    pub fn showings_on<'a>(&'a self, date: &'a str) -> impl Iterator<Item = &'a Showing> + 'a {
        let date = date.trim();
        self.showings.iter().filter(move |s| s.date.trim() == date)
    }

    pub fn screenings_on<'a>(&'a self, date: &'a str) -> impl Iterator<Item = &'a Screening> + 'a {
        self.showings_on(date).flat_map(|s| s.screenings.iter())
    }

    pub fn shows_on(&self, date: &str) -> bool {
        self.showings_on(date).next().is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    pub movies: Vec<Movie>,
}

impl Schedule {
    /// Typed parse of the raw payload. Fails on the first field that does not fit.
    pub fn from_payload(payload: &Value) -> Result<Self, ScheduleError> {
        let resp = ScheduleResponse::deserialize(payload)
            .map_err(|e| ScheduleError::Parse(e.to_string()))?;
        Ok(Self {
            movies: resp.data.movies,
        })
    }

    /// Distinct showing dates, ascending.
    pub fn available_dates(&self) -> Vec<String> {
        self.movies
            .iter()
            .flat_map(|m| m.showings.iter())
            .map(|s| s.date.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Date list straight from a payload; any shape problem yields an empty list.
pub fn available_dates(payload: &Value) -> Vec<String> {
    match Schedule::from_payload(payload) {
        Ok(schedule) => schedule.available_dates(),
        Err(e) => {
            warn!("no dates extracted: {e}");
            Vec::new()
        }
    }
}
