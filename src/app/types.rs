// src/app/types.rs
use super::error::ScheduleError;
use super::schedule::Schedule;

// ---- cross-thread messages / data ----

/// What a load worker produced, tagged with the load it belongs to.
pub struct LoadMsg {
    pub generation: u64,
    pub result: Result<Loaded, ScheduleError>,
}

#[derive(Debug)]
pub struct Loaded {
    pub schedule: Schedule,
    /// Ascending, never empty.
    pub dates: Vec<String>,
}

// ---- app phases ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Ready,
    Failed,
}

// ---- UI controls ----
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateChoice {
    /// Raw ISO date, used for filtering and the file name.
    pub value: String,
    /// "3月9日（周六）"
    pub label: String,
}

impl DateChoice {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let label = super::utils::chinese_date(&value);
        Self { value, label }
    }
}

// ---- status strings ----
pub const STATUS_LOADING: &str = "正在加载数据，请稍候...";
pub const STATUS_FETCH_FAILED: &str = "无法获取影城排期数据，请稍后再试！";
pub const STATUS_NO_DATES: &str = "API数据中没有可用的放映日期！";
pub const STATUS_READY: &str = "数据加载完成";
pub const DIALOG_TITLE: &str = "错误";
pub const DIALOG_BUILD_FAILED: &str = "无法生成文档！";
