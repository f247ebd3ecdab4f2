// src/app/report.rs — daily showtime sheet: model first, then the .docx layout
use std::collections::BTreeSet;
use std::io::{Cursor, Seek, Write};

use docx_rs::{
    AlignmentType, Docx, LineSpacing, LineSpacingType, PageMargin, Paragraph, Run, RunFonts,
};
use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, error};

use super::error::ScheduleError;
use super::schedule::{Movie, Schedule};
use super::utils::{chinese_date, hall_digits};

pub const TIMES_PER_LINE: usize = 6;
pub const UNKNOWN_GENRE: &str = "未知类型";

// ---- layout (twips for lengths, half-points for font sizes) ----
const TWIPS_PER_CM: f64 = 566.93;
const MARGIN_TOP_CM: f64 = 0.2;
const MARGIN_BOTTOM_CM: f64 = 0.0;
const MARGIN_SIDE_CM: f64 = 1.17;
const BODY_FONT: &str = "仿宋";
const BODY_SIZE: usize = 36;
const TITLE_SIZE: usize = 56;
const TITLE_COLOR: &str = "1F497D";
const PREFIX_COLOR: &str = "000000";
const HEADLINE_COLOR: &str = "C00000";
const TIME_COLOR: &str = "1F497D";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovieBlock {
    /// "3D/2D", "3D" or "2D".
    pub format_prefix: String,
    /// "《name》 genre dur分钟"
    pub headline: String,
    /// Rows of at most [`TIMES_PER_LINE`] "time（hall）" entries.
    pub time_lines: Vec<Vec<String>>,
}

impl MovieBlock {
    pub fn time_line_texts(&self) -> Vec<String> {
        self.time_lines.iter().map(|row| row.join(" ")).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub date: String,
    pub title: String,
    pub blocks: Vec<MovieBlock>,
}

/// Both tags → "3D/2D"; otherwise the one present; nothing tagged → "2D".
pub fn format_prefix<'a, I>(tags: I) -> &'static str
where
    I: IntoIterator<Item = &'a str>,
{
    let tags: BTreeSet<&str> = tags.into_iter().map(str::trim).collect();
    match (tags.contains("3D"), tags.contains("2D")) {
        (true, true) => "3D/2D",
        (true, false) => "3D",
        _ => "2D",
    }
}

fn movie_block(movie: &Movie, date: &str) -> Option<MovieBlock> {
    // a showing with an empty screening list does not count
    if movie.screenings_on(date).next().is_none() {
        return None;
    }

    let prefix = format_prefix(
        movie
            .screenings_on(date)
            .filter_map(|s| s.format.as_deref()),
    );

    let genre = movie.genre().unwrap_or(UNKNOWN_GENRE);
    let headline = format!("《{}》 {} {}分钟", movie.name, genre, movie.duration);

    let entries: Vec<String> = movie
        .screenings_on(date)
        .filter_map(|s| match (s.time.as_deref(), s.hall.as_deref()) {
            (Some(tm), Some(th)) if !tm.is_empty() && !th.is_empty() => {
                Some(format!("{tm}（{}）", hall_digits(th)))
            }
            _ => None,
        })
        .collect();
    let time_lines: Vec<Vec<String>> = entries
        .chunks(TIMES_PER_LINE)
        .map(<[String]>::to_vec)
        .collect();

    Some(MovieBlock {
        format_prefix: prefix.to_string(),
        headline,
        time_lines,
    })
}

/// Sheet for one date key as listed by [`Schedule::available_dates`].
/// Movies without a screening that day are left out. A key that is not an
/// ISO date still builds; its title is the key itself.
pub fn build_report(schedule: &Schedule, date: &str) -> Result<Report, ScheduleError> {
    let date = date.trim();
    if date.is_empty() {
        return Err(ScheduleError::DocumentBuild("no showing date given".into()));
    }

    let blocks: Vec<MovieBlock> = schedule
        .movies
        .iter()
        .filter_map(|m| movie_block(m, date))
        .collect();
    debug!("report for {date}: {} of {} movies", blocks.len(), schedule.movies.len());

    Ok(Report {
        date: date.to_string(),
        title: chinese_date(date),
        blocks,
    })
}

/// Same as [`build_report`] but starting from the raw payload.
pub fn build_report_from_payload(payload: &Value, date: &str) -> Result<Report, ScheduleError> {
    let schedule = Schedule::from_payload(payload).map_err(|e| {
        error!("invalid payload for document: {e}");
        ScheduleError::DocumentBuild(e.to_string())
    })?;
    build_report(&schedule, date)
}

fn twips(cm: f64) -> i32 {
    (cm * TWIPS_PER_CM).round() as i32
}

fn body_fonts() -> RunFonts {
    RunFonts::new()
        .ascii(BODY_FONT)
        .hi_ansi(BODY_FONT)
        .east_asia(BODY_FONT)
        .cs(BODY_FONT)
}

fn condensed(p: Paragraph) -> Paragraph {
    p.line_spacing(
        LineSpacing::new()
            .before(0)
            .after(0)
            // 0.9 of single spacing (240)
            .line(216)
            .line_rule(LineSpacingType::Auto),
    )
}

fn colored_run(text: &str, color: &str) -> Run {
    Run::new().add_text(text).bold().color(color)
}

impl Report {
    pub fn to_docx(&self) -> Docx {
        let title = Paragraph::new()
            .align(AlignmentType::Center)
            .add_run(
                Run::new()
                    .add_text(&self.title)
                    .size(TITLE_SIZE)
                    .bold()
                    .color(TITLE_COLOR),
            );

        let mut doc = Docx::new()
            .page_margin(
                PageMargin::new()
                    .top(twips(MARGIN_TOP_CM))
                    .bottom(twips(MARGIN_BOTTOM_CM))
                    .left(twips(MARGIN_SIDE_CM))
                    .right(twips(MARGIN_SIDE_CM)),
            )
            .default_fonts(body_fonts())
            .default_size(BODY_SIZE)
            .add_paragraph(title);

        for block in &self.blocks {
            let info = Paragraph::new()
                .add_run(
                    colored_run(&block.format_prefix, PREFIX_COLOR)
                        .fonts(body_fonts())
                        .size(BODY_SIZE),
                )
                .add_run(colored_run(&block.headline, HEADLINE_COLOR));
            doc = doc.add_paragraph(condensed(info));

            for line in block.time_line_texts() {
                let times = Paragraph::new().add_run(colored_run(&line, TIME_COLOR));
                doc = doc.add_paragraph(condensed(times));
            }

            doc = doc.add_paragraph(condensed(Paragraph::new()));
        }

        doc
    }

    pub fn write_docx<W: Write + Seek>(&self, writer: W) -> Result<(), ScheduleError> {
        self.to_docx()
            .build()
            .pack(writer)
            .map_err(|e| ScheduleError::DocumentBuild(format!("pack docx: {e}")))
    }

    pub fn to_docx_bytes(&self) -> Result<Vec<u8>, ScheduleError> {
        let mut buf = Cursor::new(Vec::new());
        self.write_docx(&mut buf)?;
        Ok(buf.into_inner())
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain-text rendering used for logging.
    pub fn summary(&self) -> String {
        std::iter::once(self.title.clone())
            .chain(self.blocks.iter().map(|b| format!("{}{}", b.format_prefix, b.headline)))
            .join("\n")
    }
}
