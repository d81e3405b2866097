//! Text rendering of a ranked result: table plus horizontal bar chart

use crate::query::QueryOutcome;
use crate::scoring::ScoredRecord;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::tty::IsTty;
use std::io::{self, Write};

const GOLD: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const SILVER: Color = Color::Rgb { r: 192, g: 192, b: 192 };
const BRONZE: Color = Color::Rgb { r: 205, g: 133, b: 63 };
const SKY_BLUE: Color = Color::Rgb { r: 135, g: 206, b: 235 };
const CRIMSON: Color = Color::Rgb { r: 220, g: 20, b: 60 };

const DEFAULT_BAR_WIDTH: usize = 40;
const REFERENCE_LABEL: &str = "(reference)";

pub struct Report {
    color: bool,
    bar_width: usize,
}

impl Report {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }

    /// Color only when stdout is a terminal and `NO_COLOR` is unset
    pub fn for_stdout() -> Self {
        let color = io::stdout().is_tty() && std::env::var_os("NO_COLOR").is_none();
        Self::new(color)
    }

    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }

    pub fn render(&self, out: &mut impl Write, outcome: &QueryOutcome) -> io::Result<()> {
        let entries = outcome.ranked.entries();

        writeln!(out)?;
        writeln!(out, "Top Investment Regions: {}", outcome.query)?;
        self.render_table(out, entries)?;
        writeln!(out)?;
        writeln!(out, "Investment Score (%)")?;
        self.render_bars(out, entries)?;
        writeln!(
            out,
            "Scores are relative to this result ({} of {} candidate ZIPs had market data).",
            outcome.scored_count, outcome.candidate_count
        )?;
        out.flush()
    }

    fn render_table(&self, out: &mut impl Write, entries: &[ScoredRecord]) -> io::Result<()> {
        writeln!(
            out,
            "{:>4}  {:<5}  {:>13}  {:>6}  {:>10}  {:>9}  {:>6}",
            "Rank", "ZIP", "Median Price", "Score", "Homes Sold", "Inventory", "DOM"
        )?;

        let mut rank = 0;
        for entry in entries {
            let rank_label = if entry.pinned {
                "ref".to_string()
            } else {
                rank += 1;
                rank.to_string()
            };
            let color = rank_color(entry.pinned, rank);
            let line = format!(
                "{:>4}  {:<5}  {:>13}  {:>5.0}%  {:>10}  {:>9}  {:>6}{}",
                rank_label,
                entry.code(),
                entry
                    .record
                    .median_sale_price
                    .map(format_currency)
                    .unwrap_or_else(|| "-".to_string()),
                entry.score_pct,
                format_metric(entry.record.homes_sold),
                format_metric(entry.record.inventory),
                format_metric(entry.record.days_on_market),
                if entry.pinned {
                    format!("  {}", REFERENCE_LABEL)
                } else {
                    String::new()
                },
            );
            self.write_colored(out, color, &line)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn render_bars(&self, out: &mut impl Write, entries: &[ScoredRecord]) -> io::Result<()> {
        // A pinned entry can exceed 100%; scale so every bar fits
        let scale_max = entries
            .iter()
            .map(|e| e.score_pct)
            .fold(100.0_f64, f64::max);

        let mut rank = 0;
        for entry in entries {
            if !entry.pinned {
                rank += 1;
            }
            let filled = bar_length(entry.score_pct, scale_max, self.bar_width);
            let label = if entry.pinned {
                format!("{} {}", entry.code(), REFERENCE_LABEL)
            } else {
                entry.code().to_string()
            };

            write!(out, "{:<17} │", label)?;
            self.write_colored(out, rank_color(entry.pinned, rank), &"█".repeat(filled))?;
            writeln!(
                out,
                "{} {}%",
                " ".repeat(self.bar_width - filled),
                entry.score_pct.round()
            )?;
        }
        Ok(())
    }

    fn write_colored(&self, out: &mut impl Write, color: Color, text: &str) -> io::Result<()> {
        if self.color {
            queue!(out, SetForegroundColor(color), Print(text), ResetColor)
        } else {
            out.write_all(text.as_bytes())
        }
    }
}

/// Gold, silver and bronze for the podium, sky blue after, crimson for the
/// pinned reference ZIP
fn rank_color(pinned: bool, rank: usize) -> Color {
    if pinned {
        return CRIMSON;
    }
    match rank {
        1 => GOLD,
        2 => SILVER,
        3 => BRONZE,
        _ => SKY_BLUE,
    }
}

fn bar_length(pct: f64, scale_max: f64, width: usize) -> usize {
    if !pct.is_finite() || pct <= 0.0 || scale_max <= 0.0 {
        return 0;
    }
    let len = (pct / scale_max * width as f64).round() as usize;
    len.min(width)
}

fn format_metric(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

/// `$1,234,567` style formatting, whole dollars
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
