//! Categorical distribution chart
//!
//! Renders value counts of one dataset column as a horizontal bar chart in
//! the terminal, most frequent value first.

use std::collections::HashMap;

use console::{style, Color};

use crate::data::Dataset;
use crate::error::PaybackResult;

/// Background grid style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStyle {
    /// Count axis with tick marks
    WhiteGrid,
    /// Bars only
    White,
}

/// Bar color cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Pastel,
    Muted,
}

impl Palette {
    fn colors(self) -> &'static [u8] {
        match self {
            Palette::Pastel => &[153, 217, 229, 157, 183, 223, 195, 225],
            Palette::Muted => &[67, 174, 107, 139, 180, 73, 137, 102],
        }
    }

    fn color(self, i: usize) -> Color {
        let colors = self.colors();
        Color::Color256(colors[i % colors.len()])
    }
}

#[derive(Debug, Clone)]
pub struct PlotStyle {
    /// Length of the longest bar in character cells
    pub bar_width: usize,
    pub grid: GridStyle,
    pub palette: Palette,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            bar_width: 48,
            grid: GridStyle::WhiteGrid,
            palette: Palette::Pastel,
        }
    }
}

/// Frequency of each value in `column`, descending; ties keep first-seen order
pub fn value_counts(dataset: &Dataset, column: &str) -> PaybackResult<Vec<(String, usize)>> {
    // value -> (count, first index)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (i, value) in dataset.column_values(column)?.into_iter().enumerate() {
        counts.entry(value).or_insert((0, i)).0 += 1;
    }

    let mut counts: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    counts.sort_by(|(_, (n_a, first_a)), (_, (n_b, first_b))| {
        n_b.cmp(n_a).then(first_a.cmp(first_b))
    });
    Ok(counts.into_iter().map(|(value, (n, _))| (value, n)).collect())
}

/// `loan_purpose` -> `Loan Purpose`
pub fn axis_label(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut prev_alpha = false;
    for c in column.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Render the chart as styled text
pub fn render_categorical_distribution(
    dataset: &Dataset,
    column: &str,
    plot_style: &PlotStyle,
) -> PaybackResult<String> {
    let counts = value_counts(dataset, column)?;
    let bar_width = plot_style.bar_width.max(1);
    let label_width = counts
        .iter()
        .map(|(v, _)| v.chars().count())
        .max()
        .unwrap_or(0);
    let max_count = counts.first().map(|(_, n)| *n).unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{}\n", style(format!("Distribution of {}", column)).bold()));
    out.push_str(&format!("{}\n", style(axis_label(column)).dim()));

    for (i, (value, count)) in counts.iter().enumerate() {
        let cells = (if max_count == 0 {
            0
        } else {
            ((*count as f64 / max_count as f64) * bar_width as f64).round() as usize
        })
        .max(1);
        let bar = style("█".repeat(cells)).fg(plot_style.palette.color(i));
        out.push_str(&format!(
            "  {:>width$} │{} {}\n",
            value,
            bar,
            count,
            width = label_width
        ));
    }

    let pad = " ".repeat(label_width + 3);
    match plot_style.grid {
        GridStyle::WhiteGrid => {
            out.push_str(&format!("{}└{}\n", pad, "─".repeat(bar_width)));
            let max_label = max_count.to_string();
            let gap = (bar_width + 1).saturating_sub(1 + max_label.len());
            out.push_str(&format!("{}0{}{}\n", pad, " ".repeat(gap), max_label));
        }
        GridStyle::White => {}
    }
    out.push_str(&format!("{}{}\n", pad, style("Count").dim()));

    Ok(out)
}

/// Print the chart for `column` to stdout
pub fn plot_categorical_distribution(
    dataset: &Dataset,
    column: &str,
    plot_style: &PlotStyle,
) -> PaybackResult<()> {
    let chart = render_categorical_distribution(dataset, column, plot_style)?;
    print!("{}", chart);
    Ok(())
}
