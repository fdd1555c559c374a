use crate::models::DailyForecastRow;
use anyhow::Result;
use std::io::Write;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

trait Tabular {
    fn headers() -> Vec<String>;
    fn rows(&self) -> Vec<String>;
}

fn format_temperature(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Tabular for DailyForecastRow {
    fn headers() -> Vec<String> {
        vec![
            "Day".to_string(),
            "Temperature Min".to_string(),
            "Temperature Max".to_string(),
        ]
    }

    fn rows(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            format_temperature(self.temperature_min),
            format_temperature(self.temperature_max),
        ]
    }
}

fn format_line(cells: &[String], col_widths: &[usize]) -> String {
    let line: String = col_widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            format!(
                " {:width$} ",
                cells.get(i).map(String::as_str).unwrap_or_default(),
                width = *w
            )
        })
        .collect::<Vec<_>>()
        .join("|");
    format!("|{}|", line)
}

/// Header, separator, then one line per item. An empty slice still gets the header.
fn render_table<T: Tabular, W: Write>(items: &[T], out: &mut W) -> Result<()> {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(|i| i.rows()).collect();

    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let max_width = rows
                .iter()
                .map(|row| row.get(i).map_or(0, |c| c.chars().count()))
                .max()
                .unwrap_or(0);
            header.chars().count().max(max_width)
        })
        .collect();

    let separator: String = col_widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");

    writeln!(out, "{}", format_line(&headers, &col_widths))?;
    writeln!(out, "|{}|", separator)?;

    for row in rows {
        writeln!(out, "{}", format_line(&row, &col_widths))?;
    }

    Ok(())
}

pub fn print_forecast<W: Write>(
    rows: &[DailyForecastRow],
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
        OutputFormat::Human => render_table(rows, out)?,
    }
    out.flush()?;
    Ok(())
}
