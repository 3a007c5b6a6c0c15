use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use calendar_engine::{
    render_range, CalendarDate, CalendarOptions, CalendarRange, MarkedDates, MonthCache,
    MonthView, MonthViewProvider, Pattern, PickerCore, PickerOptions, Translations, YearMonth,
};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

#[derive(Parser, Debug)]
#[command(
    name = "calpick",
    version,
    about = "Month grids, week numbers, date formats and date ranges"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the day grid of a month
    Month {
        /// Month as YYYY-MM
        month: YearMonth,

        /// First column of the grid (0 = Sunday ... 6 = Saturday)
        #[arg(long, default_value_t = 0)]
        start_of_week: u32,

        /// Highlight START..END (YYYY-MM-DD)
        #[arg(long)]
        range: Option<String>,

        /// JSON file of marked dates ([{"date": ..., "className": ...}])
        #[arg(long)]
        marked: Option<PathBuf>,

        /// Print the month view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the week number of a date
    Week {
        /// Date as YYYY-MM-DD
        date: CalendarDate,
    },

    /// Parse text with a date format or a {name} template
    Parse {
        text: String,

        /// Date format with yyyy, mm and dd tokens
        #[arg(long, default_value = "yyyy-mm-dd", conflicts_with = "template")]
        format: String,

        /// Template with {name} or {name:type} placeholders; prints JSON
        #[arg(long)]
        template: Option<String>,
    },

    /// Format a YYYY-MM-DD date with a date format
    Format {
        date: CalendarDate,

        #[arg(long, default_value = "yyyy-mm-dd")]
        format: String,
    },

    /// Describe the range between two dates (in either order)
    Range {
        first: CalendarDate,
        second: CalendarDate,

        /// JSON file with picker options; flags below override it
        #[arg(long)]
        options: Option<PathBuf>,

        #[arg(long)]
        format: Option<String>,

        #[arg(long)]
        separator: Option<String>,

        /// Language for the day count label
        #[arg(long, default_value = "en")]
        language: String,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Month {
            month,
            start_of_week,
            range,
            marked,
            json,
        } => cmd_month(month, start_of_week, range.as_deref(), marked, json),
        Command::Week { date } => {
            println!("{}", date.week_number());
            Ok(())
        }
        Command::Parse {
            text,
            format,
            template,
        } => cmd_parse(&text, &format, template.as_deref()),
        Command::Format { date, format } => {
            let pattern = Pattern::from_date_format(&format)?;
            println!("{}", pattern.fill_date(Some(&date)));
            Ok(())
        }
        Command::Range {
            first,
            second,
            options,
            format,
            separator,
            language,
            json,
        } => {
            let mut picker_options = match options {
                Some(path) => PickerOptions::from_json(&read_file(&path)?)?,
                None => PickerOptions::default(),
            };
            if let Some(format) = format {
                picker_options.format = format;
            }
            if let Some(separator) = separator {
                picker_options.separator = separator;
            }
            cmd_range(first, second, &picker_options, &language, json)
        }
    }
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn parse_range_arg(text: &str) -> anyhow::Result<CalendarRange> {
    let (start, end) = text
        .split_once("..")
        .ok_or_else(|| anyhow!("range must look like START..END, got {text:?}"))?;
    Ok(CalendarRange::new(start.trim().parse()?, end.trim().parse()?))
}

fn cmd_month(
    month: YearMonth,
    start_of_week: u32,
    range: Option<&str>,
    marked: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let options = CalendarOptions {
        start_of_week,
        ..CalendarOptions::default()
    };
    options.validate()?;

    let mut cache = MonthCache::new(options.start_of_week);
    if let Some(range) = range {
        let range = parse_range_arg(range)?;
        render_range(&range, &mut cache, "selected");
    }
    let view = cache.month_view(month);
    if let Some(path) = marked {
        MarkedDates::from_json(&read_file(&path)?)?.apply(view);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&*view)?);
    } else {
        print!("{}", render_grid(view));
    }
    Ok(())
}

/// Text grid: a week column, then one column per weekday. Highlighted days
/// carry a `*`, marked days a `+`.
fn render_grid(view: &MonthView) -> String {
    let mut out = format!("{}\n{:>3}", view.year_month(), "Wk");
    for column in 0..7 {
        let weekday = (view.start_of_week() + column) % 7;
        out.push_str(&format!(" {:>3}", WEEKDAYS[weekday as usize]));
    }
    out.push('\n');

    for row in view.grid() {
        let week = row.first().map_or(0, |d| d.date.week_number());
        out.push_str(&format!("{week:>3}"));
        for slot in &row {
            let label = match view.cell_for(&slot.date) {
                Some(cell) if slot.in_month => {
                    let marker = if cell.state.is_highlighted() {
                        "*"
                    } else if !cell.state.marked.is_empty() || !cell.state.marks.is_empty() {
                        "+"
                    } else {
                        ""
                    };
                    format!("{marker}{}", cell.date.day())
                }
                _ => String::new(),
            };
            out.push_str(&format!(" {label:>3}"));
        }
        out.push('\n');
    }
    out
}

fn cmd_parse(text: &str, format: &str, template: Option<&str>) -> anyhow::Result<()> {
    if let Some(template) = template {
        let pattern = Pattern::new(template)?;
        let Some(found) = pattern.matches(text) else {
            bail!("{text:?} does not match template {template:?}");
        };
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    let pattern = Pattern::from_date_format(format)?;
    let date = pattern
        .matches(text)
        .and_then(|m| m.to_date())
        .ok_or_else(|| anyhow!("{text:?} is not a valid date in format {format:?}"))?;
    println!("{date}");
    Ok(())
}

fn cmd_range(
    first: CalendarDate,
    second: CalendarDate,
    options: &PickerOptions,
    language: &str,
    json: bool,
) -> anyhow::Result<()> {
    let core = PickerCore::init_options(options, CalendarDate::today())?;
    let range = CalendarRange::new(first, second);
    let text = core.format_range(&range);
    let label = Translations::for_locale(language).num_days(range.num_days());

    if json {
        let months: Vec<String> = range.months().map(|m| m.to_string()).collect();
        let value = serde_json::json!({
            "start": range.start(),
            "end": range.end(),
            "numDays": range.num_days(),
            "months": months,
            "text": text,
            "label": label,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{text}");
        println!("{label}");
    }
    Ok(())
}
