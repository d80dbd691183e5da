mod app;
mod help;
mod jumpto;
mod strip;
mod theme;
use crate::app::App;
use crate::strip::PAGE_COLUMNS;
use anyhow::Context;
use calpager::{Calendar, Mode, Pager, PagerConfig, WeekdayArg};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::{format_description::FormatItem, macros::format_description, Date, Weekday};
use tracing::debug;
use tracing_subscriber::EnvFilter;

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        mode: Mode,
        week_start: Option<Weekday>,
        marks: Vec<Date>,
        log: Option<PathBuf>,
        date: Option<Date>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut mode = Mode::Weekly;
        let mut week_start = None;
        let mut marks = Vec::new();
        let mut log = None;
        let mut date = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('m') | Arg::Long("mode") => {
                    mode = parser.value()?.parse_with(parse_mode)?;
                }
                Arg::Short('w') | Arg::Long("week-start") => {
                    week_start = Some(parser.value()?.parse::<WeekdayArg>()?.0);
                }
                Arg::Long("mark") => {
                    marks.push(parser.value()?.parse_with(parse_date)?);
                }
                Arg::Long("log") => log = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if date.is_none() => {
                    date = Some(value.parse_with(parse_date)?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            mode,
            week_start,
            marks,
            log,
            date,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                mode,
                week_start,
                marks,
                log,
                date,
            } => {
                if let Some(path) = log {
                    init_logging(&path)?;
                }
                let mut calendar =
                    Calendar::local().context("failed to determine local UTC offset")?;
                if let Some(wd) = week_start {
                    calendar = calendar.with_first_weekday(wd);
                }
                let today = calendar.now();
                let focus = date.map_or(today, Date::midnight);
                debug!(%mode, %focus, "starting");
                let config = PagerConfig::new(f64::from(PAGE_COLUMNS));
                let mut pager = Pager::new(calendar, mode, focus, config)?;
                pager.set_marks(marks.into_iter().map(Date::midnight).collect());
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(pager, today).run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: calpager [<options>] [YYYY-MM-DD]");
                println!();
                println!("Horizontally paged terminal calendar strip");
                println!();
                println!("Options:");
                println!("  -m, --mode <MODE>        Page by day, week, month, or batch (default: week)");
                println!("  -w, --week-start <DAY>   First day of the week (default: Sunday)");
                println!("      --mark <YYYY-MM-DD>  Mark a date as having events; may be repeated");
                println!("      --log <FILE>         Write debug logs to FILE, filtered by RUST_LOG");
                println!("  -h, --help               Display this help message and exit");
                println!("  -V, --version            Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    match s.to_ascii_lowercase().as_str() {
        "day" | "daily" => Ok(Mode::Daily),
        "week" | "weekly" => Ok(Mode::Weekly),
        "month" | "monthly" => Ok(Mode::Monthly),
        "batch" => Ok(Mode::WeeklyBatch),
        _ => Err(format!("unknown mode {s:?}")),
    }
}

fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, &YMD_FMT)
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("debug"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
