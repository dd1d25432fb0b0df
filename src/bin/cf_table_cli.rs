//! CLI tool for cf-table - lays out a table config headlessly and outputs JSON
//!
//! Usage:
//!   cf_table_cli <config.json> --width 1000                    # Layout plan to stdout
//!   cf_table_cli <config.json> --width 1000 --height 400 --scroll-height 900
//!   cf_table_cli <config.json> --width 1000 --rows rows.json   # Include the first page
//!   cf_table_cli <config.json> --width 1000 --scrollbar-width 15 -v

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use cf_table::{
    ContainerMetrics, LayoutPlan, MemorySurface, PageState, SystemClock, Table, TableConfig,
    TableOptions,
};
use serde::Serialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

const USAGE: &str = "Usage: cf_table_cli <config.json> --width <px> [--height <px>] \
[--scroll-height <px>] [--rows <rows.json>] [--scrollbar-width <px>] [-v|-vv]";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
    layout: &'a LayoutPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<PageState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rows: Vec<&'a serde_json::Value>,
}

struct Args {
    config_path: String,
    width: f32,
    height: f32,
    scroll_height: Option<f32>,
    rows_path: Option<String>,
    scrollbar_width: Option<f32>,
    verbosity: u8,
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn number(flag: &str, value: Option<&String>) -> f32 {
    match value.map(|v| v.parse::<f32>()) {
        Some(Ok(n)) if n.is_finite() && n >= 0.0 => n,
        _ => fail(&format!("{flag} expects a non-negative number\n{USAGE}")),
    }
}

fn read_config(path: &str) -> cf_table::Result<TableConfig> {
    TableConfig::from_json(&fs::read_to_string(path)?)
}

fn read_rows(path: &str) -> cf_table::Result<Vec<serde_json::Value>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        fail(USAGE);
    }

    let mut parsed = Args {
        config_path: String::new(),
        width: -1.0,
        height: 400.0,
        scroll_height: None,
        rows_path: None,
        scrollbar_width: None,
        verbosity: 0,
    };
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--width" => {
                parsed.width = number(flag, args.get(i + 1));
                i += 1;
            }
            "--height" => {
                parsed.height = number(flag, args.get(i + 1));
                i += 1;
            }
            "--scroll-height" => {
                parsed.scroll_height = Some(number(flag, args.get(i + 1)));
                i += 1;
            }
            "--scrollbar-width" => {
                parsed.scrollbar_width = Some(number(flag, args.get(i + 1)));
                i += 1;
            }
            "--rows" => {
                parsed.rows_path = Some(
                    args.get(i + 1)
                        .cloned()
                        .unwrap_or_else(|| fail(USAGE)),
                );
                i += 1;
            }
            "-v" => parsed.verbosity = 1,
            "-vv" => parsed.verbosity = 2,
            path if parsed.config_path.is_empty() && !path.starts_with('-') => {
                parsed.config_path = path.to_string();
            }
            other => fail(&format!("Unknown argument: {other}\n{USAGE}")),
        }
        i += 1;
    }

    if parsed.config_path.is_empty() || parsed.width < 0.0 {
        fail(USAGE);
    }
    parsed
}

fn main() {
    let args = parse_args();

    let level = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let config = match read_config(&args.config_path) {
        Ok(c) => c,
        Err(e) => fail(&format!("Error in {}: {e}", args.config_path)),
    };
    let rows = match args.rows_path.as_deref().map(read_rows).transpose() {
        Ok(rows) => rows.unwrap_or_default(),
        Err(e) => fail(&format!("Error in rows: {e}")),
    };
    let has_rows = args.rows_path.is_some();

    let mut options = TableOptions::default();
    if let Some(width) = args.scrollbar_width {
        options.layout.scrollbar_width = width;
    }

    let metrics = ContainerMetrics::new(args.width, args.height)
        .with_scroll_height(args.scroll_height.unwrap_or(args.height));
    let surface = MemorySurface::with_metrics(metrics);
    let mut table = Table::with_options(surface, SystemClock::default(), options);
    if let Err(e) = table.set_config(config) {
        fail(&format!("Error in config: {e}"));
    }
    table.set_data(rows);

    if table.recompute().is_none() {
        fail("Nothing to lay out: the config has no columns");
    }
    let Some(plan) = table.last_plan() else {
        fail("Nothing to lay out");
    };

    let output = Output {
        layout: plan,
        page: has_rows.then(|| table.page()),
        rows: table.visible_rows(),
    };
    let json = match serde_json::to_string_pretty(&output) {
        Ok(j) => j,
        Err(e) => fail(&format!("Error serializing JSON: {e}")),
    };
    io::stdout().write_all(json.as_bytes()).unwrap();
    println!();
}
