use anyhow::{anyhow, bail, Context, Result};
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use table_view::api::extract_rows;
use table_view::config::Config;
use table_view::data::schema::RowSchema;
use table_view::prefs::{FileStore, PreferenceStore};
use table_view::utils::app_paths::AppPaths;
use table_view::utils::logging::init_tracing;
use table_view::view::{
    ColumnDescriptor, ExportOutcome, SearchMode, TableOptions, TableViewController,
};
use tracing::{info, warn};

mod table_display;

use table_display::display_page;

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    file: Option<PathBuf>,
    search: Option<String>,
    sort: Option<(String, bool)>,
    page: Option<usize>,
    page_size: Option<usize>,
    hide: Vec<String>,
    /// `Some(None)` exports under the suggested file name
    export: Option<Option<PathBuf>>,
    storage_key: Option<String>,
    fuzzy: bool,
    reset_columns: bool,
    init_config: bool,
    generate_config: bool,
    show_log: bool,
    help: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cli = CliArgs::default();
        let mut iter = args.iter().peekable();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => cli.help = true,
                "--init-config" => cli.init_config = true,
                "--generate-config" => cli.generate_config = true,
                "--show-log" => cli.show_log = true,
                "--fuzzy" => cli.fuzzy = true,
                "--reset-columns" => cli.reset_columns = true,
                "--search" => cli.search = Some(take_value(&mut iter, "--search")?),
                "--storage-key" => {
                    cli.storage_key = Some(take_value(&mut iter, "--storage-key")?)
                }
                "--hide" => cli.hide.push(take_value(&mut iter, "--hide")?),
                "--page" => {
                    let text = take_value(&mut iter, "--page")?;
                    cli.page = Some(parse_number("--page", &text)?);
                }
                "--page-size" => {
                    let text = take_value(&mut iter, "--page-size")?;
                    cli.page_size = Some(parse_number("--page-size", &text)?);
                }
                "--sort" => {
                    let spec = take_value(&mut iter, "--sort")?;
                    cli.sort = Some(match spec.rsplit_once(':') {
                        Some((key, "desc")) => (key.to_string(), true),
                        Some((key, "asc")) => (key.to_string(), false),
                        _ => (spec.clone(), false),
                    });
                }
                "--export" => {
                    // The path is optional. A following word is the path when the data
                    // file is already known, when it is a .csv, or when another plain
                    // word (the data file) comes after it.
                    let mut ahead = iter.clone();
                    let next = ahead.next();
                    let after = ahead.next();
                    let takes_path = next.map_or(false, |next| {
                        !next.starts_with("--")
                            && (cli.file.is_some()
                                || next.ends_with(".csv")
                                || after.map_or(false, |a| !a.starts_with("--")))
                    });
                    cli.export = Some(if takes_path {
                        iter.next().map(PathBuf::from)
                    } else {
                        None
                    });
                }
                other if other.starts_with("--export=") => {
                    let path = &other["--export=".len()..];
                    if path.is_empty() {
                        bail!("--export= needs a path");
                    }
                    cli.export = Some(Some(PathBuf::from(path)));
                }
                other if other.starts_with("--") => bail!("Unknown option {}", other),
                file => {
                    if cli.file.is_some() {
                        bail!("Only one data file can be given");
                    }
                    cli.file = Some(PathBuf::from(file));
                }
            }
        }

        Ok(cli)
    }
}

fn take_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| anyhow!("{} needs a value", flag))
}

fn parse_number(flag: &str, text: &str) -> Result<usize> {
    text.parse()
        .with_context(|| format!("{} expects a number, got '{}'", flag, text))
}

fn print_help() {
    println!("{}", "table-view - search, sort and page JSON rows".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  table-view [OPTIONS] FILE.json");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}       - Filter rows containing TERM", "--search TERM".green());
    println!("  {}   - Sort by column (add :desc to reverse)", "--sort KEY[:desc]".green());
    println!("  {}           - Show page N", "--page N".green());
    println!("  {}      - Rows per page", "--page-size N".green());
    println!("  {}         - Hide a column (remembered)", "--hide KEY".green());
    println!("  {}     - Restore default columns", "--reset-columns".green());
    println!("  {}   - Export filtered rows", "--export [PATH]".green());
    println!("  {}  - Export to PATH", "--export=PATH".green());
    println!("  {}  - Preference namespace (default: file name)", "--storage-key KEY".green());
    println!("  {}            - Fuzzy search", "--fuzzy".green());
    println!("  {}       - Initialize configuration with wizard", "--init-config".green());
    println!("  {}   - Generate config file with defaults", "--generate-config".green());
    println!("  {}         - Print captured log lines at exit", "--show-log".green());
    println!("  {}            - Show this help", "--help".green());
    println!();
}

/// "floor_count" -> "Floor Count"
fn label_for(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {:?}", parent))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {:?}", path))?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize table-view.");
    Ok(())
}

fn preference_store(config: &Config) -> Result<Arc<dyn PreferenceStore>> {
    let path = match &config.storage.preferences_file {
        Some(path) => path.clone(),
        None => AppPaths::preferences_file()?,
    };
    Ok(Arc::new(FileStore::new(path)))
}

fn run(cli: CliArgs, config: Config) -> Result<()> {
    let file = cli
        .file
        .ok_or_else(|| anyhow!("No data file given (try --help)"))?;
    let storage_key = match cli.storage_key {
        Some(key) => key,
        None => file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string(),
    };

    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("{} is not JSON", file.display()))?;
    let rows = extract_rows(json, None)?;

    let schema = RowSchema::infer(storage_key.clone(), &rows);
    let table = schema.from_json_rows(&rows)?;
    let columns: Vec<ColumnDescriptor> = schema
        .fields
        .iter()
        .map(|f| ColumnDescriptor::new(f.key.clone(), label_for(&f.key)))
        .collect();

    let mut options = TableOptions::from_config(&config);
    if cli.fuzzy {
        options.search_mode = SearchMode::Fuzzy;
    }

    let mut controller =
        TableViewController::new(columns, preference_store(&config)?, storage_key, options);
    controller.set_data(table);

    if cli.reset_columns {
        controller.reset_columns();
    }
    for key in &cli.hide {
        if controller.is_column_visible(key) && !controller.toggle_column_visibility(key) {
            warn!(target: "table_view", "Column '{}' cannot be hidden", key);
        }
    }
    if let Some(size) = cli.page_size {
        controller.set_page_size(size);
    }
    if let Some(term) = &cli.search {
        controller.set_search_term(term);
    }
    if let Some((key, descending)) = &cli.sort {
        if !controller.toggle_sort(key) {
            warn!(target: "table_view", "Cannot sort by '{}'", key);
        } else if *descending {
            controller.toggle_sort(key);
        }
    }
    if let Some(page) = cli.page {
        controller.set_page(page);
    }

    display_page(&controller);

    if let Some(target) = cli.export {
        match controller.export_rows()? {
            ExportOutcome::File(export) => {
                let path = target.unwrap_or_else(|| Path::new(&export.file_name).to_path_buf());
                std::fs::write(&path, &export.bytes)
                    .with_context(|| format!("Cannot write {}", path.display()))?;
                info!(target: "table_view", "Wrote {}", path.display());
                println!("{}", format!("Exported to {}", path.display()).green());
            }
            ExportOutcome::Delegated { rows } => {
                println!("Exported {} rows", rows);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let log_buffer = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args)?;

    if cli.help {
        print_help();
        return Ok(());
    }

    if cli.init_config {
        Config::init_wizard()?;
        println!("\nConfiguration initialized successfully!");
        return Ok(());
    }

    if cli.generate_config {
        return generate_config();
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(target: "table_view", "Using default config: {}", e);
        Config::default()
    });

    let show_log = cli.show_log;
    let result = run(cli, config);

    if show_log {
        println!();
        for entry in log_buffer.get_recent(1000) {
            println!("{}", entry.format_for_display());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = CliArgs::parse(&args(&[
            "--search",
            "tower",
            "--sort",
            "name:desc",
            "--page",
            "2",
            "--hide",
            "notes",
            "--hide",
            "owner",
            "sites.json",
            "--export",
        ]))
        .unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("sites.json")));
        assert_eq!(cli.search.as_deref(), Some("tower"));
        assert_eq!(cli.sort, Some(("name".to_string(), true)));
        assert_eq!(cli.page, Some(2));
        assert_eq!(cli.hide, vec!["notes", "owner"]);
        assert_eq!(cli.export, Some(None));
    }

    #[test]
    fn test_export_path_and_errors() {
        let cli = CliArgs::parse(&args(&["--export", "out.csv", "rows.json"])).unwrap();
        assert_eq!(cli.export, Some(Some(PathBuf::from("out.csv"))));
        assert_eq!(cli.file, Some(PathBuf::from("rows.json")));

        let cli = CliArgs::parse(&args(&["--export", "out.json", "rows.json"])).unwrap();
        assert_eq!(cli.export, Some(Some(PathBuf::from("out.json"))));
        assert_eq!(cli.file, Some(PathBuf::from("rows.json")));

        let cli = CliArgs::parse(&args(&["--export", "rows.json", "--page", "2"])).unwrap();
        assert_eq!(cli.export, Some(None));
        assert_eq!(cli.file, Some(PathBuf::from("rows.json")));

        let cli = CliArgs::parse(&args(&["--export=report.json", "rows.json"])).unwrap();
        assert_eq!(cli.export, Some(Some(PathBuf::from("report.json"))));
        assert!(CliArgs::parse(&args(&["--export="])).is_err());

        assert!(CliArgs::parse(&args(&["--page", "two"])).is_err());
        assert!(CliArgs::parse(&args(&["--search"])).is_err());
        assert!(CliArgs::parse(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_label_for() {
        assert_eq!(label_for("floor_count"), "Floor Count");
        assert_eq!(label_for("id"), "Id");
        assert_eq!(label_for("asset-tag"), "Asset Tag");
    }
}
