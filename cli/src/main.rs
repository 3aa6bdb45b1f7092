//! webdocx CLI - web page to Word document tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use webdocx::convert::{ConvertOptions, Converter, Stage};
use webdocx::impression::{
    generate_impression, AiSettings, FileSettingsStore, HttpImpressionClient, Provider,
    SettingsStore,
};
use webdocx::report::{PatientInfo, Region, ReportForm, ReportTemplate, BUILTIN_TEMPLATES};
use webdocx::{Document, JsonFormat, ListMode};

const DEFAULT_OUTPUT: &str = "extracted.docx";

#[derive(Parser)]
#[command(name = "webdocx")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert web pages to Word documents with figure cross-references", long_about = None)]
struct Cli {
    /// Page URL
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Output DOCX file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "WEBDOCX_SETTINGS", value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct FetchArgs {
    /// Proxy endpoint taking the target as a `url` query parameter
    #[arg(long, env = "WEBDOCX_PROXY", value_name = "URL")]
    proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// List rendering mode
    #[arg(long, value_enum, default_value = "numbering")]
    list_mode: ListStyle,

    /// Disable figure bookmarks and links
    #[arg(long)]
    no_xref: bool,

    /// Fail on the first image that cannot be embedded
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a page to DOCX
    Convert {
        /// Page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Convert a saved HTML file to DOCX
    Html {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// URL the page was saved from, for relative image sources
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Convert a page to JSON
    Json {
        /// Page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Convert a page to plain text
    Text {
        /// Page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Show conversion statistics for a page
    Info {
        /// Page URL
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Draft a structured report
    Report(ReportArgs),

    /// List template sections and options
    Template {
        /// Built-in template id
        #[arg(default_value = "mri_knee")]
        id: String,

        /// Print the template as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage AI settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct ReportArgs {
    /// Built-in template id
    #[arg(long, default_value = "mri_knee")]
    template: String,

    /// Template JSON file (overrides --template)
    #[arg(long, value_name = "FILE")]
    template_file: Option<PathBuf>,

    /// Region examined (right, left, bilateral)
    #[arg(long, default_value = "right")]
    region: String,

    /// Finding for a section, as SECTION=LABEL
    #[arg(short, long = "select", value_name = "SECTION=LABEL")]
    selections: Vec<String>,

    /// Note for a section, as SECTION=TEXT
    #[arg(short, long = "note", value_name = "SECTION=TEXT")]
    notes: Vec<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    age: Option<String>,

    #[arg(long)]
    sex: Option<String>,

    /// Study date (defaults to today)
    #[arg(long)]
    date: Option<String>,

    /// Referring physician
    #[arg(long = "ref")]
    ref_physician: Option<String>,

    /// Impression text
    #[arg(long, conflicts_with = "ai")]
    impression: Option<String>,

    /// Draft the impression with the configured AI provider
    #[arg(long)]
    ai: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show current settings
    Show,
    /// Set the AI provider (gemini, openai)
    SetProvider {
        #[arg(value_name = "PROVIDER")]
        provider: String,
    },
    /// Store the API key
    SetKey {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Remove the stored API key
    ClearKey,
}

#[derive(Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
enum ListStyle {
    /// Word list numbering
    #[default]
    Numbering,
    /// Literal bullet prefix
    Bullet,
}

impl From<ListStyle> for ListMode {
    fn from(style: ListStyle) -> Self {
        match style {
            ListStyle::Numbering => ListMode::Numbering,
            ListStyle::Bullet => ListMode::BulletPrefix,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let settings = cli.settings.clone();

    let result = match cli.command {
        Some(Commands::Convert { url, output, fetch }) => {
            cmd_convert(&url, output.as_deref(), &fetch)
        }
        Some(Commands::Html {
            input,
            base_url,
            output,
            fetch,
        }) => cmd_html(&input, base_url.as_deref(), output.as_deref(), &fetch),
        Some(Commands::Json {
            url,
            output,
            compact,
            fetch,
        }) => cmd_json(&url, output.as_deref(), compact, &fetch),
        Some(Commands::Text { url, output, fetch }) => cmd_text(&url, output.as_deref(), &fetch),
        Some(Commands::Info { url, fetch }) => cmd_info(&url, &fetch),
        Some(Commands::Report(args)) => cmd_report(&args, settings.as_deref()),
        Some(Commands::Template { id, json }) => cmd_template(&id, json),
        Some(Commands::Settings { command }) => cmd_settings(command, settings.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if a URL is provided
            if let Some(url) = cli.url {
                cmd_convert(&url, cli.output.as_deref(), &FetchArgs::default())
            } else {
                println!("{}", "Usage: webdocx <URL> [OUTPUT]".yellow());
                println!("       webdocx --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn convert_options(fetch: &FetchArgs) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
    let mut options = ConvertOptions::new()
        .with_list_mode(fetch.list_mode.into())
        .with_cross_references(!fetch.no_xref);
    if let Some(ref proxy) = fetch.proxy {
        options = options.with_proxy(url::Url::parse(proxy).map_err(|e| format!("Invalid proxy URL: {}", e))?);
    }
    if let Some(secs) = fetch.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    if fetch.strict {
        options = options.strict();
    }
    Ok(options)
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(5);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn report_stage(pb: &ProgressBar, stage: Stage) {
    pb.set_message(stage.message());
    pb.inc(1);
}

fn fetch_document(url: &str, fetch: &FetchArgs) -> Result<Document, Box<dyn std::error::Error>> {
    let converter = Converter::new(convert_options(fetch)?)?;
    Ok(converter.convert_url(url)?)
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn print_summary(doc: &Document, path: &Path) {
    println!("\n{} {}", "Saved to".green().bold(), path.display());
    println!("  {} {} paragraphs", "├─".dimmed(), doc.paragraph_count());
    println!("  {} {} images", "├─".dimmed(), doc.metadata.image_count);
    if doc.metadata.skipped_images > 0 {
        println!(
            "  {} {}",
            "├─".dimmed(),
            format!("{} images skipped", doc.metadata.skipped_images).yellow()
        );
    }
    println!(
        "  {} {} figure bookmarks, {} links",
        "└─".dimmed(),
        doc.metadata.bookmark_count,
        doc.metadata.link_count
    );
}

fn cmd_convert(url: &str, output: Option<&Path>, fetch: &FetchArgs) -> CliResult {
    let output = output.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT));
    let converter = Converter::new(convert_options(fetch)?)?;

    let pb = progress_bar();
    let doc = converter.convert_url_with_progress(url, |stage| report_stage(&pb, stage))?;

    report_stage(&pb, Stage::GeneratingDocument);
    webdocx::render::write_docx(&doc, output)?;
    pb.finish_with_message(Stage::Done.message());

    print_summary(&doc, output);
    Ok(())
}

fn cmd_html(
    input: &Path,
    base_url: Option<&str>,
    output: Option<&Path>,
    fetch: &FetchArgs,
) -> CliResult {
    let html = fs::read_to_string(input)?;
    let default_output = input.with_extension("docx");
    let output = output.unwrap_or(&default_output);
    let converter = Converter::new(convert_options(fetch)?)?;

    let pb = progress_bar();
    pb.inc(1);
    let doc = converter.convert_html_with_progress(&html, base_url, |stage| report_stage(&pb, stage))?;

    report_stage(&pb, Stage::GeneratingDocument);
    webdocx::render::write_docx(&doc, output)?;
    pb.finish_with_message(Stage::Done.message());

    print_summary(&doc, output);
    Ok(())
}

fn cmd_json(url: &str, output: Option<&Path>, compact: bool, fetch: &FetchArgs) -> CliResult {
    let doc = fetch_document(url, fetch)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = webdocx::render::to_json(&doc, format)?;
    write_output(output, &json)
}

fn cmd_text(url: &str, output: Option<&Path>, fetch: &FetchArgs) -> CliResult {
    let doc = fetch_document(url, fetch)?;
    let text = webdocx::render::to_text(&doc);
    write_output(output, &text)
}

fn cmd_info(url: &str, fetch: &FetchArgs) -> CliResult {
    let doc = fetch_document(url, fetch)?;
    let meta = &doc.metadata;

    println!("{}", "Page Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if let Some(ref source) = meta.source_url {
        println!("{}: {}", "URL".bold(), source);
    }
    if let Some(ref title) = meta.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref fetched) = meta.fetched_at {
        println!("{}: {}", "Fetched".bold(), fetched.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    let headings = doc.paragraphs.iter().filter(|p| p.is_heading()).count();
    let list_items = doc.paragraphs.iter().filter(|p| p.is_list_item()).count();

    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Headings".bold(), headings);
    println!("{}: {}", "List items".bold(), list_items);
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Images".bold(), meta.image_count);
    println!("{}: {}", "Skipped images".bold(), meta.skipped_images);
    println!("{}: {}", "Figure bookmarks".bold(), meta.bookmark_count);
    println!("{}: {}", "Figure links".bold(), meta.link_count);
    println!(
        "{}: {} x {} twips",
        "Page size".bold(),
        doc.layout.width,
        doc.layout.height
    );

    Ok(())
}

fn split_pair(pair: &str) -> Result<(&str, &str), String> {
    pair.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| format!("Expected SECTION=VALUE, got: {}", pair))
}

fn settings_path(explicit: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let dir = dirs::config_dir().ok_or("Could not determine the config directory")?;
    Ok(dir.join("webdocx").join("settings.json"))
}

fn cmd_report(args: &ReportArgs, settings: Option<&Path>) -> CliResult {
    let template = match args.template_file {
        Some(ref path) => ReportTemplate::from_file(path)?,
        None => ReportTemplate::builtin(&args.template)?,
    };
    let region: Region = args.region.parse()?;

    let mut patient = PatientInfo::new();
    if let Some(ref name) = args.name {
        patient = patient.with_name(name);
    }
    if let Some(ref id) = args.id {
        patient = patient.with_id(id);
    }
    if let Some(ref age) = args.age {
        patient = patient.with_age(age);
    }
    if let Some(ref sex) = args.sex {
        patient = patient.with_sex(sex);
    }
    if let Some(ref date) = args.date {
        patient = patient.with_date(date);
    }
    if let Some(ref physician) = args.ref_physician {
        patient = patient.with_ref_physician(physician);
    }

    let mut form = ReportForm::new(template)
        .with_region(region)
        .with_patient(patient);
    for pair in &args.selections {
        let (section, label) = split_pair(pair)?;
        form.select(section, label)?;
    }
    for pair in &args.notes {
        let (section, note) = split_pair(pair)?;
        form.note(section, note)?;
    }

    let impression = if args.ai {
        let path = settings_path(settings)?;
        log::debug!("reading settings from {}", path.display());
        let store = FileSettingsStore::open(&path)?;
        let ai = AiSettings::load(&store)?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Generating impression with {}...", ai.provider.name()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        let client = HttpImpressionClient::new()?;
        let result = generate_impression(&client, &form.findings_text(), &ai);
        spinner.finish_and_clear();
        Some(result?)
    } else {
        args.impression.clone()
    };

    let report = form.render(impression.as_deref());
    write_output(args.output.as_deref(), &report)
}

fn cmd_template(id: &str, json: bool) -> CliResult {
    let template = ReportTemplate::builtin(id).map_err(|e| {
        format!("{} (available: {})", e, BUILTIN_TEMPLATES.join(", "))
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&template)?);
        return Ok(());
    }

    println!("{} ({})", template.title.cyan().bold(), template.id);
    println!("{}", "─".repeat(40).dimmed());
    for section in &template.sections {
        println!("{} {}", section.id.bold(), format!("- {}", section.title).dimmed());
        if !section.description.is_empty() {
            println!("    {}", section.description.dimmed());
        }
        for option in &section.options {
            println!("    {} {}", "•".green(), option.label);
        }
    }
    Ok(())
}

fn cmd_settings(command: SettingsCommand, settings: Option<&Path>) -> CliResult {
    let path = settings_path(settings)?;
    let mut store = FileSettingsStore::open(&path)?;

    match command {
        SettingsCommand::Show => {
            let ai = AiSettings::load(&store)?;
            println!("{}: {}", "Settings file".bold(), path.display());
            println!("{}: {}", "Provider".bold(), ai.provider);
            let key = match ai.api_key {
                Some(ref key) => mask_key(key),
                None => "not set".dimmed().to_string(),
            };
            println!("{}: {}", "API key".bold(), key);
        }
        SettingsCommand::SetProvider { provider } => {
            let provider: Provider = provider.parse()?;
            let mut ai = AiSettings::load(&store)?;
            ai.provider = provider;
            ai.save(&mut store)?;
            println!("{} {}", "Provider set to".green(), provider);
        }
        SettingsCommand::SetKey { key } => {
            let mut ai = AiSettings::load(&store)?;
            ai.api_key = Some(key);
            ai.save(&mut store)?;
            println!("{}", "API key saved".green());
        }
        SettingsCommand::ClearKey => {
            store.remove(webdocx::impression::API_KEY_KEY)?;
            println!("{}", "API key removed".green());
        }
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", visible)
}

fn cmd_version() {
    println!("{} {}", "webdocx".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Web page to Word document tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/webdocx".dimmed());
    println!("License: MIT");
}
