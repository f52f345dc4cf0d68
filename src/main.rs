use clap::{Parser, Subcommand};
use simple_album::app::{self, AlbumEditor, Command as EditorCommand, Notice, parse_command};
use simple_album::backend::{HttpBackend, PhotoBackend};
use simple_album::cache::CachingBackend;
use simple_album::config::{self, AlbumConfig};
use simple_album::export::ExportEvent;
use simple_album::imaging::{CaptureOptions, ImageEncoding, Quality};
use simple_album::layout::LayoutOptions;
use simple_album::types::{Orientation, PaperSize, parse_timestamp};
use simple_album::{logging, output, render};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Shared flags for commands that download photos.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the photo cache and download every photo again
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "simple-album")]
#[command(about = "Lay out, date and export photo albums for print")]
#[command(long_about = "\
Lay out, date and export photo albums for print

Photos come from a photo server that provides:

  GET  /photos-list     [{\"name\": \"beach.jpg\", \"date\": \"2024-01-05 12:00:00\"}, ...]
  POST /update-dates    same shape; replaces the server's dates
  GET  /photos/<name>   the image itself

Photos are shown a few to a page (1 or 2 per page stack in one column,
more use two columns) on A4 or Letter paper. Dates can be edited and
saved back; saving sorts the album by date. 'export' renders every page
into a multi-page PDF.

Run 'simple-album gen-config' to generate a documented album.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Photo server base URL (overrides [server] base_url)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Paper size: a4 or letter
    #[arg(long, global = true)]
    paper: Option<PaperSize>,

    /// Orientation: portrait or landscape
    #[arg(long, global = true)]
    orientation: Option<Orientation>,

    /// Photos per page
    #[arg(long, global = true)]
    per_page: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every page with its photos and dates
    Pages,
    /// Show one page with its navigation state
    Show {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Change photo dates and save them to the server
    SetDate {
        /// Pairs of NAME DATE, e.g. `beach.jpg 2024-01-05T12:00`
        #[arg(required = true, num_args = 2.., value_names = ["NAME", "DATE"])]
        edits: Vec<String>,
    },
    /// Export every page to a PDF
    Export {
        /// Output file (overrides [export] output)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Write an HTML preview of one page
    Preview {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Output file
        #[arg(long, default_value = "album-preview.html")]
        output: PathBuf,
    },
    /// Edit interactively: read commands from stdin
    Shell {
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Print a stock album.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    logging::init_logging(&config.logging);

    let http = HttpBackend::new(
        &config.server.base_url,
        Duration::from_secs(config.server.timeout_secs),
    )?;

    let no_cache = match &cli.command {
        Command::Export { cache, .. } | Command::Shell { cache } => cache.no_cache,
        _ => false,
    };
    if config.cache.enabled && !no_cache {
        let backend = CachingBackend::new(&http, &config.cache.dir, http.base_url())
            .with_max_age(Duration::from_secs(config.cache.max_age_secs));
        run(&cli.command, &config, &backend)?;
        if backend.stats().total() > 0 {
            println!("Cache: {}", backend.stats());
        }
        Ok(())
    } else {
        run(&cli.command, &config, &http)
    }
}

/// Config file layered under the CLI flags.
fn load_config(cli: &Cli) -> Result<AlbumConfig, Box<dyn std::error::Error>> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    if let Some(paper) = cli.paper {
        config.layout.paper_size = paper;
    }
    if let Some(orientation) = cli.orientation {
        config.layout.orientation = orientation;
    }
    if let Some(per_page) = cli.per_page {
        config.layout.photos_per_page = per_page;
    }
    config.validate()?;
    Ok(config)
}

fn open_editor<B: PhotoBackend>(
    config: &AlbumConfig,
    backend: B,
) -> Result<AlbumEditor<B>, Box<dyn std::error::Error>> {
    let layout = LayoutOptions::from_config(&config.layout)
        .ok_or("layout.photos_per_page must be at least 1")?;
    let editor = AlbumEditor::load(backend, layout)
        .with_capture(
            CaptureOptions::from_config(&config.export),
            ImageEncoding::Jpeg(Quality::new(config.export.quality)),
        )
        .with_default_output(&config.export.output);
    Ok(editor)
}

/// Print export progress from a background thread.
fn spawn_progress_printer() -> (mpsc::Sender<ExportEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_export_event(&event);
        }
    });
    (tx, printer)
}

fn run<B: PhotoBackend>(
    command: &Command,
    config: &AlbumConfig,
    backend: B,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Pages => {
            let editor = open_editor(config, backend)?;
            output::print_pages(editor.store().records(), editor.layout());
        }
        Command::Show { page } => {
            let mut editor = open_editor(config, backend)?;
            go_to(&mut editor, *page);
            output::print_page(editor.screen(), editor.navigation());
        }
        Command::SetDate { edits } => {
            if edits.len() % 2 != 0 {
                return Err("set-date expects NAME DATE pairs".into());
            }
            let mut editor = open_editor(config, backend)?;
            for pair in edits.chunks(2) {
                let (name, date) = (&pair[0], parse_timestamp(&pair[1])?);
                let notice = editor.dispatch(EditorCommand::EditDate {
                    photo: name.clone(),
                    date,
                });
                if let Notice::UnknownPhoto(_) = notice {
                    output::print_notice(&notice);
                    return Err(format!("no photo named {name}").into());
                }
                if let Some(record) = editor.store().get(name) {
                    println!("{}", output::format_date_change(name, record));
                }
            }
            let notice = editor.dispatch(EditorCommand::SaveChanges);
            output::print_notice(&notice);
            if let Notice::SaveFailed(message) = notice {
                return Err(message.into());
            }
        }
        Command::Export { output: path, .. } => {
            let (tx, printer) = spawn_progress_printer();
            let notice = {
                let mut editor = open_editor(config, backend)?.with_events(tx);
                editor.dispatch(EditorCommand::Export {
                    output: path.clone(),
                })
            };
            printer.join().ok();
            output::print_notice(&notice);
            if let Notice::ExportFailed(message) = notice {
                return Err(message.into());
            }
        }
        Command::Preview { page, output: path } => {
            let mut editor = open_editor(config, backend)?;
            go_to(&mut editor, *page);
            write_preview(&editor, path)?;
            println!("{} \u{2192} {}", editor.page_info(), path.display());
        }
        Command::Shell { .. } => {
            let (tx, printer) = spawn_progress_printer();
            {
                let editor = open_editor(config, backend)?.with_events(tx);
                run_shell(editor)?;
            }
            printer.join().ok();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

/// Jump to a one-based page, reporting pages that don't exist.
fn go_to<B: PhotoBackend>(editor: &mut AlbumEditor<B>, page: usize) {
    if page <= 1 {
        return;
    }
    let notice = editor.dispatch(EditorCommand::GoToPage(page - 1));
    output::print_notice(&notice);
}

fn write_preview<B: PhotoBackend>(
    editor: &AlbumEditor<B>,
    path: &Path,
) -> Result<(), app::AlbumError> {
    let html = render::render_preview_document(editor.screen()).into_string();
    std::fs::write(path, html)?;
    Ok(())
}

const SHELL_HELP: &str = "\
Commands:
  next | prev | goto N          navigate pages
  per-page N                    photos per page
  paper a4|letter               paper size
  orientation portrait|landscape
  date NAME DATE                change a photo's date
  caption NAME TEXT             change a photo's caption
  save                          save dates to the server
  export [PATH]                 export the album to PDF
  show                          print the current page
  quit";

fn run_shell<B: PhotoBackend>(mut editor: AlbumEditor<B>) -> Result<(), app::AlbumError> {
    output::print_page(editor.screen(), editor.navigation());
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{SHELL_HELP}");
                continue;
            }
            "show" => {
                output::print_page(editor.screen(), editor.navigation());
                continue;
            }
            _ => {}
        }
        match parse_command(&line) {
            Ok(command) => {
                let notice = editor.dispatch(command);
                output::print_notice(&notice);
                if notice == Notice::Rendered {
                    output::print_page(editor.screen(), editor.navigation());
                }
            }
            Err(err) => println!("{err} (type 'help' for commands)"),
        }
    }
    if editor.is_dirty() {
        tracing::warn!("Leaving with unsaved date changes");
    }
    Ok(())
}
