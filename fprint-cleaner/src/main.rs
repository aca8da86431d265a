use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use clap::{Parser, Subcommand};
use fprint_cleaner::{
    combine_folders, ingest_fingerprint, list_source_folders, offset_locations, parse_workers,
    CleanBatch, CleanerConfig, Layout,
};
use fprint_core::{decode_file, OutputFormat, TableWriter};
use fprint_types::{RecordKind, SchemaRegistry};
use log::{error, info, warn, LevelFilter};

#[derive(Parser, Debug)]
#[command(
    name = "fprint",
    version = env!("CARGO_PKG_VERSION"),
    about = "Decode raw LTE fingerprint captures into typed tables",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Тихий режим (только ошибки)
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Подробный вывод (debug)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Очистить все отпечатки из locations.json
    Clean {
        /// Корень раскладки (ce/, else/, info/, locations.json)
        #[arg(default_value = "dev")]
        root: PathBuf,
        /// Формат таблиц: fpt, json, csv
        #[arg(long, default_value = "fpt")]
        format: String,
        /// Не сжимать тело .fpt
        #[arg(long)]
        no_compress: bool,
        /// Перечистить уже очищенные отпечатки
        #[arg(long)]
        force: bool,
        /// Потоков-декодеров (число или auto)
        #[arg(short, long, default_value = "auto")]
        workers: String,
    },
    /// Декодировать один сырой файл
    Decode {
        /// Тип записей: ce, else, info
        #[arg(short, long)]
        kind: String,
        /// Сырой файл
        input: PathBuf,
        /// Выходной файл
        output: PathBuf,
        /// Формат таблицы: fpt, json, csv
        #[arg(long, default_value = "fpt")]
        format: String,
        /// Не сжимать тело .fpt
        #[arg(long)]
        no_compress: bool,
    },
    /// Перенести свежий захват (ce.txt, else.txt, info.txt) в раскладку
    Ingest {
        /// Координата x точки записи
        #[arg(short, long, allow_hyphen_values = true)]
        x: f64,
        /// Координата y точки записи
        #[arg(short, long, allow_hyphen_values = true)]
        y: f64,
        /// Папка с файлами приёмника
        #[arg(long, default_value = ".")]
        src: PathBuf,
        /// Корень раскладки
        #[arg(long, default_value = "dev")]
        dest: PathBuf,
    },
    /// Сдвинуть все координаты в locations.json
    Offset {
        /// Корень раскладки
        root: PathBuf,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dx: f64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: f64,
    },
    /// Объединить очищенные CE-таблицы нескольких раскладок
    Combine {
        /// Папка, подпапки которой объединяются
        src: PathBuf,
        /// Раскладка назначения
        dest: PathBuf,
        /// Формат таблиц: fpt, json, csv
        #[arg(long, default_value = "fpt")]
        format: String,
    },
}

fn parse_or_exit<T>(
    flag: &str,
    result: Result<T, String>,
) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            error!("{flag}: {e}");
            std::process::exit(1);
        }
    }
}

fn run_clean(
    root: PathBuf,
    format: &str,
    no_compress: bool,
    force: bool,
    workers: &str,
) {
    let config = CleanerConfig {
        root,
        output_format: parse_or_exit("--format", format.parse()),
        compress: !no_compress,
        force,
        workers: parse_or_exit("--workers", parse_workers(workers)),
        ..CleanerConfig::default()
    };

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Root          : {:?}", config.root);
    info!("  Format        : {}", config.output_format);
    info!("  Compression   : {}", if config.compress { "lz4" } else { "none" });
    info!("  Workers       : {}", config.workers);
    info!("  Force         : {}", config.force);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let (batch, metrics) = CleanBatch::new(config);
    let stop_flag: Arc<AtomicBool> = batch.stop_flag();
    let stop_ctrlc = stop_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C: принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received, finishing in-flight fingerprints...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    let start = Instant::now();

    let summary = match batch.run() {
        Ok(s) => s,
        Err(e) => {
            error!("Clean failed: {e}");
            std::process::exit(1);
        }
    };

    info!("\n{}", metrics.summary(&start));

    if summary.stopped {
        warn!(
            "Interrupted: {} of {} fingerprint(s) not started",
            summary.planned.len() - summary.cleaned.len() - summary.failed.len(),
            summary.planned.len()
        );
    }

    if !summary.failed.is_empty() {
        for (id, reason) in &summary.failed {
            warn!("⚠ fingerprint {id}: {reason}");
        }
        std::process::exit(1);
    }

    info!("✓ Clean complete: {} fingerprint(s)", summary.cleaned.len());
}

fn run_decode(
    kind: &str,
    input: PathBuf,
    output: PathBuf,
    format: &str,
    no_compress: bool,
) {
    let kind = parse_or_exit(
        "--kind",
        kind.parse::<RecordKind>().map_err(|e| e.to_string()),
    );
    let format: OutputFormat = parse_or_exit("--format", format.parse());
    let registry = SchemaRegistry::standard();

    let decoded = match decode_file(&input, registry.get(kind)) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to decode {input:?}: {e}");
            std::process::exit(1);
        }
    };

    let writer = TableWriter::new(format).compressed(!no_compress);
    let bytes = match writer.write(&output, &decoded.table) {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to write {output:?}: {e}");
            std::process::exit(1);
        }
    };

    let s = &decoded.stats;
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Kind          : {kind}");
    info!("  Values        : {}", s.values_scanned);
    info!("  Records       : {}", s.records_framed);
    info!("  Misframed     : {} spans, {} values", s.misframed_spans, s.misframed_values);
    info!("  Trailing      : {} values, {} bytes", s.trailing_values, s.trailing_bytes);
    info!("  Non-finite    : {} rows", s.rows_non_finite);
    info!("  Rows          : {}", s.rows);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("✓ Wrote {output:?} ({bytes} bytes)");
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    match cli.command {
        Command::Clean {
            root,
            format,
            no_compress,
            force,
            workers,
        } => run_clean(root, &format, no_compress, force, &workers),
        Command::Decode {
            kind,
            input,
            output,
            format,
            no_compress,
        } => run_decode(&kind, input, output, &format, no_compress),
        Command::Ingest { x, y, src, dest } => {
            match ingest_fingerprint(&src, &Layout::new(dest), [x, y]) {
                Ok(id) => info!("✓ Fingerprint {id} ingested"),
                Err(e) => {
                    error!("Ingest failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Offset { root, dx, dy } => {
            if let Err(e) = offset_locations(&Layout::new(root), dx, dy) {
                error!("Offset failed: {e}");
                std::process::exit(1);
            }
        }
        Command::Combine { src, dest, format } => {
            let format: OutputFormat = parse_or_exit("--format", format.parse());
            let result = list_source_folders(&src)
                .and_then(|folders| combine_folders(&folders, &Layout::new(dest), format));

            match result {
                Ok(s) => info!(
                    "✓ Combined {} folder(s), {} fingerprint(s)",
                    s.folders, s.fingerprints
                ),
                Err(e) => {
                    error!("Combine failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
