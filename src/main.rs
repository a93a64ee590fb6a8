use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use officewhitener::whitener::batch::{CleanupEvent, collect_candidate_files, run_cleanup_with_sender};
use officewhitener::{PrivacyReport, inspect_document};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use tracing_subscriber::EnvFilter;

/// Elimina autor, empresa, revisiones y rutas absolutas de documentos Office.
#[derive(Parser)]
#[command(name = "officewhitener")]
#[command(author, version, about)]
#[command(after_help = "EJEMPLOS:
    # Limpiar un documento
    officewhitener informe.docx

    # Limpiar todos los documentos de un directorio y sus subdirectorios
    officewhitener -r ~/Documentos/entregas

    # Comprobar sin modificar nada
    officewhitener --check --json presentacion.pptx
")]
struct Cli {
    /// Archivos o directorios a procesar
    #[arg(required = true, value_name = "RUTA")]
    paths: Vec<PathBuf>,

    /// Recorrer también los subdirectorios
    #[arg(short, long)]
    recursive: bool,

    /// Solo informar de la metadata personal, sin modificar archivos
    #[arg(long)]
    check: bool,

    /// Emitir el resultado en JSON por la salida estándar
    #[arg(long)]
    json: bool,

    /// Número de archivos procesados en paralelo
    #[arg(short, long, env = "OFFICEWHITENER_JOBS", default_value_t = 1)]
    jobs: usize,

    /// Nivel de detalle de los registros (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Mostrar solo errores
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum CheckOutcome {
    Inspected {
        clean: bool,
        findings: Vec<&'static str>,
        report: PrivacyReport,
    },
    Failed {
        path: PathBuf,
        kind: &'static str,
        error: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("{} {error:#}", style("Error:").red().bold());
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();
}

/// Devuelve `true` si todos los archivos se procesaron sin errores.
fn run(cli: &Cli) -> Result<bool> {
    let files = expand_paths(&cli.paths, cli.recursive)?;
    if files.is_empty() {
        if !cli.json {
            println!("{}", style("No se encontraron documentos Office.").yellow());
        }
        return Ok(true);
    }

    if cli.check {
        check_files(files, cli.json)
    } else {
        clean_files(files, cli.jobs, cli.json)
    }
}

/// Expande los directorios a sus documentos soportados; los archivos se pasan tal cual.
fn expand_paths(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = collect_candidate_files(path, recursive)
                .with_context(|| format!("no se pudo recorrer {}", path.display()))?;
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn clean_files(files: Vec<PathBuf>, jobs: usize, json: bool) -> Result<bool> {
    let (sender, receiver) = mpsc::channel();
    let worker = thread::spawn(move || run_cleanup_with_sender(files, jobs, sender));

    let mut events = Vec::new();
    for event in receiver.iter() {
        if !json {
            render_event(&event);
        }
        events.push(event);
    }

    let summary = worker
        .join()
        .map_err(|_| anyhow::anyhow!("el hilo de limpieza terminó de forma inesperada"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    }

    Ok(summary.failures == 0)
}

fn render_event(event: &CleanupEvent) {
    match event {
        CleanupEvent::Started { total } => {
            println!("{}", style(format!("┌─ Limpiando {total} documento(s) ─")).cyan());
        }
        CleanupEvent::Processing { index, total, path } => {
            println!(
                "{}",
                style(format!("│ [{index}/{total}] {}", path.display())).dim()
            );
        }
        CleanupEvent::Success { path, family } => {
            println!(
                "{}",
                style(format!("│ ✔ {} ({family})", path.display())).green()
            );
        }
        CleanupEvent::Failure { path, error, .. } => {
            println!(
                "{}",
                style(format!("│ ✘ {}: {error}", path.display())).red()
            );
        }
        CleanupEvent::Finished {
            successes,
            failures,
        } => {
            let line = format!("└─ {successes} limpio(s), {failures} con error");
            if *failures == 0 {
                println!("{}", style(line).green().bold());
            } else {
                println!("{}", style(line).red().bold());
            }
        }
    }
}

fn check_files(files: Vec<PathBuf>, json: bool) -> Result<bool> {
    let mut outcomes = Vec::with_capacity(files.len());
    let mut all_clean = true;

    for path in files {
        let outcome = match inspect_document(&path) {
            Ok(report) => CheckOutcome::Inspected {
                clean: report.is_clean(),
                findings: report.findings(),
                report,
            },
            Err(error) => CheckOutcome::Failed {
                path,
                kind: error.kind(),
                error: error.to_string(),
            },
        };

        all_clean &= matches!(outcome, CheckOutcome::Inspected { clean: true, .. });
        if !json {
            render_check(&outcome);
        }
        outcomes.push(outcome);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    }

    Ok(all_clean)
}

fn render_check(outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::Inspected {
            clean: true,
            report,
            ..
        } => {
            println!(
                "{}",
                style(format!("✔ {} sin información personal", report.path.display())).green()
            );
        }
        CheckOutcome::Inspected {
            findings, report, ..
        } => {
            println!(
                "{}",
                style(format!(
                    "• {} conserva: {}",
                    report.path.display(),
                    findings.join(", ")
                ))
                .yellow()
            );
        }
        CheckOutcome::Failed { path, error, .. } => {
            println!(
                "{}",
                style(format!("✘ {}: {error}", path.display())).red()
            );
        }
    }
}
