// std imports
use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::Path,
    process,
    sync::Arc,
};

// third-party imports
use clap::Parser;
use env_logger::{self as logger};

// local imports
use axe::{
    Grammar, Options, Pipeline, Printer, Stats,
    cli::{self, Input},
    config,
    error::*,
    output::OutputStream,
};

const AXE_DEBUG_LOG: &str = "AXE_DEBUG_LOG";
const AXE_DEBUG_LOG_STYLE: &str = "AXE_DEBUG_LOG_STYLE";

// ---

fn bootstrap() {
    if std::env::var(AXE_DEBUG_LOG).is_ok() {
        logger::Builder::from_env(logger::Env::new().filter(AXE_DEBUG_LOG).write_style(AXE_DEBUG_LOG_STYLE))
            .format_timestamp_micros()
            .init();
        log::debug!("logging initialized");
    } else {
        logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .format_timestamp_millis()
            .init()
    }
}

fn run() -> Result<()> {
    bootstrap();

    let opt = cli::Opt::parse();
    let settings = config::load(opt.config.as_deref())?;
    log::debug!("settings: {settings:?}");

    let grammar = Arc::new(Grammar::by_name(opt.format.as_deref().unwrap_or(&settings.format))?);
    let options = Options {
        concurrency: match opt.concurrency.or(settings.concurrency) {
            None | Some(0) => num_cpus::get(),
            Some(value) => value,
        },
        queue_capacity: opt
            .queue_capacity
            .map(|value| value as usize)
            .unwrap_or(settings.queue_capacity),
    };

    let time_format = opt.command.time_format().unwrap_or(&settings.time_format);
    let out: OutputStream = Box::new(BufWriter::new(io::stdout()));
    let err: OutputStream = Box::new(BufWriter::new(io::stderr()));
    let mut printer = Printer::new(opt.command.projection(), time_format, out, err)?;

    let pipeline = Pipeline::new(grammar, options);
    let result = process_inputs(&pipeline, opt.command.input(), &mut printer);
    let flushed = printer.flush();
    let stats = result?;
    flushed?;

    log::debug!(
        "done: lines={} records={} errors={}",
        stats.lines,
        stats.records,
        stats.errors
    );

    Ok(())
}

fn process_inputs<O: axe::Output>(pipeline: &Pipeline, input: &Input, output: &mut O) -> Result<Stats> {
    let stdin = [Path::new("-").to_path_buf()];
    let files = if input.files.is_empty() { &stdin[..] } else { &input.files[..] };

    let mut total = Stats::default();
    for path in files {
        let stats = if path == Path::new("-") {
            log::debug!("processing standard input");
            pipeline.run(BufReader::new(io::stdin()), output)?
        } else {
            log::debug!("processing {path:?}");
            let file = File::open(path).map_err(|source| Error::FailedToOpenFileForReading {
                path: path.clone(),
                source,
            })?;
            pipeline.run(BufReader::new(file), output)?
        };
        total.lines += stats.lines;
        total.records += stats.records;
        total.errors += stats.errors;
    }

    Ok(total)
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Err(err) => {
            eprintln!("axe: {err}");
            process::exit(1);
        }
    }
}
