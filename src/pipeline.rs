//
// line processing pipeline
//
// -----------------------------------------------------------
//              |        | N               ->  record  |
// | read-lines -> lines | N * parse-line  ->          | -> output
//              |        | N               ->  error   |
// -----------------------------------------------------------
//
// The reader numbers lines, so error attribution is exact even though
// records are delivered in completion order when N > 1.
//

// std imports
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// third-party imports
use closure::closure;
use crossbeam_channel::{self as channel, Receiver, Sender};
use crossbeam_utils::thread;

// local imports
use crate::error::{Error, Result};
use crate::field::LineError;
use crate::grammar::Grammar;
use crate::parser::Parser;
use crate::record::Record;

// ---

/// Receives the outcome of every processed line.
///
/// Exactly one of the two methods is called once per input line.
/// Both are called from a single thread, in completion order.
/// Returning an error stops the pipeline.
pub trait Output {
    fn on_record(&mut self, record: Record) -> Result<()>;
    fn on_error(&mut self, error: LineError) -> Result<()>;
}

/// Adapts a pair of closures to [`Output`].
pub struct Callbacks<R, E> {
    pub on_record: R,
    pub on_error: E,
}

impl<R, E> Output for Callbacks<R, E>
where
    R: FnMut(Record) -> Result<()>,
    E: FnMut(LineError) -> Result<()>,
{
    #[inline]
    fn on_record(&mut self, record: Record) -> Result<()> {
        (self.on_record)(record)
    }

    #[inline]
    fn on_error(&mut self, error: LineError) -> Result<()> {
        (self.on_error)(error)
    }
}

// ---

#[derive(Debug, Clone)]
pub struct Options {
    /// Number of parser threads.
    pub concurrency: usize,
    /// Capacity of the line and the record queues.
    pub queue_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get(),
            queue_capacity: 1024,
        }
    }
}

/// Counters collected during a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub lines: u64,
    pub records: u64,
    pub errors: u64,
}

// ---

/// Runs a pool of parsers over a stream of lines.
pub struct Pipeline {
    grammar: Arc<Grammar>,
    options: Options,
}

impl Pipeline {
    pub fn new(grammar: Arc<Grammar>, options: Options) -> Self {
        Self { grammar, options }
    }

    /// Reads the input to its end and delivers every line to the output.
    ///
    /// Malformed lines are delivered to [`Output::on_error`] and never stop the run.
    /// Input errors, output errors and broken grammar invariants stop it and are returned.
    pub fn run<I, O>(&self, input: I, output: &mut O) -> Result<Stats>
    where
        I: BufRead + Send,
        O: Output,
    {
        let n = self.options.concurrency.max(1);
        let capacity = self.options.queue_capacity.max(1);
        let failed = AtomicBool::new(false);

        log::debug!("start pipeline: format={} workers={n} capacity={capacity}", self.grammar.name());

        thread::scope(|scope| -> Result<Stats> {
            // prepare line, record and error queues
            let (txl, rxl) = channel::bounded::<(u64, String)>(capacity);
            let (txr, rxr) = channel::bounded::<Record>(capacity);
            let (txe, rxe) = channel::bounded::<LineError>(capacity);

            // spawn reader thread
            let reader = scope.spawn(closure!(ref failed, |_| read(input, txl, failed)));

            // spawn parser threads
            let workers: Vec<_> = (0..n)
                .map(|i| {
                    let grammar = self.grammar.clone();
                    scope.spawn(closure!(clone rxl, clone txr, clone txe, ref failed, |_| {
                        let result = parse(i, grammar, rxl, txr, txe);
                        if result.is_err() {
                            failed.store(true, Ordering::Relaxed);
                        }
                        result
                    }))
                })
                .collect();

            // leave only the worker copies, so that the queues close when the workers finish
            drop((rxl, txr, txe));

            let delivered = deliver(rxr, rxe, output);

            for worker in workers {
                worker.join().map_err(|_| Error::WorkerPanicked)??;
            }
            let lines = reader.join().map_err(|_| Error::WorkerPanicked)??;
            let stats = Stats { lines, ..delivered? };

            log::debug!(
                "pipeline finished: lines={} records={} errors={}",
                stats.lines,
                stats.records,
                stats.errors
            );

            Ok(stats)
        })
        .map_err(|_| Error::WorkerPanicked)?
    }
}

// ---

fn read<I: BufRead>(mut input: I, tx: Sender<(u64, String)>, failed: &AtomicBool) -> Result<u64> {
    let mut buf = Vec::new();
    let mut n: u64 = 0;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        n += 1;
        let line = String::from_utf8_lossy(&buf).into_owned();
        if failed.load(Ordering::Relaxed) || tx.send((n, line)).is_err() {
            log::debug!("reader stopped early after {n} lines");
            break;
        }
    }

    Ok(n)
}

fn parse(
    worker: usize,
    grammar: Arc<Grammar>,
    rx: Receiver<(u64, String)>,
    txr: Sender<Record>,
    txe: Sender<LineError>,
) -> Result<()> {
    let mut parser = Parser::new(grammar);
    let mut n: u64 = 0;

    for (line, text) in rx.iter() {
        let mut record = parser.parse(&text).inspect_err(|err| {
            log::error!("worker {worker}: line {line}: {err}");
        })?;
        n += 1;
        let sent = match record.error.take() {
            Some(error) => {
                log::trace!("worker {worker}: line {line}: field {} failed", error.field());
                txe.send(LineError::new(line, error)).is_ok()
            }
            None => txr.send(record).is_ok(),
        };
        if !sent {
            break;
        }
    }

    log::debug!("worker {worker} finished after {n} lines");
    Ok(())
}

fn deliver<O: Output>(records: Receiver<Record>, errors: Receiver<LineError>, output: &mut O) -> Result<Stats> {
    let mut stats = Stats::default();
    let never_records = channel::never();
    let never_errors = channel::never();
    let (mut records_open, mut errors_open) = (true, true);

    while records_open || errors_open {
        let rxr = if records_open { &records } else { &never_records };
        let rxe = if errors_open { &errors } else { &never_errors };
        crossbeam_channel::select! {
            recv(rxr) -> msg => match msg {
                Ok(record) => {
                    stats.records += 1;
                    output.on_record(record)?;
                }
                Err(_) => records_open = false,
            },
            recv(rxe) -> msg => match msg {
                Ok(error) => {
                    stats.errors += 1;
                    output.on_error(error)?;
                }
                Err(_) => errors_open = false,
            },
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests;
