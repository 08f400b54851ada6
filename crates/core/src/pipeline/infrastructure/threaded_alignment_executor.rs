use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::alignment::domain::utterance_aligner::{AlignmentRequest, UtteranceAligner};
use crate::pipeline::alignment_executor::{AlignmentExecutor, AlignmentOutcome};

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Aligns utterances on a fixed pool of worker threads.
///
/// Layout: `feeder → [worker × n] → main [callback/collect]`
///
/// Each engine call is an independent subprocess chain, so workers never
/// share state beyond the aligner itself.
pub struct ThreadedAlignmentExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedAlignmentExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl AlignmentExecutor for ThreadedAlignmentExecutor {
    fn execute(
        &self,
        aligner: Arc<dyn UtteranceAligner>,
        requests: Vec<AlignmentRequest>,
        on_result: &mut dyn FnMut(usize, &AlignmentOutcome) -> bool,
    ) -> Vec<(usize, AlignmentOutcome)> {
        let total = requests.len();
        let cancelled = Arc::new(AtomicBool::new(false));

        let (job_tx, job_rx) =
            crossbeam_channel::bounded::<(usize, AlignmentRequest)>(self.channel_capacity);
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, AlignmentOutcome)>();

        let feeder = spawn_feeder(requests, job_tx, cancelled.clone());
        let workers: Vec<_> = (0..self.workers.min(total.max(1)))
            .map(|_| {
                spawn_worker(
                    aligner.clone(),
                    job_rx.clone(),
                    result_tx.clone(),
                    cancelled.clone(),
                )
            })
            .collect();
        drop(job_rx);
        drop(result_tx);

        let mut outcomes = Vec::with_capacity(total);
        for (index, outcome) in result_rx {
            if !cancelled.load(Ordering::Relaxed) && !on_result(index, &outcome) {
                log::info!("Stopping alignment after utterance {index}");
                cancelled.store(true, Ordering::Relaxed);
            }
            outcomes.push((index, outcome));
        }

        join_threads(feeder, workers);
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes
    }
}

fn spawn_feeder(
    requests: Vec<AlignmentRequest>,
    job_tx: Sender<(usize, AlignmentRequest)>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for job in requests.into_iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) || job_tx.send(job).is_err() {
                break;
            }
        }
    })
}

fn spawn_worker(
    aligner: Arc<dyn UtteranceAligner>,
    job_rx: Receiver<(usize, AlignmentRequest)>,
    result_tx: Sender<(usize, AlignmentOutcome)>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, request) in job_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let outcome = aligner.align(&request);
            if result_tx.send((index, outcome)).is_err() {
                break;
            }
        }
    })
}

fn join_threads(feeder: JoinHandle<()>, workers: Vec<JoinHandle<()>>) {
    if feeder.join().is_err() {
        log::error!("Alignment feeder thread panicked");
    }
    for worker in workers {
        if worker.join().is_err() {
            log::error!("Alignment worker thread panicked");
        }
    }
}
