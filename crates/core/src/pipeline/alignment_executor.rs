use std::sync::Arc;

use crate::alignment::domain::alignment_error::AlignmentEngineError;
use crate::alignment::domain::utterance_aligner::{
    AlignmentRequest, UtteranceAligner, UtteranceAlignment,
};

pub type AlignmentOutcome = Result<UtteranceAlignment, AlignmentEngineError>;

/// Abstracts how a batch of utterances is pushed through the engine.
///
/// `on_result` is called on the calling thread as each utterance finishes,
/// in completion order; returning `false` stops further work. The returned
/// outcomes are sorted by request index and may be shorter than `requests`
/// when the run was stopped.
pub trait AlignmentExecutor: Send {
    fn execute(
        &self,
        aligner: Arc<dyn UtteranceAligner>,
        requests: Vec<AlignmentRequest>,
        on_result: &mut dyn FnMut(usize, &AlignmentOutcome) -> bool,
    ) -> Vec<(usize, AlignmentOutcome)>;
}

/// Aligns one utterance at a time on the calling thread.
#[derive(Debug, Default)]
pub struct SequentialAlignmentExecutor;

impl AlignmentExecutor for SequentialAlignmentExecutor {
    fn execute(
        &self,
        aligner: Arc<dyn UtteranceAligner>,
        requests: Vec<AlignmentRequest>,
        on_result: &mut dyn FnMut(usize, &AlignmentOutcome) -> bool,
    ) -> Vec<(usize, AlignmentOutcome)> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let outcome = aligner.align(request);
            let keep_going = on_result(index, &outcome);
            outcomes.push((index, outcome));
            if !keep_going {
                break;
            }
        }
        outcomes
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use crate::textgrid::domain::textgrid::Interval;

    /// Echoes the request words as one interval each; fails requests whose
    /// identifier is listed in `fail`.
    pub(crate) struct EchoAligner {
        pub fail: Vec<String>,
        pub delay: Duration,
        pub calls: Mutex<Vec<String>>,
        pub running: AtomicUsize,
        pub max_running: AtomicUsize,
    }

    impl EchoAligner {
        pub fn new() -> Self {
            Self {
                fail: Vec::new(),
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
                running: AtomicUsize::new(0),
                max_running: AtomicUsize::new(0),
            }
        }
    }

    impl UtteranceAligner for EchoAligner {
        fn name(&self) -> &str {
            "echo"
        }

        fn align(&self, request: &AlignmentRequest) -> AlignmentOutcome {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            thread::sleep(self.delay);
            self.calls
                .lock()
                .unwrap()
                .push(request.identifier.clone());
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.fail.contains(&request.identifier) {
                return Err(AlignmentEngineError::UnparsableOutput("stub".to_string()));
            }
            let words = request
                .words
                .iter()
                .enumerate()
                .map(|(i, w)| Interval::new(i as f64 * 0.1, (i + 1) as f64 * 0.1, w.as_str()))
                .collect();
            Ok(UtteranceAlignment {
                phones: Vec::new(),
                words,
            })
        }
    }

    pub(crate) fn request(identifier: &str, word: &str) -> AlignmentRequest {
        AlignmentRequest {
            identifier: identifier.to_string(),
            audio: PathBuf::from("a.wav"),
            start: 0.0,
            duration: 1.0,
            words: vec![word.to_string()],
            dictionary: PathBuf::from("dict"),
            scratch_dir: PathBuf::from("/tmp"),
        }
    }

    #[test]
    fn test_sequential_runs_in_order() {
        let aligner = Arc::new(EchoAligner::new());
        let requests = vec![request("u0", "A"), request("u1", "B"), request("u2", "C")];
        let mut seen = Vec::new();

        let outcomes = SequentialAlignmentExecutor.execute(
            aligner.clone(),
            requests,
            &mut |index, _| {
                seen.push(index);
                true
            },
        );

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(*aligner.calls.lock().unwrap(), vec!["u0", "u1", "u2"]);
        assert_eq!(aligner.max_running.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sequential_stops_when_callback_declines() {
        let mut aligner = EchoAligner::new();
        aligner.fail = vec!["u1".to_string()];
        let aligner = Arc::new(aligner);
        let requests = vec![request("u0", "A"), request("u1", "B"), request("u2", "C")];

        let outcomes = SequentialAlignmentExecutor.execute(
            aligner.clone(),
            requests,
            &mut |_, outcome| outcome.is_ok(),
        );

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[1].1.is_err());
        assert_eq!(aligner.calls.lock().unwrap().len(), 2);
    }
}
