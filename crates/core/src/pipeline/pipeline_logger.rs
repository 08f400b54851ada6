use std::collections::BTreeMap;
use std::time::Instant;

/// Receives run events from the aligner facade.
///
/// The CLI prints throttled progress and an end-of-run report; tests
/// discard everything.
pub trait PipelineLogger: Send {
    /// `done` of `total` utterances have come back from the engine.
    fn progress(&mut self, done: usize, total: usize);

    /// Wall-clock time spent in a run stage (read, dictionary, engine...).
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A per-utterance quantity, such as the number of engine words.
    fn metric(&mut self, name: &str, value: f64);

    fn note(&mut self, message: &str);

    fn summary(&self) {}
}

pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _done: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn note(&mut self, _message: &str) {}
}

/// Running count, sum and maximum of one recorded quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub count: usize,
    pub total: f64,
    pub max: f64,
}

impl Tally {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Logs progress through `log` every `every` utterances and reports
/// stage times and metrics at the end of the run.
pub struct StdoutPipelineLogger {
    every: usize,
    stages: BTreeMap<String, Tally>,
    metrics: BTreeMap<String, Tally>,
    started: Instant,
    utterances: usize,
}

impl StdoutPipelineLogger {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
            utterances: 0,
        }
    }

    pub fn stage(&self, stage: &str) -> Option<&Tally> {
        self.stages.get(stage)
    }

    pub fn metric_tally(&self, name: &str) -> Option<&Tally> {
        self.metrics.get(name)
    }

    /// End-of-run report, `None` before anything was recorded.
    pub fn report(&self) -> Option<String> {
        if self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Alignment summary ({} utterances, {elapsed:.1}s total):",
            self.utterances
        )];

        for (stage, tally) in &self.stages {
            let share = if elapsed > 0.0 {
                tally.total / (elapsed * 1000.0) * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:<10} {:>9.0} ms  max {:>8.1} ms  {share:5.1}%",
                tally.total, tally.max
            ));
        }
        for (name, tally) in &self.metrics {
            lines.push(format!(
                "  {name:<10} mean {:.1}  max {:.0}  total {:.0}",
                tally.mean(),
                tally.max,
                tally.total
            ));
        }
        if self.utterances > 0 && elapsed > 0.0 {
            lines.push(format!(
                "  {:.2} utterances/s",
                self.utterances as f64 / elapsed
            ));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, done: usize, total: usize) {
        self.utterances = total;
        if total > 0 && (done % self.every == 0 || done == total) {
            log::info!("Aligned {done}/{total} utterances");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.stages.entry(stage.to_string()).or_default().record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().record(value);
    }

    fn note(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(report) = self.report() {
            log::info!("\n{report}");
        }
    }
}
