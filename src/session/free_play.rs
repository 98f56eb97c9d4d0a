use crate::engine::Millis;
use crate::generator::packs::Pack;
use crate::session::metrics::{CharState, TypingMetrics, calculate_metrics, char_states, clamp_input};

/// Free typing over the texts of one pack, one sample at a time.
pub struct FreePlaySession {
    pack: Pack,
    sample_index: usize,
    input: String,
    started_at: Option<Millis>,
    elapsed_ms: Millis,
    complete: bool,
    metrics: Option<TypingMetrics>,
}

impl FreePlaySession {
    pub fn new(pack: Pack) -> Self {
        Self {
            pack,
            sample_index: 0,
            input: String::new(),
            started_at: None,
            elapsed_ms: 0,
            complete: false,
            metrics: None,
        }
    }

    pub fn pack(&self) -> &Pack {
        &self.pack
    }

    pub fn target(&self) -> &str {
        self.pack
            .texts
            .get(self.sample_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn elapsed_ms(&self) -> Millis {
        self.elapsed_ms
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn metrics(&self) -> Option<&TypingMetrics> {
        self.metrics.as_ref()
    }

    pub fn char_states(&self) -> Vec<CharState> {
        char_states(self.target(), &self.input)
    }

    /// Feed the whole input buffer. Returns the final metrics exactly once,
    /// on the input that completes the sample.
    pub fn handle_input(&mut self, value: &str, at_ms: Millis) -> Option<TypingMetrics> {
        if self.complete {
            return None;
        }
        let target = self.target().to_string();
        let value = clamp_input(value, &target);
        if self.started_at.is_none() && !value.is_empty() {
            self.started_at = Some(at_ms);
        }
        self.input = value.to_string();

        let duration = self
            .started_at
            .map(|start| at_ms.saturating_sub(start))
            .unwrap_or(0);
        self.elapsed_ms = duration;
        let metrics = calculate_metrics(&target, &self.input, duration);
        self.metrics = Some(metrics);

        if !target.is_empty() && self.input == target {
            self.complete = true;
            tracing::debug!(pack = %self.pack.id, wpm = metrics.wpm, "free play sample complete");
            return Some(metrics);
        }
        None
    }

    /// Refresh the elapsed clock between key presses.
    pub fn tick(&mut self, at_ms: Millis) {
        if self.complete {
            return;
        }
        if let Some(start) = self.started_at {
            self.elapsed_ms = at_ms.saturating_sub(start);
        }
    }

    pub fn restart(&mut self) {
        self.input.clear();
        self.started_at = None;
        self.elapsed_ms = 0;
        self.complete = false;
        self.metrics = None;
    }

    pub fn next_sample(&mut self) {
        self.restart();
        if !self.pack.texts.is_empty() {
            self.sample_index = (self.sample_index + 1) % self.pack.texts.len();
        }
    }
}
