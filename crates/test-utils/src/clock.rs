use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use lazydag::engine::Clock;

/// Clock that replays a fixed sequence of samples, in seconds.
///
/// Once the sequence is exhausted the last sample is repeated.
#[derive(Debug)]
pub struct ScriptedClock {
    samples: Mutex<VecDeque<f64>>,
    last: Mutex<f64>,
}

impl ScriptedClock {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
            last: Mutex::new(0.0),
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Duration {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.samples.lock().unwrap().pop_front() {
            *last = next;
        }
        Duration::from_secs_f64(*last)
    }
}
