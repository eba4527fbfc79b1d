/// Per-frame debug counters and the rolling render-time window.

use std::collections::VecDeque;
use std::time::Duration;

/// Samples kept by the rolling render-time window
pub const DEBUG_WINDOW_SIZE: usize = 60;

/// Counters of the last frame, reset by `Camera::clear`
///
/// Totals count the model parts (each batch member counts once) that survived
/// visibility, sector and frustum culling. Drawn counters count what was
/// actually transformed and handed to the color pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugInfo {
    pub draw_calls: usize,
    pub total_parts: usize,
    pub drawn_parts: usize,
    pub total_tris: usize,
    pub drawn_tris: usize,
    /// Lights active in the last `render` call, world ambient included
    pub light_count: usize,
    /// Time spent in `render` since the last clear
    pub render_time: Duration,
    /// Mean frame render time over the window
    pub average_render_time: Duration,
    /// Slowest frame render time in the window
    pub max_render_time: Duration,
}

/// Last [`DEBUG_WINDOW_SIZE`] frame render times
#[derive(Debug, Default)]
pub(crate) struct RenderTimeWindow {
    samples: VecDeque<Duration>,
}

impl RenderTimeWindow {
    pub fn push(&mut self, sample: Duration) {
        if self.samples.len() == DEBUG_WINDOW_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "debug_info_tests.rs"]
mod tests;
