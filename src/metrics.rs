use log::info;

use crate::util::SimpleMovingAverage;

pub struct TickMetrics {
    /// Micro seconds spent in the world update
    pub sma_tick_time: SimpleMovingAverage,
    /// Micro seconds spent remeshing and drawing
    pub sma_render_time: SimpleMovingAverage,
    pub sma_remeshed: SimpleMovingAverage,
    pub ticks: u64,
}

impl TickMetrics {
    pub fn new() -> TickMetrics {
        Self {
            sma_tick_time: SimpleMovingAverage::new(100),
            sma_render_time: SimpleMovingAverage::new(100),
            sma_remeshed: SimpleMovingAverage::new(100),
            ticks: 0,
        }
    }

    pub fn log_summary(&self) {
        info!(
            "{} ticks. Avg time to tick: {:.1} micro-s, avg time to render: {:.1} micro-s, avg remeshed geometries per frame: {:.2}",
            self.ticks,
            self.sma_tick_time.get(),
            self.sma_render_time.get(),
            self.sma_remeshed.get(),
        );
    }
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::new()
    }
}
