use std::collections::VecDeque;

pub struct SimpleMovingAverage {
    window: VecDeque<f32>,
    period: usize,
    sum: f32,
}

impl SimpleMovingAverage {
    pub fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period),
            period,
            sum: 0.0,
        }
    }

    pub fn add(&mut self, value: f32) -> f32 {
        self.window.push_back(value);
        self.sum += value;

        if self.window.len() > self.period {
            if let Some(removed) = self.window.pop_front() {
                self.sum -= removed;
            }
        }

        self.get()
    }

    /// 0 until the first sample arrives
    pub fn get(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.sum / self.window.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::SimpleMovingAverage;

    #[test]
    fn test_average_over_window() {
        let mut sma = SimpleMovingAverage::new(3);
        assert_eq!(sma.get(), 0.0);
        sma.add(3.0);
        sma.add(6.0);
        assert_eq!(sma.add(9.0), 6.0);
        // 3.0 drops out
        assert_eq!(sma.add(12.0), 9.0);
    }
}
