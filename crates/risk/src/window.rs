use std::collections::VecDeque;

/// A bounded window of the most recent bar returns.
///
/// Sum, sum of squares and the win/loss tallies are maintained as values enter
/// and leave the window, so pushing a return is O(1). Order statistics (VaR,
/// CVaR) sort a copy on demand.
#[derive(Debug, Clone)]
pub struct ReturnWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
    wins: usize,
    win_sum: f64,
    losses: usize,
    loss_sum: f64,
}

impl ReturnWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
            sum_sq: 0.0,
            wins: 0,
            win_sum: 0.0,
            losses: 0,
            loss_sum: 0.0,
        }
    }

    /// Adds a return, evicting and returning the oldest one when full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.values.len() == self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        if let Some(old) = evicted {
            self.account(old, -1.0);
        }
        if self.capacity > 0 {
            self.values.push_back(value);
            self.account(value, 1.0);
        }
        evicted
    }

    fn account(&mut self, value: f64, sign: f64) {
        self.sum += sign * value;
        self.sum_sq += sign * value * value;
        if value > 0.0 {
            self.win_sum += sign * value;
            if sign > 0.0 { self.wins += 1 } else { self.wins -= 1 }
        } else if value < 0.0 {
            self.loss_sum += sign * value;
            if sign > 0.0 { self.losses += 1 } else { self.losses -= 1 }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.sum / self.values.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        analytics::stats::sample_std_dev_from_sums(self.values.len(), self.sum, self.sum_sq)
    }

    /// Fraction of returns strictly above zero.
    pub fn win_rate(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.wins as f64 / self.values.len() as f64
    }

    pub fn average_win(&self) -> f64 {
        if self.wins == 0 { 0.0 } else { self.win_sum / self.wins as f64 }
    }

    /// Mean magnitude of the negative returns.
    pub fn average_loss(&self) -> f64 {
        if self.losses == 0 { 0.0 } else { -self.loss_sum / self.losses as f64 }
    }

    /// Window contents sorted ascending.
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted: Vec<f64> = self.values.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_and_keeps_tallies() {
        let mut window = ReturnWindow::new(3);
        assert_eq!(window.push(0.01), None);
        window.push(-0.02);
        window.push(0.03);
        assert_eq!(window.push(0.04), Some(0.01));

        assert_eq!(window.len(), 3);
        assert!((window.mean() - (0.05 / 3.0)).abs() < 1e-12);
        assert!((window.win_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert!((window.average_win() - 0.035).abs() < 1e-12);
        assert!((window.average_loss() - 0.02).abs() < 1e-12);
        assert_eq!(window.sorted(), vec![-0.02, 0.03, 0.04]);
    }

    #[test]
    fn std_dev_matches_direct_computation() {
        let values = [0.01, -0.03, 0.02, 0.005, -0.01, 0.015];
        let mut window = ReturnWindow::new(4);
        for v in values {
            window.push(v);
        }
        let direct = analytics::stats::sample_std_dev(&values[2..]);
        assert!((window.std_dev() - direct).abs() < 1e-12);
    }

    #[test]
    fn zero_returns_are_neither_win_nor_loss() {
        let mut window = ReturnWindow::new(2);
        window.push(0.0);
        window.push(0.0);
        assert_eq!(window.win_rate(), 0.0);
        assert_eq!(window.average_loss(), 0.0);
    }
}
