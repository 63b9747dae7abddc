/// Evenly spaced values in the half open interval `[start, stop)`, separated by `step`.
///
/// Matches numpy's `arange`: the number of values is `ceil((stop - start) / step)`, and
/// each value is computed as `start + i * step` to avoid accumulating rounding errors.
/// Returns `None` unless `step` is finite and non-zero.
pub fn arange(start: f64, stop: f64, step: f64) -> Option<Arange> {
    if step == 0.0 || !step.is_finite() {
        return None;
    }

    let len = ((stop - start) / step).ceil();
    let len = if len.is_finite() && len > 0.0 {
        len as usize
    } else {
        0
    };

    Some(Arange {
        start,
        step,
        index: 0,
        len,
    })
}

pub struct Arange {
    start: f64,
    step: f64,
    len: usize,
    index: usize,
}

impl Iterator for Arange {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            None
        } else {
            let i = self.index;
            self.index += 1;

            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;

        (n, Some(n))
    }
}

impl ExactSizeIterator for Arange {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn ranges() {
        let values = |start, stop, step| arange(start, stop, step).unwrap().collect::<Vec<_>>();

        assert_eq!(values(0.0, 1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(values(0.0, 1.1, 0.5), vec![0.0, 0.5, 1.0]);
        assert_eq!(values(1.0, 0.0, -0.5), vec![1.0, 0.5]);
        assert!(values(1.0, 0.0, 0.5).is_empty());
        assert_eq!(arange(2.0, 2.0, 0.1).unwrap().len(), 0);
    }

    #[test]
    fn invalid_steps() {
        assert!(arange(0.0, 1.0, 0.0).is_none());
        assert!(arange(0.0, 1.0, -0.0).is_none());
        assert!(arange(0.0, 1.0, f64::NAN).is_none());
        assert!(arange(0.0, 1.0, f64::INFINITY).is_none());
    }

    /// Every value lies in `[start, stop)` and consecutive values differ by `step`.
    #[test]
    fn random_ranges() {
        let mut rng = rand::rng();

        for _ in 0..100 {
            let start = rng.random_range(-10.0..10.0);
            let stop = start + rng.random_range(0.5..20.0);
            let step = rng.random_range(0.01..0.5);

            let values: Vec<f64> = arange(start, stop, step).unwrap().collect();
            assert!(!values.is_empty());
            assert_eq!(values[0], start);
            assert!(values.iter().all(|&v| v < stop + 1e-9));
            for pair in values.windows(2) {
                assert!((pair[1] - pair[0] - step).abs() <= 1e-9);
            }
        }
    }
}
