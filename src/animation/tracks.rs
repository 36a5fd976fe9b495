use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
    /// glTF Hermite spline. `values` holds an (in-tangent, value,
    /// out-tangent) triple per key.
    CubicSpline,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the key interval found by the previous lookup on a track.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// A sparse, time-ordered sequence of keys.
///
/// Times are in the owning clip's tick base and must be non-decreasing.
/// Sampling never extrapolates: times before the first key return the first
/// value, times after the last key return the last value.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>, // For CubicSpline, length is times.len() * 3
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Creates a track. Keys without a complete value (or value triple, for
    /// splines) are dropped, as are values without a key.
    #[must_use]
    pub fn new(mut times: Vec<f32>, mut values: Vec<T>, interpolation: InterpolationMode) -> Self {
        let per_key = Self::values_per_key(interpolation);
        let len = times.len().min(values.len() / per_key);
        times.truncate(len);
        values.truncate(len * per_key);
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn linear(times: Vec<f32>, values: Vec<T>) -> Self {
        Self::new(times, values, InterpolationMode::Linear)
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
            interpolation: InterpolationMode::Linear,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn values_per_key(interpolation: InterpolationMode) -> usize {
        match interpolation {
            InterpolationMode::CubicSpline => 3,
            _ => 1,
        }
    }

    /// Value of key `index`, skipping spline tangents.
    #[inline]
    #[must_use]
    pub fn key_value(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    /// Time of the final key, if any.
    #[inline]
    #[must_use]
    pub fn last_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Samples the track at `time`.
    ///
    /// Returns `default` for an empty track and the only value for a
    /// single-key track, whatever `time` is.
    #[must_use]
    pub fn sample(&self, time: f32, default: T) -> T {
        match self.times.len() {
            0 => default,
            1 => self.key_value(0),
            _ => self.sample_at_frame(self.interval_of(time), time),
        }
    }

    /// Same result as [`sample`](Self::sample), but starts the key search from
    /// the interval cached in `cursor` and updates it.
    pub fn sample_with_cursor(&self, time: f32, default: T, cursor: &mut KeyframeCursor) -> T {
        match self.times.len() {
            0 => default,
            1 => self.key_value(0),
            _ => {
                let index = self
                    .interval_near(cursor.last_index, time)
                    .unwrap_or_else(|| self.interval_of(time));
                cursor.last_index = index;
                self.sample_at_frame(index, time)
            }
        }
    }

    /// Index `i` of the interval `[times[i], times[i + 1])` holding `time`,
    /// by binary search. Times before the first key map to 0, times at or
    /// after the last key map to the last index.
    fn interval_of(&self, time: f32) -> usize {
        // First key strictly after `time`
        self.times.partition_point(|&t| t <= time).saturating_sub(1)
    }

    /// Looks for `time` within a few intervals of `hint`. `None` when the
    /// jump is too large (scrubbing, loop wrap on a long track).
    fn interval_near(&self, hint: usize, time: f32) -> Option<usize> {
        let last = self.times.len() - 1;
        // A cursor left over from another clip may point past the end
        let hint = hint.min(last);

        if time >= self.times[hint] {
            (hint..=(hint + MAX_SCAN_OFFSET).min(last))
                .find(|&i| i == last || time < self.times[i + 1])
        } else {
            (hint.saturating_sub(MAX_SCAN_OFFSET)..hint)
                .rev()
                .find(|&i| time >= self.times[i])
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();

        // Past the final key: clamp, no extrapolation
        if index >= len - 1 {
            return self.key_value(len - 1);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        // Coincident keys must not divide by zero
        let t = if dt > 0.0 { (time - t0) / dt } else { 0.0 };
        // Also covers times before the first key
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => {
                T::interpolate_linear(self.values[index], self.values[next_idx], t)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;

                let v0 = self.values[i_prev + 1];
                let out_tangent0 = self.values[i_prev + 2];
                let in_tangent1 = self.values[i_next];
                let v1 = self.values[i_next + 1];

                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt)
            }
        }
    }
}
