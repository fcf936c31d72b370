/// Interleaved audio normalized to [-1.0, 1.0]
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Length in whole milliseconds, rounded
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        let frames = self.frame_count() as u64;
        (frames * 1000 + self.sample_rate as u64 / 2) / self.sample_rate as u64
    }

    pub fn ms_to_frame(&self, ms: u64) -> usize {
        let frame = ms * self.sample_rate as u64 / 1000;
        (frame as usize).min(self.frame_count())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SilenceParams {
    /// Windows at or below this RMS level (dBFS) count as silence
    pub silence_thresh_db: f32,
    /// Shortest run of silence that separates two sounds
    pub min_silence_ms: u64,
    pub seek_step_ms: u64,
    /// Audio kept on either side of the detected speech when trimming
    pub keep_ms: u64,
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self {
            silence_thresh_db: -40.0,
            min_silence_ms: 500,
            seek_step_ms: 1,
            keep_ms: 200,
        }
    }
}

/// Running sum of per-frame energy, so any window's RMS is O(1)
struct EnergyIndex {
    prefix: Vec<f64>,
    channels: usize,
}

impl EnergyIndex {
    fn new(audio: &AudioBuffer) -> Self {
        let channels = audio.channels.max(1) as usize;
        let mut prefix = Vec::with_capacity(audio.frame_count() + 1);
        prefix.push(0.0);
        let mut acc = 0.0f64;
        for frame in audio.samples.chunks_exact(channels) {
            acc += frame.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>();
            prefix.push(acc);
        }
        Self { prefix, channels }
    }

    fn rms(&self, start: usize, end: usize) -> f64 {
        if end <= start {
            return 0.0;
        }
        let energy = self.prefix[end] - self.prefix[start];
        (energy / ((end - start) * self.channels) as f64).sqrt()
    }
}

/// Silent ranges in milliseconds, `[start, end)`.
pub fn detect_silence(audio: &AudioBuffer, params: &SilenceParams) -> Vec<(u64, u64)> {
    let seg_len = audio.duration_ms();
    let min_silence = params.min_silence_ms;
    if seg_len < min_silence {
        return Vec::new();
    }

    let step = params.seek_step_ms.max(1);
    let threshold = 10f64.powf(params.silence_thresh_db as f64 / 20.0);
    let energy = EnergyIndex::new(audio);

    let last_slice_start = seg_len - min_silence;
    let mut slice_starts: Vec<u64> = (0..=last_slice_start).step_by(step as usize).collect();
    if last_slice_start % step != 0 {
        slice_starts.push(last_slice_start);
    }

    let silence_starts: Vec<u64> = slice_starts
        .into_iter()
        .filter(|&start| {
            let from = audio.ms_to_frame(start);
            let to = audio.ms_to_frame(start + min_silence);
            energy.rms(from, to) <= threshold
        })
        .collect();

    let Some((&first, rest)) = silence_starts.split_first() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut range_start = first;
    let mut prev = first;
    for &start in rest {
        let continuous = start == prev + step;
        let has_gap = start > prev + min_silence;
        if !continuous && has_gap {
            ranges.push((range_start, prev + min_silence));
            range_start = start;
        }
        prev = start;
    }
    ranges.push((range_start, prev + min_silence));
    ranges
}

/// Non-silent ranges in milliseconds; the complement of [`detect_silence`].
/// Returns an empty list when the whole buffer is silent.
pub fn detect_nonsilent(audio: &AudioBuffer, params: &SilenceParams) -> Vec<(u64, u64)> {
    let seg_len = audio.duration_ms();
    let silent = detect_silence(audio, params);

    if silent.is_empty() {
        return vec![(0, seg_len)];
    }
    if silent[0] == (0, seg_len) {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut prev_end = 0;
    for &(start, end) in &silent {
        ranges.push((prev_end, start));
        prev_end = end;
    }
    if prev_end != seg_len {
        ranges.push((prev_end, seg_len));
    }
    if ranges.first() == Some(&(0, 0)) {
        ranges.remove(0);
    }
    ranges
}

/// Frame range to keep after trimming leading and trailing silence.
/// `None` when no speech is found.
pub fn trim_bounds(audio: &AudioBuffer, params: &SilenceParams) -> Option<(usize, usize)> {
    let nonsilent = detect_nonsilent(audio, params);
    let first = nonsilent.first()?;
    let last = nonsilent.last()?;

    let seg_len = audio.duration_ms();
    let start_ms = first.0.saturating_sub(params.keep_ms);
    let end_ms = (last.1 + params.keep_ms).min(seg_len);

    let start = audio.ms_to_frame(start_ms);
    let end = if end_ms >= seg_len {
        audio.frame_count()
    } else {
        audio.ms_to_frame(end_ms)
    };
    Some((start, end))
}
