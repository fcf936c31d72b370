use super::silence::{trim_bounds, AudioBuffer, SilenceParams};
use super::AudioError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::{Path, PathBuf};

/// Samples exactly as stored on disk, so cropping never re-quantizes
enum RawSamples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl RawSamples {
    fn to_buffer(&self, spec: &WavSpec) -> AudioBuffer {
        let samples = match self {
            RawSamples::Int(values) => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                values.iter().map(|&v| v as f32 / full_scale).collect()
            }
            RawSamples::Float(values) => values.clone(),
        };
        AudioBuffer {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        }
    }
}

/// Write mono float samples as 16-bit PCM, peak-normalized the way the
/// upstream synthesizer saves its output.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    let scale = i16::MAX as f32 / peak.max(0.01);

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        let value = (sample * scale).clamp(i16::MIN as f32, i16::MAX as f32);
        writer.write_sample(value as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file into normalized float samples
pub fn read_wav(path: &Path) -> Result<AudioBuffer, AudioError> {
    let (spec, raw) = read_raw(path)?;
    Ok(raw.to_buffer(&spec))
}

fn read_raw(path: &Path) -> Result<(WavSpec, RawSamples), AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let raw = match spec.sample_format {
        SampleFormat::Int => RawSamples::Int(reader.samples::<i32>().collect::<Result<_, _>>()?),
        SampleFormat::Float => {
            RawSamples::Float(reader.samples::<f32>().collect::<Result<_, _>>()?)
        }
    };
    Ok((spec, raw))
}

/// Crop leading and trailing silence from a WAV file, rewriting it in place.
///
/// Returns `true` when the file was rewritten. Files that are entirely
/// silent, or whose speech already spans the whole file, are left untouched.
pub fn trim_wav_silence(path: &Path, params: &SilenceParams) -> Result<bool, AudioError> {
    let (spec, raw) = read_raw(path)?;
    let audio = raw.to_buffer(&spec);

    let Some((start, end)) = trim_bounds(&audio, params) else {
        tracing::debug!(path = %path.display(), "No speech detected, skipping trim");
        return Ok(false);
    };
    if start == 0 && end == audio.frame_count() {
        return Ok(false);
    }

    let channels = spec.channels as usize;
    let (from, to) = (start * channels, end * channels);
    replace_via_temp(path, |tmp_path| {
        let mut writer = WavWriter::create(tmp_path, spec)?;
        match &raw {
            RawSamples::Int(values) => {
                for &v in &values[from..to] {
                    writer.write_sample(v)?;
                }
            }
            RawSamples::Float(values) => {
                for &v in &values[from..to] {
                    writer.write_sample(v)?;
                }
            }
        }
        writer.finalize()?;
        Ok(())
    })?;

    tracing::debug!(
        path = %path.display(),
        original_ms = audio.duration_ms(),
        kept_frames = end - start,
        "Trimmed silence"
    );
    Ok(true)
}

/// Write a sibling temp file and rename it over `path`. The temp file never
/// outlives a failure.
fn replace_via_temp<F>(path: &Path, write: F) -> Result<(), AudioError>
where
    F: FnOnce(&Path) -> Result<(), AudioError>,
{
    let tmp_path = temp_path_for(path);
    let result = write(&tmp_path).and_then(|()| Ok(std::fs::rename(&tmp_path, path)?));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".trim.tmp");
    path.with_file_name(name)
}
