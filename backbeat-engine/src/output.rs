//! CPAL output: opens a device, moves a [`Mixer`] into its callback, and hands the
//! caller the matching [`MixerLink`] to drive an [`Engine`](crate::Engine) with.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use crate::error::{EngineError, EngineResult};
use crate::mixer::{Mixer, MixerLink};

/// What to open. `None` fields take the device default.
#[derive(Clone, Debug)]
pub struct OutputOptions {
    pub device_name: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub gain: f32,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self { device_name: None, sample_rate: None, channels: None, gain: 0.8 }
    }
}

/// A running output stream. Dropping it closes the device.
pub struct CpalOutput {
    _stream: cpal::Stream,
    device_name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalOutput {
    /// Open and start the stream.
    pub fn open(opts: &OutputOptions) -> EngineResult<(Self, MixerLink)> {
        let host = cpal::default_host();
        info!(host = ?host.id(), "audio host");

        let device = pick_device(&host, opts.device_name.as_deref())?;
        let device_name = device.name().map_err(|e| EngineError::DeviceConfig(e.to_string()))?;
        let supported = choose_config(&device, opts.sample_rate, opts.channels)?;
        let sample_format = supported.sample_format();
        let mut cfg = supported.config();
        if let Some(ch) = opts.channels {
            cfg.channels = ch.max(1);
        }

        let sr = cfg.sample_rate.0;
        if sr == 0 {
            return Err(EngineError::InvalidSampleRate(0.0));
        }
        let (mut mixer, link) = Mixer::new(sr as f32);
        mixer.set_gain(opts.gain);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, mixer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, mixer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, mixer)?,
            other => return Err(EngineError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play().map_err(|e| EngineError::Stream(e.to_string()))?;

        info!(device = %device_name, sample_rate = sr, channels = cfg.channels, ?sample_format, "output stream started");
        let out = Self { _stream: stream, device_name, sample_rate: sr, channels: cfg.channels };
        Ok((out, link))
    }

    #[inline] pub fn device_name(&self) -> &str { &self.device_name }
    #[inline] pub fn sample_rate(&self) -> u32 { self.sample_rate }
    #[inline] pub fn channels(&self) -> u16 { self.channels }
}

/// Names of the default host's output devices.
pub fn list_output_devices() -> EngineResult<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.output_devices().map_err(|e| EngineError::DeviceConfig(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

fn pick_device(host: &cpal::Host, name: Option<&str>) -> EngineResult<cpal::Device> {
    if let Some(name) = name {
        let devices = host.output_devices().map_err(|e| EngineError::DeviceConfig(e.to_string()))?;
        for d in devices {
            if d.name().map(|n| n == name).unwrap_or(false) {
                return Ok(d);
            }
        }
        return Err(EngineError::DeviceNotFound(name.to_string()));
    }
    host.default_output_device().ok_or(EngineError::NoDevice)
}

/// Closest supported config: sample rate distance dominates, channel distance breaks ties.
fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> EngineResult<cpal::SupportedStreamConfig> {
    if req_sr.is_none() && req_ch.is_none() {
        return device.default_output_config().map_err(|e| EngineError::DeviceConfig(e.to_string()));
    }

    let ranges = device.supported_output_configs().map_err(|e| EngineError::DeviceConfig(e.to_string()))?;
    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in ranges {
        let lo = range.min_sample_rate().0;
        let hi = range.max_sample_rate().0;
        let ch_pen = req_ch.map_or(0, |c| u64::from(range.channels().abs_diff(c)));
        let sr_pen = req_sr.map_or(0, |sr| {
            if (lo..=hi).contains(&sr) { 0 } else { u64::from(lo.abs_diff(sr).min(hi.abs_diff(sr))) }
        });
        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or_else(|| EngineError::DeviceConfig("no supported output configs".into()))?;
    let sr = match req_sr {
        Some(sr) => cpal::SampleRate(sr.clamp(range.min_sample_rate().0, range.max_sample_rate().0)),
        None => range.max_sample_rate(),
    };
    Ok(range.with_sample_rate(sr))
}

fn build_stream<T>(device: &cpal::Device, cfg: &cpal::StreamConfig, mut mixer: Mixer) -> EngineResult<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32> + Send + 'static,
{
    let channels = usize::from(cfg.channels.max(1));
    device
        .build_output_stream(
            cfg,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let n = data.len() / channels;
                let mut frames = data.chunks_exact_mut(channels);
                mixer.process(n, |s| {
                    if let Some(frame) = frames.next() {
                        frame.fill(T::from_sample(s));
                    }
                });
            },
            |err| error!("audio stream error: {err}"),
            None,
        )
        .map_err(|e| EngineError::Stream(e.to_string()))
}
