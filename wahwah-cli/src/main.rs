//! Wahwah CLI — drive the effect over a built-in source in realtime, or
//! render an offline pass to a WAV file.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::error::Error;
use std::time::Duration;

use wahwah_core::params::WahwahParams;
use wahwah_engine::effect::{ChannelRole, WahwahEffect, REALTIME_BLOCK_SIZE};
use wahwah_engine::sources::SignalSource;

#[derive(Debug, Default)]
struct Args {
    list_devices: bool,
    device_name: Option<String>,
    sample_rate: Option<u32>,
    channels: Option<u16>,
    duration_sec: Option<u64>,
    render_path: Option<String>,
    source: Option<String>,
    level: Option<f32>,
    freq: Option<f64>,
    lfo_phase: Option<f64>,
    depth: Option<f64>,
    res: Option<f64>,
    freq_ofs: Option<f64>,
    gain_db: Option<f64>,
}

fn parse_args() -> Args {
    let mut a = Args::default();
    for s in std::env::args().skip(1) {
        if s == "--list-devices" { a.list_devices = true; continue; }
        if let Some(rest) = s.strip_prefix("--device=")       { a.device_name = Some(rest.to_string()); continue; }
        if let Some(rest) = s.strip_prefix("--sample-rate=")  { a.sample_rate = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--channels=")     { a.channels    = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--duration=")     { a.duration_sec= rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--render=")       { a.render_path = Some(rest.to_string());continue; }
        if let Some(rest) = s.strip_prefix("--source=")       { a.source      = Some(rest.to_string());continue; }
        if let Some(rest) = s.strip_prefix("--level=")        { a.level       = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--freq=")         { a.freq        = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--lfo-phase=")    { a.lfo_phase   = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--depth=")        { a.depth       = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--res=")          { a.res         = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--freq-offset=")  { a.freq_ofs    = rest.parse().ok();     continue; }
        if let Some(rest) = s.strip_prefix("--gain-db=")      { a.gain_db     = rest.parse().ok();     continue; }
        eprintln!("[warn] unknown arg: {s}");
    }
    a
}

/// Clamp a flag to the declared parameter range, warning when it moved.
/// The core never clamps, so this boundary has to.
fn clamp_flag(name: &str, v: f64, lo: f64, hi: f64) -> f64 {
    let c = v.clamp(lo, hi);
    if c != v {
        eprintln!("[warn] --{name}={v} clamped to {c} (range {lo}..={hi})");
    }
    c
}

fn effect_params(args: &Args) -> WahwahParams {
    type P = WahwahParams;
    let mut p = P::default();
    if let Some(v) = args.freq      { p.freq_hz      = clamp_flag("freq", v, P::FREQ_MIN, P::FREQ_MAX); }
    if let Some(v) = args.lfo_phase { p.phase_deg    = clamp_flag("lfo-phase", v, P::PHASE_MIN, P::PHASE_MAX); }
    if let Some(v) = args.depth     { p.depth_pct    = clamp_flag("depth", v, P::DEPTH_MIN, P::DEPTH_MAX); }
    if let Some(v) = args.res       { p.res          = clamp_flag("res", v, P::RES_MIN, P::RES_MAX); }
    if let Some(v) = args.freq_ofs  { p.freq_ofs_pct = clamp_flag("freq-offset", v, P::FREQ_OFS_MIN, P::FREQ_OFS_MAX); }
    if let Some(v) = args.gain_db   { p.out_gain_db  = clamp_flag("gain-db", v, P::OUT_GAIN_MIN, P::OUT_GAIN_MAX); }
    p
}

fn make_source(name: Option<&str>, seed: u64) -> SignalSource {
    match name.unwrap_or("saw").to_ascii_lowercase().as_str() {
        "sine" => SignalSource::sine(220.0),
        "noise" => SignalSource::noise(seed),
        _ => SignalSource::saw(110.0),
    }
}

fn list_output_devices() -> Result<(), Box<dyn Error>> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

fn pick_device(args: &Args) -> Result<cpal::Device, Box<dyn Error>> {
    let host = cpal::default_host();
    if let Some(name) = &args.device_name {
        for d in host.output_devices()? {
            if d.name()? == *name { return Ok(d); }
        }
        return Err(format!("requested device not found: {name}").into());
    }
    host.default_output_device()
        .ok_or_else(|| "no default output device".into())
}

fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig, Box<dyn Error>> {
    // If nothing requested, default is already concrete.
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    // Score SupportedStreamConfigRanges by distance from the request.
    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let ch     = range.channels();
        let sr_min = range.min_sample_rate().0;
        let sr_max = range.max_sample_rate().0;

        let ch_pen = match req_ch { Some(c) => (i64::from(ch) - i64::from(c)).unsigned_abs(), None => 0 };
        let sr_pen = match req_sr {
            Some(sr) => if (sr_min..=sr_max).contains(&sr) { 0 } else { u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr))) },
            None => 0,
        };

        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or_else(|| "no supported output configs".to_string())?;

    let pick_sr = match req_sr {
        Some(sr) => {
            let lo = range.min_sample_rate().0;
            let hi = range.max_sample_rate().0;
            cpal::SampleRate(sr.clamp(lo, hi))
        }
        None => range.max_sample_rate(),
    };

    Ok(range.with_sample_rate(pick_sr))
}

/// Offline path: render `--duration` seconds of the processed source to a
/// 16-bit WAV. The second channel of a stereo render takes the Right role,
/// so its sweep starts half a turn out of phase.
fn render_wav(path: &str, args: &Args, params: WahwahParams) -> Result<(), Box<dyn Error>> {
    let sr = args.sample_rate.unwrap_or(44_100);
    let channels = args.channels.unwrap_or(2).clamp(1, 2);
    let secs = args.duration_sec.unwrap_or(5);
    let level = args.level.unwrap_or(0.5);
    let frames = sr as usize * secs as usize;

    let mut passes = Vec::new();
    let mut sources = Vec::new();
    for ch in 0..usize::from(channels) {
        let role = match (channels, ch) {
            (1, _) => ChannelRole::Mono,
            (_, 0) => ChannelRole::Left,
            _ => ChannelRole::Right,
        };
        let mut fx = WahwahEffect::new(params)?;
        fx.offline_init(f64::from(sr), role)?;
        passes.push(fx);
        // Same seed per channel: both channels carry the same material,
        // only the sweeps differ.
        sources.push(make_source(args.source.as_deref(), 1));
    }

    let spec = hound::WavSpec {
        channels,
        sample_rate: sr,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let mut in_buf = vec![0.0f32; REALTIME_BLOCK_SIZE];
    let mut out_buf = vec![vec![0.0f32; REALTIME_BLOCK_SIZE]; usize::from(channels)];
    let mut remaining = frames;
    while remaining > 0 {
        let n = remaining.min(REALTIME_BLOCK_SIZE);
        for ch in 0..usize::from(channels) {
            sources[ch].fill(&mut in_buf[..n], sr as f32);
            passes[ch].offline_process(&in_buf[..n], &mut out_buf[ch][..n])?;
        }
        for f in 0..n {
            for ch in 0..usize::from(channels) {
                let s = (out_buf[ch][f] * level).clamp(-1.0, 1.0);
                writer.write_sample((s * f32::from(i16::MAX)) as i16)?;
            }
        }
        remaining -= n;
    }
    writer.finalize()?;

    println!("Rendered {secs} s ({channels} ch @ {sr} Hz) to {path}");
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut effect: WahwahEffect,
    mut sources: Vec<SignalSource>,
    level: f32,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, Box<dyn Error>>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let sr = cfg.sample_rate.0 as f32;
    let channels = cfg.channels as usize;

    // Scratch blocks, allocated once outside the callback.
    let mut in_buf = vec![0.0f32; REALTIME_BLOCK_SIZE];
    let mut ch_out = vec![vec![0.0f32; REALTIME_BLOCK_SIZE]; channels];

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            for chunk in output.chunks_mut(channels * REALTIME_BLOCK_SIZE) {
                let frames = chunk.len() / channels;
                for ch in 0..channels {
                    sources[ch].fill(&mut in_buf[..frames], sr);
                    if let Err(e) =
                        effect.realtime_process(ch, &in_buf[..frames], &mut ch_out[ch][..frames])
                    {
                        eprintln!("[wahwah] process error on channel {ch}: {e}");
                        ch_out[ch][..frames].fill(0.0);
                    }
                }
                for (f, frame) in chunk.chunks_mut(channels).enumerate() {
                    for (ch, slot) in frame.iter_mut().enumerate() {
                        let s = (ch_out[ch][f] * level).clamp(-1.0, 1.0);
                        *slot = T::from_sample(s);
                    }
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();

    if args.list_devices {
        return list_output_devices();
    }

    let params = effect_params(&args);

    println!("wahwah-cli — LFO-swept filter demo\n");

    if let Some(path) = args.render_path.clone() {
        return render_wav(&path, &args, params);
    }

    let device  = pick_device(&args)?;
    let sup_cfg = choose_config(&device, args.sample_rate, args.channels)?;
    let sample_format = sup_cfg.sample_format();
    let mut cfg = sup_cfg.config();

    if let Some(sr) = args.sample_rate { cfg.sample_rate = cpal::SampleRate(sr); }
    if let Some(ch) = args.channels    { cfg.channels    = ch; }

    let sr = f64::from(cfg.sample_rate.0);
    let channels = usize::from(cfg.channels);
    let level = args.level.unwrap_or(0.5);

    let mut effect = WahwahEffect::new(params)?;
    effect.realtime_init();
    for _ in 0..channels {
        effect.realtime_add_channel(sr)?;
    }
    let sources: Vec<SignalSource> = (0..channels)
        .map(|_| make_source(args.source.as_deref(), 1))
        .collect();

    println!("Using device: {}", device.name()?);
    println!("Stream config: {:?} (sample_format: {:?})", cfg, sample_format);
    println!(
        "Params: freq {:.2} Hz | phase {:.0}° | depth {:.0}% | res {:.1} | offset {:.0}% | gain {:.1} dB",
        params.freq_hz, params.phase_deg, params.depth_pct, params.res, params.freq_ofs_pct,
        params.out_gain_db
    );
    println!("Source: {} | Level: {level:.2}", args.source.as_deref().unwrap_or("saw"));
    if let Some(d) = args.duration_sec { println!("Auto-stop after {d} seconds"); }
    println!("Press Ctrl+C to stop…\n");

    let err_fn = |e: cpal::StreamError| eprintln!("[cpal] stream error: {e}");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, effect, sources, level, err_fn)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, effect, sources, level, err_fn)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, effect, sources, level, err_fn)?,
        other => return Err(format!("unsupported device sample format: {other:?}").into()),
    };

    stream.play()?;

    if let Some(d) = args.duration_sec {
        std::thread::sleep(Duration::from_secs(d));
        return Ok(());
    }

    loop { std::thread::sleep(Duration::from_millis(500)); }
}
