//! Replay driver: feeds a recorded landmark stream through the retargeting
//! pipeline at the render rate and logs the resulting rig state.

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use puppet_tracker::config::Config;
use puppet_tracker::pose::{LandmarkSource, ReplayFrames, ThreadedSource};
use puppet_tracker::rig::{ExpressionName, HumanBone, HumanoidRig};
use puppet_tracker::tracker::{RetargetSession, TickOutcome};

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("puppet_tracker=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let recording = args
        .next()
        .context("usage: puppet-tracker <recording.jsonl> [config.toml]")?;
    let config_path = args.next().unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);

    info!("Puppet Tracker {}", env!("GIT_VERSION"));
    info!(
        "Replay: source {} fps, render {} fps, loop={}",
        config.replay.source_fps, config.replay.render_fps, config.replay.loop_recording
    );

    let frames = ReplayFrames::load(&recording)?;
    info!("Loaded {} frame(s) from {}", frames.len(), recording);

    let mut source =
        ThreadedSource::from_replay(config.replay.source_fps, frames, config.replay.loop_recording);
    source.start()?;

    let mut session = RetargetSession::new(&config, HumanoidRig::full());
    let frame_duration = Duration::from_secs_f64(1.0 / config.replay.render_fps.max(1) as f64);

    // FPS計測
    let mut frame_count = 0u32;
    let mut applied_count = 0u32;
    let mut fps_timer = Instant::now();
    let mut last_tick = Instant::now();

    loop {
        let loop_start = Instant::now();
        let dt = loop_start.duration_since(last_tick).as_secs_f32();
        last_tick = loop_start;

        let report = session.tick(&mut source, dt);
        if let TickOutcome::Applied(_) = report.outcome {
            applied_count += 1;
        }
        frame_count += 1;

        // 記録を最後まで流し終えた（ループ再生では終わらない）
        if !source.is_running() {
            break;
        }

        // ログ（1秒に1回）
        if fps_timer.elapsed() >= Duration::from_secs(1) {
            log_rig_state(session.rig());
            info!("Render: {} fps, applied: {}/s", frame_count, applied_count);
            frame_count = 0;
            applied_count = 0;
            fps_timer = Instant::now();
        }

        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }

    source.stop();
    log_rig_state(session.rig());
    info!("Replay finished, {} frame(s) applied", session.frames_applied());
    Ok(())
}

fn log_rig_state(rig: &HumanoidRig) {
    for bone in [HumanBone::Neck, HumanBone::Chest, HumanBone::LeftUpperArm, HumanBone::RightUpperArm] {
        if let Some(q) = rig.bone_rotation(bone) {
            let (x, y, z) = q.euler_angles();
            info!("  {:<14} [{:+.2}, {:+.2}, {:+.2}]", bone.name(), x, y, z);
        }
    }
    let mouth: Vec<String> = ExpressionName::ALL
        .iter()
        .filter_map(|&e| rig.expression_weight(e).map(|w| format!("{}={:.2}", e.name(), w)))
        .collect();
    info!("  mouth {}", mouth.join(" "));
}
