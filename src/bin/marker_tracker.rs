/// 标记追踪器 (Marker Tracker)
///
/// 回放色块检测器的录制输出,逐帧计算标定框与可追踪点,
/// 以 JSON Lines 输出 TrackingEvent
///
/// 系统架构:
/// 1. 工作线程: 检测器拉帧 → 帧解释
/// 2. 主线程:   输出事件 / 保存叠加图
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marker_tracker::detection::CornerLabeling;
use marker_tracker::{overlay, track, ReplayDetector, TrackerConfig, TrackingEvent};

/// 标记追踪参数
#[derive(Parser, Debug)]
#[command(author, version, about = "标记追踪器 - 标定框与可追踪点提取", long_about = None)]
struct Args {
    /// 配置文件 (不存在时写入默认配置)
    #[arg(short, long, default_value = "tracker.json")]
    config: PathBuf,

    /// 检测器录制文件 (JSON Lines, 每行一帧)
    #[arg(short, long)]
    replay: PathBuf,

    /// 关闭标定直通,启用角点计算
    #[arg(long)]
    tracking: bool,

    /// 按几何位置标注角点 (默认兼容旧输出)
    #[arg(long)]
    geometric: bool,

    /// 回放帧率 (不设置则尽快回放)
    #[arg(long)]
    fps: Option<f64>,

    /// 叠加图输出目录 (每个事件一张,按事件序号命名)
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// 叠加图尺寸 WxH
    #[arg(long, default_value = "640x480", value_parser = parse_frame_size)]
    frame_size: (u32, u32),

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn parse_frame_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WxH, got `{}`", s))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("width: {}", e))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("height: {}", e))?;
    if w == 0 || h == 0 {
        return Err("frame size must be non-zero".to_string());
    }
    Ok((w, h))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("🚀 标记追踪器启动");

    let mut config = TrackerConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if args.tracking {
        config.calibration_mode = false;
    }
    if args.geometric {
        config.corner_labeling = CornerLabeling::Geometric;
    }
    config.print_summary();

    let mut detector = ReplayDetector::open(&args.replay)?;
    if let Some(fps) = args.fps {
        if fps.is_nan() || fps <= 0.0 {
            bail!("--fps must be positive, got {}", fps);
        }
        detector = detector.with_interval(Duration::from_secs_f64(1.0 / fps));
    }

    let stream = track(detector, &config)?;
    let labeling = config.corner_labeling;

    let (tx, rx) = crossbeam_channel::unbounded::<TrackingEvent>();
    let subscription = stream.subscribe(move |event| {
        if tx.send(event.clone()).is_err() {
            warn!("⚠️ 事件接收端已关闭");
        }
    });

    // 主线程: 输出事件,直到工作线程结束并释放发送端
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (event_id, event) in rx.iter().enumerate() {
        serde_json::to_writer(&mut out, &event)?;
        writeln!(out)?;

        if let Some(dir) = &args.overlay_dir {
            let path =
                overlay::save_event(&event, labeling, dir, event_id as u64, args.frame_size)?;
            info!("🖼️ 叠加图已保存: {}", path.display());
        }
    }
    out.flush()?;

    let stats = subscription.join()?;
    info!(
        "✅ 完成: {}帧, {}个事件, 跳过{}帧",
        stats.frames, stats.events, stats.skipped
    );
    Ok(())
}
