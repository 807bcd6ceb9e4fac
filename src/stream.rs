//! 追踪事件流 (Tracking Stream)
//! 职责: 检测器 → 帧解释器 → 订阅回调
//!
//! 单订阅者、推送式。一个工作线程依次拉取帧并处理,帧之间不重叠。
//! 流被订阅后即消耗,视频源结束后不可重启,需重新绑定检测器。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::Sender;
use tracing::{error, info};

use crate::color::ColorRegistry;
use crate::config::TrackerConfig;
use crate::detection::{FrameInterpreter, TrackingEvent};
use crate::error::{DetectorError, Result, TrackError};
use crate::input::BlobDetector;

/// 每隔多少帧输出一次统计
const STATS_INTERVAL: u64 = 60;

/// 流统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// 已处理帧数
    pub frames: u64,
    /// 已发出事件数
    pub events: u64,
    /// 点数不足被跳过的帧数
    pub skipped: u64,
}

/// 将检测器绑定到帧解释器
///
/// 按配置构建颜色注册表,并设置检测器的颜色、最小尺寸、最小像素簇。
pub fn track<D>(mut detector: D, config: &TrackerConfig) -> Result<TrackingStream>
where
    D: BlobDetector + 'static,
{
    config.validate()?;
    let registry = Arc::new(config.build_registry()?);
    let names = config.color_names();
    registry.require(&names)?;

    detector.set_colors(Arc::clone(&registry), &names);
    detector.set_min_dimension(config.min_dimension);
    detector.set_min_group_size(config.min_group_size);

    info!(
        "🎯 绑定检测器 {} (颜色: {}, 模式: {:?})",
        detector.name(),
        names.join(","),
        config.mode()
    );

    Ok(TrackingStream {
        detector: Box::new(detector),
        interpreter: config.interpreter(),
        registry,
    })
}

/// 可订阅的追踪事件序列
pub struct TrackingStream {
    detector: Box<dyn BlobDetector>,
    interpreter: FrameInterpreter,
    registry: Arc<ColorRegistry>,
}

impl TrackingStream {
    pub fn interpreter(&self) -> &FrameInterpreter {
        &self.interpreter
    }

    pub fn registry(&self) -> &ColorRegistry {
        &self.registry
    }

    /// 订阅事件流;返回的句柄取消或 drop 后不再回调
    pub fn subscribe<F>(self, on_event: F) -> Subscription
    where
        F: FnMut(&TrackingEvent) + Send + 'static,
    {
        let stopped = Arc::new(AtomicBool::new(false));
        let on_event: EventCallback = Box::new(on_event);
        let callback: SharedCallback = Arc::new(Mutex::new(Some(on_event)));

        // 取消时断开发送端,唤醒阻塞在 next_frame 中的检测器
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(0);
        let mut detector = self.detector;
        detector.set_cancel(cancel_rx);

        let worker = Worker {
            detector,
            interpreter: self.interpreter,
            stopped: Arc::clone(&stopped),
            callback: Arc::clone(&callback),
        };
        let handle = std::thread::spawn(move || worker.run());

        Subscription {
            stopped,
            callback,
            cancel_tx: Some(cancel_tx),
            handle: Some(handle),
        }
    }
}

type EventCallback = Box<dyn FnMut(&TrackingEvent) + Send>;
type SharedCallback = Arc<Mutex<Option<EventCallback>>>;

struct Worker {
    detector: Box<dyn BlobDetector>,
    interpreter: FrameInterpreter,
    stopped: Arc<AtomicBool>,
    callback: SharedCallback,
}

impl Worker {
    fn run(mut self) -> std::result::Result<StreamStats, DetectorError> {
        info!("🔍 帧解释线程启动");

        let mut stats = StreamStats::default();
        let mut last = Instant::now();
        let mut last_frames = 0u64;

        let result = loop {
            if self.stopped.load(Ordering::Acquire) {
                info!("🛑 订阅已取消");
                break Ok(stats);
            }

            let boxes = match self.detector.next_frame() {
                Ok(Some(boxes)) => boxes,
                Ok(None) => {
                    if self.stopped.load(Ordering::Acquire) {
                        info!("🛑 订阅已取消");
                    } else {
                        info!("📹 视频源结束");
                    }
                    break Ok(stats);
                }
                Err(e) => {
                    error!("❌ 检测器故障: {}", e);
                    break Err(e);
                }
            };
            stats.frames += 1;

            match self.interpreter.interpret(&boxes) {
                Some(event) => {
                    let mut guard = self
                        .callback
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    let Some(on_event) = guard.as_mut() else {
                        break Ok(stats);
                    };
                    on_event(&event);
                    stats.events += 1;
                }
                None => stats.skipped += 1,
            }

            if stats.frames % STATS_INTERVAL == 0 {
                let elapsed = last.elapsed().as_secs_f64();
                let fps = if elapsed > 0.0 {
                    (stats.frames - last_frames) as f64 / elapsed
                } else {
                    0.0
                };
                info!(
                    "🎯 帧: {} | 事件: {} | 跳过: {} | {:.1}fps",
                    stats.frames, stats.events, stats.skipped, fps
                );
                last = Instant::now();
                last_frames = stats.frames;
            }
        };

        // 释放检测器 (摄像头资源) 与订阅回调
        drop(self.detector);
        self.callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        result
    }
}

/// 订阅句柄
pub struct Subscription {
    stopped: Arc<AtomicBool>,
    callback: SharedCallback,
    cancel_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<std::result::Result<StreamStats, DetectorError>>>,
}

impl Subscription {
    /// 取消订阅
    ///
    /// 返回后不会再有回调;正在处理的帧不会被中断。
    /// 阻塞等待帧的检测器被取消信号唤醒后立即释放,
    /// 不支持取消信号的检测器在下一帧到达时释放。
    pub fn cancel(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.cancel_tx.take();
        let mut guard = self
            .callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }

    pub fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
            && self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// 等待工作线程结束 (视频源结束、故障或已取消)
    pub fn join(mut self) -> Result<StreamStats> {
        let Some(handle) = self.handle.take() else {
            return Ok(StreamStats::default());
        };
        match handle.join() {
            Ok(result) => result.map_err(TrackError::from),
            Err(_) => Err(TrackError::WorkerPanicked),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}
