//! 录制回放检测器
//!
//! 回放色块检测器的录制输出。文件为 JSON Lines,每行一帧:
//! ```text
//! [{"x":10,"y":12,"width":20,"height":20,"color":"refColor","pixels":240}, ...]
//! ```
//! `color` / `sample` / `pixels` 均可省略。

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{BlobDetector, BlobFilter};
use crate::color::ColorRegistry;
use crate::detection::Bbox;
use crate::error::DetectorError;

/// 录制的单个色块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedBlob {
    #[serde(flatten)]
    pub bbox: Bbox,
    /// 检测器标注的颜色名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// 色块内采样的 RGB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<[u8; 3]>,
    /// 像素簇大小
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels: Option<u32>,
}

impl RecordedBlob {
    pub fn new(bbox: Bbox) -> Self {
        Self {
            bbox,
            color: None,
            sample: None,
            pixels: None,
        }
    }
}

pub struct ReplayDetector<R: BufRead + Send = BufReader<File>> {
    name: String,
    lines: Lines<R>,
    filter: BlobFilter,
    interval: Option<Duration>,
    cancel: Receiver<()>,
    frame: u64,
}

impl ReplayDetector {
    /// 打开录制文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DetectorError::Unavailable(format!("{}: {}", path.display(), e))
        })?;
        info!("📼 回放源: {}", path.display());
        Ok(Self::from_reader(
            path.display().to_string(),
            BufReader::new(file),
        ))
    }
}

impl<R: BufRead + Send> ReplayDetector<R> {
    pub fn from_reader(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            lines: reader.lines(),
            filter: BlobFilter::default(),
            interval: None,
            cancel: crossbeam_channel::never(),
            frame: 0,
        }
    }

    /// 按固定帧间隔回放 (模拟摄像头帧率)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    fn accepts(&self, blob: &RecordedBlob) -> bool {
        self.filter.accepts_size(&blob.bbox)
            && self.filter.accepts_group(blob.pixels)
            && self.filter.accepts_tag(blob.color.as_deref())
            && self.filter.accepts_sample(blob.sample)
    }
}

impl<R: BufRead + Send> BlobDetector for ReplayDetector<R> {
    fn set_colors(&mut self, registry: Arc<ColorRegistry>, names: &[String]) {
        self.filter.registry = registry;
        self.filter.colors = names.to_vec();
    }

    fn set_min_dimension(&mut self, px: u32) {
        self.filter.min_dimension = px;
    }

    fn set_min_group_size(&mut self, px: u32) {
        self.filter.min_group_size = px;
    }

    fn set_cancel(&mut self, cancel: Receiver<()>) {
        self.cancel = cancel;
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Bbox>>, DetectorError> {
        loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            self.frame += 1;
            let blobs: Vec<RecordedBlob> =
                serde_json::from_str(&line).map_err(|e| DetectorError::MalformedFrame {
                    frame: self.frame,
                    message: e.to_string(),
                })?;

            let total = blobs.len();
            let boxes: Vec<Bbox> = blobs
                .into_iter()
                .filter(|blob| self.accepts(blob))
                .map(|blob| blob.bbox)
                .collect();
            if boxes.len() < total {
                debug!(
                    "🔍 帧#{}: 过滤 {}/{} 个色块",
                    self.frame,
                    total - boxes.len(),
                    total
                );
            }

            // 帧间隔内可被取消打断
            if let Some(interval) = self.interval {
                match self.cancel.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return Ok(None),
                }
            }
            return Ok(Some(boxes));
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<R: BufRead + Send> Drop for ReplayDetector<R> {
    fn drop(&mut self) {
        info!("📼 回放源已释放: {} ({}帧)", self.name, self.frame);
    }
}
