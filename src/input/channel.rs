//! 通道检测器
//!
//! 外部采集线程通过 `Sender<Vec<Bbox>>` 推送每帧检测结果。
//! 发送端全部断开即视为视频源结束;检测器被释放后发送端会收到断开错误。
//! 等待帧时同时监听取消信号,取消后不必等下一帧即可释放。

use std::sync::Arc;

use crossbeam_channel::{select, Receiver, Sender};
use tracing::info;

use super::{BlobDetector, BlobFilter};
use crate::color::ColorRegistry;
use crate::detection::Bbox;
use crate::error::DetectorError;

pub struct ChannelDetector {
    rx: Receiver<Vec<Bbox>>,
    cancel: Receiver<()>,
    filter: BlobFilter,
    frames: u64,
}

impl ChannelDetector {
    /// 创建有界通道 (满时发送端阻塞,保证帧不重叠)
    pub fn bounded(cap: usize) -> (Self, Sender<Vec<Bbox>>) {
        let (tx, rx) = crossbeam_channel::bounded(cap);
        (Self::from_receiver(rx), tx)
    }

    pub fn from_receiver(rx: Receiver<Vec<Bbox>>) -> Self {
        Self {
            rx,
            cancel: crossbeam_channel::never(),
            filter: BlobFilter::default(),
            frames: 0,
        }
    }
}

impl BlobDetector for ChannelDetector {
    fn set_colors(&mut self, registry: Arc<ColorRegistry>, names: &[String]) {
        self.filter.registry = registry;
        self.filter.colors = names.to_vec();
    }

    fn set_min_dimension(&mut self, px: u32) {
        self.filter.min_dimension = px;
    }

    fn set_min_group_size(&mut self, px: u32) {
        // 推送的检测框不带像素簇信息
        self.filter.min_group_size = px;
    }

    fn set_cancel(&mut self, cancel: Receiver<()>) {
        self.cancel = cancel;
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Bbox>>, DetectorError> {
        let frame = select! {
            recv(self.cancel) -> _ => None,
            recv(self.rx) -> frame => frame.ok(),
        };
        let Some(mut boxes) = frame else {
            return Ok(None);
        };
        self.frames += 1;
        boxes.retain(|b| self.filter.accepts_size(b));
        Ok(Some(boxes))
    }

    fn name(&self) -> &str {
        "channel"
    }
}

impl Drop for ChannelDetector {
    fn drop(&mut self) {
        info!("📷 通道检测器已释放 ({}帧)", self.frames);
    }
}
