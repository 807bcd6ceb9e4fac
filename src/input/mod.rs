/// 检测输入系统 (Detection Input System)
///
/// 上游色块检测器的抽象,每次调用产出一帧的检测框
/// - BlobDetector:    检测器接口 (摄像头 + 色块检测为外部实现)
/// - ReplayDetector:  JSON Lines 录制回放
/// - ChannelDetector: 由 crossbeam 通道推送检测结果
pub mod channel;
pub mod replay;

pub use channel::ChannelDetector;
pub use replay::{RecordedBlob, ReplayDetector};

use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::color::ColorRegistry;
use crate::detection::Bbox;
use crate::error::DetectorError;

/// 色块检测器接口
///
/// 实现方持有摄像头等资源,在 drop 时释放。
pub trait BlobDetector: Send {
    /// 设置参与追踪的颜色 (名称须已在注册表中)
    fn set_colors(&mut self, registry: Arc<ColorRegistry>, names: &[String]);

    /// 丢弃宽或高小于该值的色块
    fn set_min_dimension(&mut self, px: u32);

    /// 像素簇小于该值不视为色块
    fn set_min_group_size(&mut self, px: u32);

    /// 设置取消信号: 发送端断开 (或收到消息) 后,阻塞中的 `next_frame` 应尽快返回 `Ok(None)`
    ///
    /// 默认忽略,此时取消要等到下一帧到达才生效。
    fn set_cancel(&mut self, _cancel: Receiver<()>) {}

    /// 阻塞等待下一帧的检测结果
    ///
    /// # 返回
    /// - `Ok(Some(boxes))`: 一帧检测结果 (可能为空)
    /// - `Ok(None)`: 视频源已结束或已取消
    /// - `Err(e)`: 视频源故障,流终止
    fn next_frame(&mut self) -> Result<Option<Vec<Bbox>>, DetectorError>;

    fn name(&self) -> &str {
        "detector"
    }
}

/// 检测器的公共过滤参数
#[derive(Debug, Clone, Default)]
pub struct BlobFilter {
    pub registry: Arc<ColorRegistry>,
    pub colors: Vec<String>,
    pub min_dimension: u32,
    pub min_group_size: u32,
}

impl BlobFilter {
    pub fn accepts_size(&self, bbox: &Bbox) -> bool {
        let min = self.min_dimension as f64;
        bbox.width() >= min && bbox.height() >= min
    }

    pub fn accepts_group(&self, pixels: Option<u32>) -> bool {
        pixels.map_or(true, |n| n >= self.min_group_size)
    }

    /// 颜色标签必须属于已设置的颜色
    pub fn accepts_tag(&self, tag: Option<&str>) -> bool {
        tag.map_or(true, |tag| self.colors.iter().any(|c| c == tag))
    }

    /// 采样像素须匹配任一已设置颜色的谓词
    pub fn accepts_sample(&self, sample: Option<[u8; 3]>) -> bool {
        sample.map_or(true, |[r, g, b]| {
            self.registry.classify(&self.colors, r, g, b).is_some()
        })
    }
}
