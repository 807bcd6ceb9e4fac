// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod color; // 颜色注册与匹配谓词
pub mod config; // 追踪器配置
pub mod detection; // 帧解释系统
pub mod error;
pub mod input; // 检测输入系统
pub mod overlay; // 标定叠加图
pub mod stream; // 追踪事件流

pub use crate::color::{Color, ColorMatcher, ColorRegistry};
pub use crate::config::{ColorSpec, TrackerConfig};
pub use crate::detection::{
    Bbox, CalibrationFrame, CornerLabeling, FrameInterpreter, Mode, Point, TrackingEvent,
};
pub use crate::error::{ConfigError, DetectorError, Result, TrackError};
pub use crate::input::{BlobDetector, ChannelDetector, ReplayDetector};
pub use crate::stream::{track, StreamStats, Subscription, TrackingStream};

pub fn gen_time_string(delimiter: &str) -> String {
    let t_now = chrono::Local::now();
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}
