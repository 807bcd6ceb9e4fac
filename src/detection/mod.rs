/// 帧解释系统 (Frame Interpretation)
///
/// 每帧独立处理,无跨帧状态
/// - Types:       数据结构 (Point, Bbox, TrackingEvent)
/// - Corners:     标定角点提取
/// - Interpreter: 中心点转换 + 模式切换 + 可追踪点划分
pub mod corners;
pub mod interpreter;
pub mod types;

pub use corners::{calculate_corners, CornerLabeling, Corners};
pub use interpreter::{calculate_trackables, centroids, FrameInterpreter, Mode};
pub use types::{Bbox, CalibrationFrame, Point, TrackingEvent};
