//! 帧解释器 (Frame Interpreter)
//! 职责: 检测框 → 中心点 → (角点提取 → 可追踪点划分) → TrackingEvent
//!
//! 每帧独立处理,不保留跨帧状态。

use tracing::debug;

use super::corners::{calculate_corners, CornerLabeling, Corners, MIN_POINTS};
use super::types::{Bbox, CalibrationFrame, Point, TrackingEvent};

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 标定直通: 不计算角点,原样输出全部中心点
    Calibration,
    /// 追踪: 角点提取 + 可追踪点划分
    Tracking,
}

/// 检测框 → 中心点
pub fn centroids(detections: &[Bbox]) -> Vec<Point> {
    detections.iter().map(Bbox::centroid).collect()
}

/// 可追踪点: 坐标不等于任何角点的中心点
///
/// 与角点坐标重合的点全部移除,包括重复的检测。
pub fn calculate_trackables(points: &[Point], corners: &Corners) -> Vec<Point> {
    points
        .iter()
        .filter(|p| !corners.contains(p))
        .copied()
        .collect()
}

#[derive(Debug, Clone)]
pub struct FrameInterpreter {
    mode: Mode,
    labeling: CornerLabeling,
}

impl FrameInterpreter {
    pub fn new(mode: Mode, labeling: CornerLabeling) -> Self {
        Self { mode, labeling }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn labeling(&self) -> CornerLabeling {
        self.labeling
    }

    /// 处理单帧检测结果;追踪模式下点数不足时返回 `None`
    pub fn interpret(&self, detections: &[Bbox]) -> Option<TrackingEvent> {
        let points = centroids(detections);

        match self.mode {
            Mode::Calibration => Some(TrackingEvent::new(
                CalibrationFrame::degenerate(),
                points,
            )),
            Mode::Tracking => {
                let Some(corners) = calculate_corners(&points) else {
                    debug!(
                        "⏭️ 跳过帧: 仅{}个检测点 (需要至少{}个)",
                        points.len(),
                        MIN_POINTS
                    );
                    return None;
                };
                let trackables = calculate_trackables(&points, &corners);
                Some(TrackingEvent::new(
                    corners.to_frame(self.labeling),
                    trackables,
                ))
            }
        }
    }
}

impl Default for FrameInterpreter {
    fn default() -> Self {
        Self::new(Mode::Calibration, CornerLabeling::default())
    }
}
