/// 标记追踪数据结构定义
/// Data structures for marker tracking
use serde::{Deserialize, Serialize};

use super::corners::CornerLabeling;

/// 图像坐标点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 坐标完全相等 (不做容差比较)
    pub fn same_position(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// 检测框 (检测器在单帧中报告的一个色块)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bbox {
    #[serde(rename = "x")]
    xmin: f64,
    #[serde(rename = "y")]
    ymin: f64,
    width: f64,
    height: f64,
}

impl Bbox {
    pub fn new_from_xywh(xmin: f64, ymin: f64, width: f64, height: f64) -> Self {
        Self {
            xmin,
            ymin,
            width,
            height,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmin + self.width
    }

    pub fn ymax(&self) -> f64 {
        self.ymin + self.height
    }

    /// 中心点
    pub fn centroid(&self) -> Point {
        Point::new(self.xmin + self.width / 2., self.ymin + self.height / 2.)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// 标定框: 当前帧的四个角点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationFrame {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl CalibrationFrame {
    /// 标定模式下的退化框 (四个角点都在原点)
    pub fn degenerate() -> Self {
        Self::default()
    }

    pub fn is_degenerate(&self) -> bool {
        self.corners().iter().all(|p| p.same_position(&Point::ORIGIN))
    }

    /// 按字段 左上 → 右上 → 右下 → 左下 顺序返回
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// 按几何位置 左上 → 右上 → 右下 → 左下 返回,依次连接即为标定四边形
    ///
    /// `Legacy` 标注下 bottom_left / bottom_right 两个字段互换了几何位置。
    pub fn outline(&self, labeling: CornerLabeling) -> [Point; 4] {
        match labeling {
            CornerLabeling::Legacy => [
                self.top_left,
                self.top_right,
                self.bottom_left,
                self.bottom_right,
            ],
            CornerLabeling::Geometric => self.corners(),
        }
    }
}

/// 追踪事件 (每个输入帧最多输出一个)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    #[serde(flatten)]
    pub frame: CalibrationFrame,
    pub trackables: Vec<Point>,
}

impl TrackingEvent {
    pub fn new(frame: CalibrationFrame, trackables: Vec<Point>) -> Self {
        Self { frame, trackables }
    }

    pub fn top_left(&self) -> Point {
        self.frame.top_left
    }

    pub fn top_right(&self) -> Point {
        self.frame.top_right
    }

    pub fn bottom_left(&self) -> Point {
        self.frame.bottom_left
    }

    pub fn bottom_right(&self) -> Point {
        self.frame.bottom_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid() {
        let bbox = Bbox::new_from_xywh(10.0, 20.0, 6.0, 4.0);
        assert_eq!(bbox.centroid(), Point::new(13.0, 22.0));
        assert_eq!(bbox.xmax(), 16.0);
        assert_eq!(bbox.ymax(), 24.0);
    }

    #[test]
    fn test_bbox_deserialize() {
        let bbox: Bbox = serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(bbox, Bbox::new_from_xywh(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_event_serialize_camel_case() {
        let event = TrackingEvent::new(
            CalibrationFrame {
                top_left: Point::new(0.0, 0.0),
                top_right: Point::new(10.0, 0.0),
                bottom_left: Point::new(10.0, 10.0),
                bottom_right: Point::new(0.0, 10.0),
            },
            vec![Point::new(5.0, 5.0)],
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["topRight"]["x"], 10.0);
        assert_eq!(json["bottomLeft"]["y"], 10.0);
        assert_eq!(json["trackables"][0]["x"], 5.0);

        let back: TrackingEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_outline_follows_geometry() {
        let legacy = CalibrationFrame {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(10.0, 0.0),
            bottom_left: Point::new(10.0, 10.0),
            bottom_right: Point::new(0.0, 10.0),
        };
        let geometric = CalibrationFrame {
            bottom_left: Point::new(0.0, 10.0),
            bottom_right: Point::new(10.0, 10.0),
            ..legacy
        };
        let expected = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert_eq!(legacy.outline(CornerLabeling::Legacy), expected);
        assert_eq!(geometric.outline(CornerLabeling::Geometric), expected);
    }

    #[test]
    fn test_degenerate_frame() {
        assert!(CalibrationFrame::degenerate().is_degenerate());
        let frame = CalibrationFrame {
            top_right: Point::new(1.0, 0.0),
            ..Default::default()
        };
        assert!(!frame.is_degenerate());
    }
}
