//! 标定角点提取
//! Corner extraction by axis extremes
//!
//! 不是凸包: 每个角点独立地从 x 方向两个极值点中按 y 取极值。
//! 排序使用三路比较 (`f64::total_cmp`) + 稳定排序,相等时先出现者优先。

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::types::{CalibrationFrame, Point};

/// 至少需要的点数
pub const MIN_POINTS: usize = 4;

/// 计算得到的角点,顺序: 左上, 右上, 右下, 左下
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners(pub [Point; 4]);

/// 角点输出标注方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerLabeling {
    /// 兼容旧输出: 下标 0,1,3,2 → 左上,右上,左下,右下
    /// (输出的 bottom_left 实际是几何右下角,反之亦然)
    #[default]
    Legacy,
    /// 几何标注: 左上,右上,右下,左下 对应各自字段
    Geometric,
}

impl Corners {
    pub fn top_left(&self) -> Point {
        self.0[0]
    }

    pub fn top_right(&self) -> Point {
        self.0[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.0[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.0[3]
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.0
    }

    /// 是否与任一角点坐标完全相等
    pub fn contains(&self, point: &Point) -> bool {
        self.0.iter().any(|c| c.same_position(point))
    }

    pub fn to_frame(&self, labeling: CornerLabeling) -> CalibrationFrame {
        let [p0, p1, p2, p3] = self.0;
        match labeling {
            CornerLabeling::Legacy => CalibrationFrame {
                top_left: p0,
                top_right: p1,
                bottom_left: p2,
                bottom_right: p3,
            },
            CornerLabeling::Geometric => CalibrationFrame {
                top_left: p0,
                top_right: p1,
                bottom_right: p2,
                bottom_left: p3,
            },
        }
    }
}

fn by_x_asc(a: &Point, b: &Point) -> Ordering {
    a.x.total_cmp(&b.x)
}

fn by_x_desc(a: &Point, b: &Point) -> Ordering {
    b.x.total_cmp(&a.x)
}

fn by_y_asc(a: &Point, b: &Point) -> Ordering {
    a.y.total_cmp(&b.y)
}

fn by_y_desc(a: &Point, b: &Point) -> Ordering {
    b.y.total_cmp(&a.y)
}

/// 按 `x_order` 取前两个,再按 `y_order` 取第一个
fn pick_extreme<F, G>(points: &[Point], x_order: F, y_order: G) -> Point
where
    F: Fn(&Point, &Point) -> Ordering,
    G: Fn(&Point, &Point) -> Ordering,
{
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| x_order(a, b)); // 稳定排序
    sorted.truncate(2);
    sorted.sort_by(|a, b| y_order(a, b));
    sorted[0]
}

/// 计算四个标定角点;少于4个点返回 `None`
pub fn calculate_corners(points: &[Point]) -> Option<Corners> {
    if points.len() < MIN_POINTS {
        return None;
    }

    let top_left = pick_extreme(points, by_x_asc, by_y_asc);
    let top_right = pick_extreme(points, by_x_desc, by_y_asc);
    let bottom_left = pick_extreme(points, by_x_asc, by_y_desc);
    let bottom_right = pick_extreme(points, by_x_desc, by_y_desc);

    Some(Corners([top_left, top_right, bottom_right, bottom_left]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&p| Point::from(p)).collect()
    }

    #[test]
    fn test_too_few_points() {
        assert!(calculate_corners(&[]).is_none());
        assert!(calculate_corners(&pts(&[(0., 0.), (1., 1.), (2., 2.)])).is_none());
    }

    #[test]
    fn test_square_with_center() {
        let points = pts(&[(0., 0.), (10., 0.), (0., 10.), (10., 10.), (5., 5.)]);
        let corners = calculate_corners(&points).unwrap();
        assert_eq!(
            corners.0,
            [
                Point::new(0., 0.),
                Point::new(10., 0.),
                Point::new(10., 10.),
                Point::new(0., 10.),
            ]
        );
    }

    #[test]
    fn test_input_order_does_not_matter_for_distinct_extremes() {
        let a = pts(&[(5., 5.), (10., 10.), (0., 10.), (10., 0.), (0., 0.)]);
        let b = pts(&[(0., 0.), (10., 0.), (0., 10.), (10., 10.), (5., 5.)]);
        assert_eq!(calculate_corners(&a), calculate_corners(&b));
    }

    #[test]
    fn test_skewed_quad() {
        let points = pts(&[(1., 2.), (98., 5.), (3., 97.), (101., 99.), (50., 40.), (60., 70.)]);
        let corners = calculate_corners(&points).unwrap();
        assert_eq!(corners.top_left(), Point::new(1., 2.));
        assert_eq!(corners.top_right(), Point::new(98., 5.));
        assert_eq!(corners.bottom_right(), Point::new(101., 99.));
        assert_eq!(corners.bottom_left(), Point::new(3., 97.));
    }

    #[test]
    fn test_idempotent() {
        let points = pts(&[(3., 1.), (3., 1.), (7., 2.), (0., 9.), (8., 8.), (4., 4.)]);
        let first = calculate_corners(&points);
        let second = calculate_corners(&points);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_first_occurrence_wins() {
        // 三个点 x 相同: 前两个出现的 (0,5) 和 (0,1) 参与选择, (0,0) 被排除
        let points = pts(&[(0., 5.), (0., 1.), (0., 0.), (9., 0.), (9., 9.)]);
        let corners = calculate_corners(&points).unwrap();
        assert_eq!(corners.top_left(), Point::new(0., 1.));
        assert_eq!(corners.bottom_left(), Point::new(0., 5.));
    }

    #[test]
    fn test_duplicates_may_repeat_corners() {
        let points = pts(&[(1., 1.), (1., 1.), (1., 1.), (1., 1.)]);
        let corners = calculate_corners(&points).unwrap();
        assert!(corners.0.iter().all(|p| *p == Point::new(1., 1.)));
    }

    #[test]
    fn test_labeling() {
        let corners = Corners([
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(10., 10.),
            Point::new(0., 10.),
        ]);

        let legacy = corners.to_frame(CornerLabeling::Legacy);
        assert_eq!(legacy.bottom_left, Point::new(10., 10.));
        assert_eq!(legacy.bottom_right, Point::new(0., 10.));

        let geometric = corners.to_frame(CornerLabeling::Geometric);
        assert_eq!(geometric.bottom_left, Point::new(0., 10.));
        assert_eq!(geometric.bottom_right, Point::new(10., 10.));
        assert_eq!(geometric.corners(), corners.0);
    }
}
