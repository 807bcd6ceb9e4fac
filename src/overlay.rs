//! 标定叠加图
//!
//! 把追踪事件画到图像上,用于标定模式下肉眼核对原始检测结果:
//! 可追踪点画空心圆,角点画实心圆,四边形用线段连接。

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use crate::detection::{CornerLabeling, Point, TrackingEvent};
use crate::error::Result;

const TRACKABLE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CORNER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const FRAME_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const BACKGROUND: Rgb<u8> = Rgb([24, 24, 24]);

const TRACKABLE_RADIUS: i32 = 8;
const CORNER_RADIUS: i32 = 5;

fn to_i32(p: &Point) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// 在已有图像上叠加事件
///
/// `labeling` 须与产生事件的解释器一致,否则四边形会连成交叉的线。
pub fn draw_event(canvas: &mut RgbImage, event: &TrackingEvent, labeling: CornerLabeling) {
    for p in &event.trackables {
        draw_hollow_circle_mut(canvas, to_i32(p), TRACKABLE_RADIUS, TRACKABLE_COLOR);
    }

    // 标定模式下角点全在原点,不画标定框
    if event.frame.is_degenerate() {
        return;
    }

    let corners = event.frame.outline(labeling);
    for (i, a) in corners.iter().enumerate() {
        let b = &corners[(i + 1) % corners.len()];
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            FRAME_COLOR,
        );
    }
    for c in &corners {
        draw_filled_circle_mut(canvas, to_i32(c), CORNER_RADIUS, CORNER_COLOR);
    }
}

/// 在纯色背景上渲染事件
pub fn render_event(
    event: &TrackingEvent,
    labeling: CornerLabeling,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    draw_event(&mut canvas, event, labeling);
    canvas
}

/// 渲染并保存为 PNG,文件名带时间戳与事件序号
///
/// 追踪模式下点数不足的帧不产生事件,事件序号不等于帧号。
pub fn save_event(
    event: &TrackingEvent,
    labeling: CornerLabeling,
    dir: impl AsRef<Path>,
    event_id: u64,
    size: (u32, u32),
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "overlay_{}_event{:06}.png",
        crate::gen_time_string("-"),
        event_id
    ));
    render_event(event, labeling, size.0, size.1).save(&path)?;
    Ok(path)
}
