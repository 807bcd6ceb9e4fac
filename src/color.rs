//! 颜色注册 (Color Registration)
//!
//! 为每个参考颜色构建感知匹配谓词,供上游色块检测器逐像素判定。
//! 注册表在启动阶段构建一次,之后只读。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// 默认颜色距离阈值 (RGB空间距离的平方)
pub const DEFAULT_DELTA_MAX: u32 = 3500;

/// 参考颜色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(name: impl Into<String>, r: u8, g: u8, b: u8) -> Self {
        Self {
            name: name.into(),
            r,
            g,
            b,
        }
    }

    /// 从6位十六进制解析 (`C90000` 或 `#C90000`)
    pub fn from_hex(name: impl Into<String>, hex: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidColor {
                name,
                message: format!("expected 6 hex digits, got `{}`", hex),
            });
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|e| ConfigError::InvalidColor {
                name: name.clone(),
                message: e.to_string(),
            })
        };
        let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);

        Ok(Self { name, r, g, b })
    }
}

/// 颜色匹配谓词
///
/// 满足任一条件即视为匹配:
/// - 色相顺序: `(b2-g2) >= (b1-g1)` 且 `(r2-g2) >= (r1-g1)`,对亮度变化不敏感
/// - RGB距离的平方严格小于 `delta_max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMatcher {
    r: i32,
    g: i32,
    b: i32,
    delta_max: u32,
}

impl ColorMatcher {
    pub fn new(color: &Color, delta_max: u32) -> Self {
        Self {
            r: color.r as i32,
            g: color.g as i32,
            b: color.b as i32,
            delta_max,
        }
    }

    pub fn matches(&self, r: u8, g: u8, b: u8) -> bool {
        let (r2, g2, b2) = (r as i32, g as i32, b as i32);

        if (b2 - g2) >= (self.b - self.g) && (r2 - g2) >= (self.r - self.g) {
            return true;
        }

        self.distance_sq(r, g, b) < self.delta_max
    }

    /// RGB空间欧氏距离的平方
    pub fn distance_sq(&self, r: u8, g: u8, b: u8) -> u32 {
        let dr = (r as i32 - self.r).unsigned_abs();
        let dg = (g as i32 - self.g).unsigned_abs();
        let db = (b as i32 - self.b).unsigned_abs();
        dr * dr + dg * dg + db * db
    }

    pub fn delta_max(&self) -> u32 {
        self.delta_max
    }
}

/// 颜色谓词注册表 (名称 → 谓词)
#[derive(Debug, Clone, Default)]
pub struct ColorRegistry {
    matchers: HashMap<String, ColorMatcher>,
    // 注册顺序,用于确定性的分类结果
    order: Vec<String>,
}

impl ColorRegistry {
    /// 以同一阈值注册全部参考颜色
    pub fn from_colors(colors: &[Color], delta_max: u32) -> Self {
        let mut registry = Self::default();
        for color in colors {
            registry.register(color, delta_max);
        }
        registry
    }

    fn register(&mut self, color: &Color, delta_max: u32) {
        info!(
            "🎨 注册颜色 {} ({}, {}, {}) delta_max={}",
            color.name, color.r, color.g, color.b, delta_max
        );
        if self
            .matchers
            .insert(color.name.clone(), ColorMatcher::new(color, delta_max))
            .is_none()
        {
            self.order.push(color.name.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColorMatcher> {
        self.matchers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matchers.contains_key(name)
    }

    /// 判断像素是否属于指定颜色;未注册的颜色返回 `None`
    pub fn matches(&self, name: &str, r: u8, g: u8, b: u8) -> Option<bool> {
        self.get(name).map(|m| m.matches(r, g, b))
    }

    /// 返回 `names` 中第一个匹配该像素的颜色名
    pub fn classify<'a>(&self, names: &'a [String], r: u8, g: u8, b: u8) -> Option<&'a str> {
        names
            .iter()
            .find(|name| self.matches(name, r, g, b).unwrap_or(false))
            .map(String::as_str)
    }

    /// 确认所有颜色名均已注册
    pub fn require(&self, names: &[String]) -> Result<(), ConfigError> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(name) => Err(ConfigError::UnknownColor(name.clone())),
            None => Ok(()),
        }
    }

    /// 按注册顺序列出颜色名
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::new("red", 255, 0, 0)
    }

    #[test]
    fn test_from_hex() {
        let c = Color::from_hex("refColor", "C90000").unwrap();
        assert_eq!((c.r, c.g, c.b), (0xC9, 0, 0));
        assert_eq!(c.name, "refColor");

        let c = Color::from_hex("x", "#0a0B0c").unwrap();
        assert_eq!((c.r, c.g, c.b), (10, 11, 12));
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert!(Color::from_hex("x", "C900").is_err());
        assert!(Color::from_hex("x", "C90000FF").is_err());
        assert!(Color::from_hex("x", "ZZ0000").is_err());
        assert!(Color::from_hex("x", "").is_err());
        assert!(Color::from_hex("x", "+10000").is_err());
    }

    #[test]
    fn test_reflexive() {
        for color in [red(), Color::new("g", 12, 200, 40), Color::new("k", 0, 0, 0)] {
            let m = ColorMatcher::new(&color, DEFAULT_DELTA_MAX);
            assert!(m.matches(color.r, color.g, color.b));
            assert_eq!(m.distance_sq(color.r, color.g, color.b), 0);
        }
    }

    #[test]
    fn test_distance_branch() {
        let m = ColorMatcher::new(&red(), DEFAULT_DELTA_MAX);
        // 55² + 10² = 3125 < 3500
        assert_eq!(m.distance_sq(200, 10, 0), 3125);
        assert!(m.matches(200, 10, 0));
    }

    #[test]
    fn test_distance_threshold_is_strict() {
        let color = Color::new("c", 100, 100, 100);
        // 色相条件不满足: (b2-g2)=-10 < 0
        let m = ColorMatcher::new(&color, 100);
        assert_eq!(m.distance_sq(100, 110, 100), 100);
        assert!(!m.matches(100, 110, 100));

        let m = ColorMatcher::new(&color, 101);
        assert!(m.matches(100, 110, 100));
    }

    #[test]
    fn test_hue_branch_ignores_brightness() {
        let m = ColorMatcher::new(&Color::new("ref", 0xC9, 0, 0), DEFAULT_DELTA_MAX);
        // 距离超过阈值但 "更红": r-g = 215 >= 201, b-g = 5 >= 0
        assert!(m.distance_sq(255, 40, 45) > DEFAULT_DELTA_MAX);
        assert!(m.matches(255, 40, 45));
        // 绿色不满足任一条件
        assert!(!m.matches(0, 255, 0));
        // 白色: r-g = 0 < 201, 距离很大
        assert!(!m.matches(255, 255, 255));
    }

    #[test]
    fn test_registry() {
        let registry = ColorRegistry::from_colors(
            &[red(), Color::new("green", 0, 200, 0)],
            DEFAULT_DELTA_MAX,
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), &["red".to_string(), "green".to_string()]);
        assert_eq!(registry.matches("red", 200, 10, 0), Some(true));
        assert_eq!(registry.matches("blue", 0, 0, 255), None);

        let names = vec!["green".to_string(), "red".to_string()];
        assert!(registry.require(&names).is_ok());
        assert!(matches!(
            registry.require(&["blue".to_string()]),
            Err(ConfigError::UnknownColor(name)) if name == "blue"
        ));

        assert_eq!(registry.classify(&names, 0, 190, 10), Some("green"));
        // 绿色分量过高,且与两个参考色距离都超过阈值
        assert_eq!(registry.classify(&names, 30, 255, 0), None);
    }
}
