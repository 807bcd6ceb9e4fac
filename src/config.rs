//! 追踪器配置 - 通过JSON文件调整参数

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::color::{Color, ColorRegistry, DEFAULT_DELTA_MAX};
use crate::detection::{CornerLabeling, FrameInterpreter, Mode};
use crate::error::ConfigError;

/// 颜色配置项 (名称 + 6位十六进制)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub name: String,
    pub hex: String,
}

impl ColorSpec {
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }

    pub fn parse(&self) -> Result<Color, ConfigError> {
        Color::from_hex(self.name.clone(), &self.hex)
    }
}

/// 追踪器参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    // === 模式 ===
    pub calibration_mode: bool, // 标定直通模式
    pub corner_labeling: CornerLabeling,

    // === 颜色匹配 ===
    pub delta_max: u32, // RGB距离平方阈值
    pub colors: Vec<ColorSpec>,

    // === 检测器参数 ===
    pub min_dimension: u32,  // 最小色块边长(像素)
    pub min_group_size: u32, // 最小像素簇大小
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            calibration_mode: true,
            corner_labeling: CornerLabeling::Legacy,

            delta_max: DEFAULT_DELTA_MAX,
            colors: vec![ColorSpec::new("refColor", "C90000")],

            min_dimension: 17,
            min_group_size: 100,
        }
    }
}

impl TrackerConfig {
    /// 从JSON文件加载配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(format!("{}: {}", path.display(), e)))?;
        let config: Self =
            serde_json::from_str(&json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        info!("✅ 配置已从 {} 加载", path.display());
        Ok(config)
    }

    /// 加载配置;文件不存在时写入默认配置
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        info!("📝 配置文件不存在,创建默认配置...");
        let config = Self::default();
        if let Err(e) = config.save(path) {
            warn!("⚠️  默认配置写入失败: {}", e);
        }
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| ConfigError::WriteFile(format!("{}: {}", path.display(), e)))?;
        info!("💾 配置已保存到 {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.colors.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "colors".to_string(),
                message: "at least one reference color is required".to_string(),
            });
        }
        for spec in &self.colors {
            spec.parse()?;
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        if self.calibration_mode {
            Mode::Calibration
        } else {
            Mode::Tracking
        }
    }

    pub fn interpreter(&self) -> FrameInterpreter {
        FrameInterpreter::new(self.mode(), self.corner_labeling)
    }

    pub fn parse_colors(&self) -> Result<Vec<Color>, ConfigError> {
        self.colors.iter().map(ColorSpec::parse).collect()
    }

    /// 构建只读颜色注册表
    pub fn build_registry(&self) -> Result<ColorRegistry, ConfigError> {
        Ok(ColorRegistry::from_colors(
            &self.parse_colors()?,
            self.delta_max,
        ))
    }

    pub fn color_names(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.name.clone()).collect()
    }

    /// 打印当前配置
    pub fn print_summary(&self) {
        info!("🎛️  当前追踪器配置:");
        info!(
            "  模式: {}",
            if self.calibration_mode {
                "标定直通"
            } else {
                "追踪"
            }
        );
        info!("  角点标注: {:?}", self.corner_labeling);
        info!("  颜色距离阈值: {}", self.delta_max);
        for spec in &self.colors {
            info!("  颜色: {} = #{}", spec.name, spec.hex.trim_start_matches('#'));
        }
        info!("  最小尺寸: {}px", self.min_dimension);
        info!("  最小像素簇: {}px", self.min_group_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = TrackerConfig::default();
        assert!(config.calibration_mode);
        assert_eq!(config.delta_max, 3500);
        assert_eq!(config.min_dimension, 17);
        assert_eq!(config.min_group_size, 100);
        assert_eq!(config.mode(), Mode::Calibration);

        let colors = config.parse_colors().unwrap();
        assert_eq!(colors, vec![Color::new("refColor", 0xC9, 0, 0)]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.json");

        let config = TrackerConfig {
            calibration_mode: false,
            corner_labeling: CornerLabeling::Geometric,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = TrackerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.mode(), Mode::Tracking);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.json");
        fs::write(&path, r#"{ "calibration_mode": false, "corner_labeling": "geometric" }"#)
            .unwrap();

        let loaded = TrackerConfig::load(&path).unwrap();
        assert!(!loaded.calibration_mode);
        assert_eq!(loaded.corner_labeling, CornerLabeling::Geometric);
        assert_eq!(loaded.delta_max, 3500);
    }

    #[test]
    fn test_load_or_default_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let config = TrackerConfig::load_or_default(&path).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_color_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "colors": [{ "name": "x", "hex": "C9" }] }"#).unwrap();

        assert!(matches!(
            TrackerConfig::load(&path),
            Err(ConfigError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_empty_colors_rejected() {
        let config = TrackerConfig {
            colors: vec![],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_build_registry() {
        let registry = TrackerConfig::default().build_registry().unwrap();
        assert!(registry.contains("refColor"));
        assert_eq!(registry.matches("refColor", 0xC9, 0, 0), Some(true));
    }
}
