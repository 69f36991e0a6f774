use crate::assembler::AssembleConfig;
use std::env;
use std::path::PathBuf;

/// 命令行层面的合成配置覆盖项，None 表示未指定
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub captions: Option<bool>,
    pub caption_style: Option<String>,
    pub music_volume: Option<f64>,
    pub thumbnail: Option<bool>,
    pub output_dir: Option<PathBuf>,
}

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 合并配置，优先级：命令行 > 环境变量 > 默认值
    pub fn load_assemble_config(overrides: ConfigOverrides) -> AssembleConfig {
        let defaults = AssembleConfig::default();
        let (env_width, env_height, env_caption_style, env_music_volume, env_output_dir) =
            Self::load_from_env();

        AssembleConfig {
            width: overrides.width.or(env_width).unwrap_or(defaults.width),
            height: overrides.height.or(env_height).unwrap_or(defaults.height),
            captions: overrides.captions.unwrap_or(defaults.captions),
            caption_style: overrides
                .caption_style
                .or(env_caption_style)
                .unwrap_or(defaults.caption_style),
            music_url: None,
            music_volume: overrides
                .music_volume
                .or(env_music_volume)
                .unwrap_or(defaults.music_volume),
            thumbnail: overrides.thumbnail.unwrap_or(defaults.thumbnail),
            output_dir: overrides
                .output_dir
                .or(env_output_dir)
                .unwrap_or(defaults.output_dir),
        }
    }

    /// 从环境变量读取覆盖项（返回 Option 表示是否设置）
    fn load_from_env() -> (
        Option<u32>,
        Option<u32>,
        Option<String>,
        Option<f64>,
        Option<PathBuf>,
    ) {
        (
            env::var("VIDEO_COMPOSE_WIDTH").ok().and_then(|v| v.parse().ok()),
            env::var("VIDEO_COMPOSE_HEIGHT").ok().and_then(|v| v.parse().ok()),
            env::var("VIDEO_COMPOSE_CAPTION_STYLE").ok(),
            env::var("VIDEO_COMPOSE_MUSIC_VOLUME")
                .ok()
                .and_then(|v| v.parse().ok()),
            env::var("VIDEO_COMPOSE_OUTPUT_DIR").ok().map(PathBuf::from),
        )
    }
}
