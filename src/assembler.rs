use crate::error::{ComposeError, Result};
use crate::fetch::fetch_to_file;
use crate::ffmpeg;
use crate::normalize::normalize_image;
use crate::scene::{Scene, TimedScene};
use crate::subtitle::{render_subtitles, resolve_style};
use crate::timing::estimate_timing;
use chrono::Utc;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 成片固定帧率
pub const FPS: u32 = 30;

/// 合成配置
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// 画幅宽度
    pub width: u32,
    /// 画幅高度
    pub height: u32,
    /// 是否烧录字幕
    pub captions: bool,
    /// 字幕样式 id，未知 id 回退到默认样式
    pub caption_style: String,
    /// 背景音乐引用（None 表示纯旁白）
    pub music_url: Option<String>,
    /// 背景音乐音量（0.0-1.0），旁白恒为全量
    pub music_volume: f64,
    /// 是否抽取封面
    pub thumbnail: bool,
    /// 成片输出目录
    pub output_dir: PathBuf,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            captions: true,
            caption_style: "classic".to_string(),
            music_url: None,
            music_volume: 0.15,
            thumbnail: true,
            output_dir: PathBuf::from("./videos"),
        }
    }
}

/// 一次合成的输入分镜：画面引用 + 旁白 + 建议时长
#[derive(Debug, Clone)]
pub struct AssemblyScene {
    /// 画面引用（URL 或本地路径）
    pub image_ref: String,
    /// 旁白文案
    pub text: String,
    /// 脚本阶段的建议时长（秒）
    pub duration: f64,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    /// 成片路径
    pub video_path: PathBuf,
    /// 成片时长（秒），等于实测旁白时长
    pub duration: f64,
    /// 封面路径（抽取失败或未开启时为 None）
    pub thumbnail_path: Option<PathBuf>,
}

/// 把分镜图片、旁白音频、字幕与可选背景音乐合成为一个 MP4
///
/// 各步骤严格顺序执行，任何一步失败（封面除外）都会中止本次合成；
/// 工作目录在函数退出时连同内容一起清理，无论成功失败
pub async fn assemble_video(
    scenes: &[AssemblyScene],
    audio: &[u8],
    config: &AssembleConfig,
) -> Result<AssemblyResult> {
    if scenes.is_empty() {
        return Err(ComposeError::InvalidInput("分镜列表为空".to_string()));
    }
    if !(0.0..=1.0).contains(&config.music_volume) {
        return Err(ComposeError::InvalidInput(format!(
            "背景音乐音量必须在 0.0-1.0 之间: {}",
            config.music_volume
        )));
    }

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let stamp = Utc::now().timestamp_millis();
    let output_path = config.output_dir.join(format!("video-{}.mp4", stamp));

    // 临时工作目录，drop 时自动清理
    let temp_dir = tempfile::tempdir()?;
    let work = temp_dir.path();
    let client = Client::new();

    // 1. 落盘旁白音频并测量实际时长，作为成片长度的唯一依据
    let audio_path = work.join("audio.mp3");
    tokio::fs::write(&audio_path, audio).await?;
    let audio_duration = ffmpeg::probe_duration(&audio_path).await?;
    info!("旁白实测时长: {:.2} 秒", audio_duration);

    // 2. 按实测时长推算分镜时间轴
    let plain: Vec<Scene> = scenes
        .iter()
        .map(|s| Scene {
            text: s.text.clone(),
            image_prompt: String::new(),
            duration: s.duration,
        })
        .collect();
    let mut timed = estimate_timing(&plain, audio_duration)?;

    // 3. 逐个抓取分镜图片并规整到目标画幅
    let mut image_files = Vec::with_capacity(scenes.len());
    for (i, scene) in scenes.iter().enumerate() {
        let raw_path = work.join(format!("image-{:03}.raw", i));
        fetch_to_file(&client, &scene.image_ref, &raw_path).await?;

        let png_path = work.join(format!("image-{:03}.png", i));
        normalize_image(&raw_path, &png_path, config.width, config.height)?;
        timed[i].image_path = Some(png_path.clone());
        image_files.push(png_path);
    }
    info!("已规整 {} 张分镜图片", image_files.len());

    // 4. 生成并落盘字幕文档
    let subtitle_path = if config.captions {
        let style = resolve_style(&config.caption_style);
        let doc = render_subtitles(&timed, style, config.width, config.height);
        let path = work.join("captions.ass");
        tokio::fs::write(&path, doc).await?;
        Some(path)
    } else {
        None
    };

    // 5. 写 concat 描述文件
    let concat_path = work.join("concat.txt");
    tokio::fs::write(&concat_path, build_concat_list(&timed, &image_files)).await?;

    // 6. 抓取背景音乐
    let music_path = match config.music_url.as_deref() {
        Some(url) if !url.is_empty() => {
            let path = work.join("music.mp3");
            fetch_to_file(&client, url, &path).await?;
            Some(path)
        }
        _ => None,
    };

    // 7. 一次 ffmpeg 调用完成编码，按旁白时长截断
    let filter = build_filter_graph(
        subtitle_path.as_deref(),
        music_path.is_some(),
        config.music_volume,
    );

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        concat_path.display().to_string(),
        "-i".into(),
        audio_path.display().to_string(),
    ];
    if let Some(music) = &music_path {
        args.push("-i".into());
        args.push(music.display().to_string());
    }
    args.push("-filter_complex".into());
    args.push(filter);
    args.push("-map".into());
    args.push("[v]".into());
    args.push("-map".into());
    args.push(if music_path.is_some() {
        "[a]".into()
    } else {
        "1:a".into()
    });
    for arg in [
        "-c:v",
        "libx264",
        "-preset",
        "fast",
        "-crf",
        "23",
        "-c:a",
        "aac",
        "-b:a",
        "192k",
        "-movflags",
        "+faststart",
        "-t",
    ] {
        args.push(arg.into());
    }
    args.push(audio_duration.to_string());
    args.push(output_path.display().to_string());

    if let Err(e) = ffmpeg::run_ffmpeg(&args).await {
        // 半成品不对外暴露
        let _ = tokio::fs::remove_file(&output_path).await;
        return Err(e);
    }
    info!("成片已生成: {}", output_path.display());

    // 8. 抽取封面，失败不影响成片
    let thumbnail_path = if config.thumbnail {
        let path = config.output_dir.join(format!("thumb-{}.jpg", stamp));
        match ffmpeg::extract_thumbnail(&output_path, &path).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("封面抽取失败，忽略: {}", e);
                None
            }
        }
    } else {
        None
    };

    // 9. temp_dir 在此离开作用域，工作目录随之清理
    Ok(AssemblyResult {
        video_path: output_path,
        duration: audio_duration,
        thumbnail_path,
    })
}

/// 生成 concat demuxer 的描述内容
///
/// 末尾把最后一张图再列一次：concat demuxer 要求收尾条目，并非画面重复
fn build_concat_list(timed_scenes: &[TimedScene], image_files: &[PathBuf]) -> String {
    let mut content = String::new();
    for (scene, file) in timed_scenes.iter().zip(image_files) {
        content.push_str(&format!(
            "file '{}'\nduration {}\n",
            file.display(),
            scene.duration
        ));
    }
    if let Some(last) = image_files.last() {
        content.push_str(&format!("file '{}'\n", last.display()));
    }
    content
}

/// 构造 filter_complex 表达式
///
/// 画面链：concat 输入定帧率，可选叠加字幕烧录；
/// 音频链：旁白全量、音乐按配置衰减，amix 以旁白长度为准（duration=first）
fn build_filter_graph(subtitle_path: Option<&Path>, with_music: bool, music_volume: f64) -> String {
    let mut filter = format!("[0:v]fps={}", FPS);
    if let Some(path) = subtitle_path {
        filter.push_str(&format!(",ass='{}'", path.display()));
    }
    filter.push_str("[v]");

    if with_music {
        filter.push_str(&format!(
            ";[1:a]volume=1.0[voice];[2:a]volume={}[bgm];[voice][bgm]amix=inputs=2:duration=first:normalize=0[a]",
            music_volume
        ));
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(duration: f64) -> TimedScene {
        TimedScene {
            text: String::new(),
            start_time: 0.0,
            duration,
            image_path: None,
        }
    }

    #[test]
    fn test_concat_list_repeats_last_entry() {
        let scenes = vec![timed(4.0), timed(6.5)];
        let files = vec![PathBuf::from("/tmp/a.png"), PathBuf::from("/tmp/b.png")];
        let content = build_concat_list(&scenes, &files);

        assert_eq!(
            content,
            "file '/tmp/a.png'\nduration 4\nfile '/tmp/b.png'\nduration 6.5\nfile '/tmp/b.png'\n"
        );
    }

    #[test]
    fn test_filter_graph_video_only() {
        let filter = build_filter_graph(None, false, 0.15);
        assert_eq!(filter, "[0:v]fps=30[v]");
    }

    #[test]
    fn test_filter_graph_with_captions_and_music() {
        let filter = build_filter_graph(Some(Path::new("/tmp/captions.ass")), true, 0.15);
        assert_eq!(
            filter,
            "[0:v]fps=30,ass='/tmp/captions.ass'[v];[1:a]volume=1.0[voice];[2:a]volume=0.15[bgm];[voice][bgm]amix=inputs=2:duration=first:normalize=0[a]"
        );
    }

    #[tokio::test]
    async fn test_empty_scenes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = AssembleConfig {
            output_dir: dir.path().to_path_buf(),
            ..AssembleConfig::default()
        };
        let err = assemble_video(&[], b"audio", &config).await.unwrap_err();
        assert!(matches!(err, ComposeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_music_volume_out_of_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = AssembleConfig {
            music_volume: 1.5,
            output_dir: dir.path().to_path_buf(),
            ..AssembleConfig::default()
        };
        let scenes = vec![AssemblyScene {
            image_ref: "x".to_string(),
            text: "hello".to_string(),
            duration: 5.0,
        }];
        let err = assemble_video(&scenes, b"audio", &config).await.unwrap_err();
        assert!(matches!(err, ComposeError::InvalidInput(_)));
    }
}
