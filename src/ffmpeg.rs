use crate::error::{ComposeError, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// 用 ffprobe 测量媒体文件的时长（秒）
///
/// 这是成片长度的唯一依据，脚本阶段的建议时长不作数
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
        .arg(path)
        .output()
        .await
        .map_err(|e| ComposeError::Encoding(format!("无法运行 ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ComposeError::Encoding(format!(
            "ffprobe 执行失败: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration: f64 = stdout.trim().parse().map_err(|_| {
        ComposeError::InvalidInput(format!("无法解析媒体时长: {:?}", stdout.trim()))
    })?;

    if duration <= 0.0 {
        return Err(ComposeError::InvalidInput(format!(
            "媒体时长异常: {}",
            duration
        )));
    }

    Ok(duration)
}

/// 运行一次 ffmpeg，非零退出码视为编码失败，stderr 带回错误信息
pub async fn run_ffmpeg(args: &[String]) -> Result<()> {
    debug!("ffmpeg {}", args.join(" "));

    let output = Command::new("ffmpeg")
        .args(args)
        .output()
        .await
        .map_err(|e| ComposeError::Encoding(format!("无法运行 ffmpeg: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ComposeError::Encoding(format!(
            "ffmpeg 执行失败: {}",
            stderr.trim()
        )));
    }

    Ok(())
}

/// 从成片 1 秒处抽取一帧存为封面图
pub async fn extract_thumbnail(video: &Path, dest: &Path) -> Result<()> {
    let args = vec![
        "-y".to_string(),
        "-ss".to_string(),
        "1".to_string(),
        "-i".to_string(),
        video.display().to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        dest.display().to_string(),
    ];
    run_ffmpeg(&args).await?;

    if !dest.is_file() {
        return Err(ComposeError::Encoding(format!(
            "封面未生成: {}",
            dest.display()
        )));
    }

    Ok(())
}
