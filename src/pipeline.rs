use crate::assembler::{assemble_video, AssembleConfig, AssemblyScene};
use crate::error::{ComposeError, Result};
use crate::music::get_music_track;
use crate::project::{Project, ProjectStatus, ProjectStore};
use crate::provider::Collaborators;
use std::sync::Arc;
use tracing::{error, info};

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// 视频主题
    pub topic: String,
    /// 视觉风格
    pub style: String,
    /// 旁白音色
    pub voice: String,
    /// 背景音乐 id
    pub music: String,
    /// 分镜数量
    pub scene_count: usize,
}

/// 登记项目并在后台启动流水线，立即返回项目 id
///
/// 调用方通过轮询存储观察进度，不提供推送
pub async fn create_project(
    store: ProjectStore,
    collaborators: Arc<Collaborators>,
    config: AssembleConfig,
    request: GenerateRequest,
) -> String {
    let project = Project::new(
        request.topic.clone(),
        request.style.clone(),
        request.voice.clone(),
        request.music.clone(),
    );
    let id = store.insert(project).await;

    let run_id = id.clone();
    let run_store = store.clone();
    tokio::spawn(async move {
        if let Err(e) = run_pipeline(&run_store, &run_id, collaborators, &config, &request).await {
            error!("流水线失败: {}", e);
            run_store
                .update(&run_id, |p| {
                    p.status = ProjectStatus::Error;
                    p.error = Some(e.to_string());
                })
                .await;
        }
    });

    id
}

/// 依次执行 脚本 -> 图片 -> 语音 -> 合成 四个阶段
///
/// 任何阶段失败都让调用方把项目置为 error 终态，不做自动重试
pub async fn run_pipeline(
    store: &ProjectStore,
    id: &str,
    collaborators: Arc<Collaborators>,
    config: &AssembleConfig,
    request: &GenerateRequest,
) -> Result<()> {
    // 1. 生成分镜脚本
    store
        .update(id, |p| {
            p.status = ProjectStatus::GeneratingScript;
            p.progress = 10;
        })
        .await;

    let scenes = collaborators
        .script
        .generate_script(&request.topic, &request.style, request.scene_count)
        .await?;

    let stored_scenes = scenes.clone();
    store
        .update(id, |p| {
            p.scenes = stored_scenes;
            p.progress = 20;
        })
        .await;

    // 2. 按分镜顺序逐张生成图片，进度在 20-60 区间内按张推进
    store
        .update(id, |p| p.status = ProjectStatus::GeneratingImages)
        .await;

    let total = scenes.len();
    let mut image_urls = Vec::with_capacity(total);
    for (i, scene) in scenes.iter().enumerate() {
        let url = collaborators
            .image
            .generate_image(&scene.image_prompt, &request.style)
            .await?;
        image_urls.push(url);

        let progress = 20 + (((i + 1) as f64 / total as f64) * 40.0) as u8;
        store.update(id, |p| p.progress = progress).await;
        info!("分镜图片完成 {}/{}", i + 1, total);
    }

    // 3. 整段脚本一次性合成旁白
    store
        .update(id, |p| {
            p.status = ProjectStatus::GeneratingAudio;
            p.progress = 65;
        })
        .await;

    let full_text = scenes
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let audio = collaborators
        .speech
        .synthesize(&full_text, &request.voice)
        .await?;

    store.update(id, |p| p.progress = 80).await;

    // 4. 合成成片
    store
        .update(id, |p| {
            p.status = ProjectStatus::Assembling;
            p.progress = 85;
        })
        .await;

    if collaborators.preview_only {
        // 预览回退：不产出视频，把分镜图片列表作为最终产物
        info!("预览模式，跳过视频合成");
        store
            .update(id, |p| {
                p.image_urls = Some(image_urls);
                p.progress = 100;
                p.status = ProjectStatus::Complete;
            })
            .await;
        return Ok(());
    }

    let assembly_scenes: Vec<AssemblyScene> = scenes
        .iter()
        .zip(&image_urls)
        .map(|(scene, url)| AssemblyScene {
            image_ref: url.clone(),
            text: scene.text.clone(),
            duration: scene.duration,
        })
        .collect();

    // 背景音乐 id 在这里解析成具体地址，`none` 音轨保持纯旁白
    let mut run_config = config.clone();
    if run_config.music_url.is_none() {
        let track = get_music_track(&request.music).ok_or_else(|| {
            ComposeError::InvalidInput(format!("未知的背景音乐 id: {}", request.music))
        })?;
        if !track.url.is_empty() {
            run_config.music_url = Some(track.url.to_string());
        }
    }

    let result = assemble_video(&assembly_scenes, &audio, &run_config).await?;

    store
        .update(id, |p| {
            p.video_path = Some(result.video_path);
            p.thumbnail_path = result.thumbnail_path;
            p.image_urls = Some(image_urls);
            p.progress = 100;
            p.status = ProjectStatus::Complete;
        })
        .await;

    info!("项目 {} 生成完成", id);
    Ok(())
}
