use crate::error::{ComposeError, Result};
use crate::provider::{ImageProvider, ScriptProvider, SpeechProvider};
use crate::scene::Scene;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// 示例分镜脚本（玛雅文明消失之谜）
const FIXTURE_SCENES: &[(&str, &str, f64)] = &[
    (
        "Did you know the ancient Mayans predicted solar eclipses with incredible accuracy?",
        "Ancient Mayan observatory with starry night sky",
        6.0,
    ),
    (
        "But one day, their entire civilization just... vanished.",
        "Abandoned Mayan temple overtaken by jungle",
        5.0,
    ),
    (
        "Theories range from drought to warfare to disease.",
        "Dried cracked earth with Mayan ruins in background",
        5.0,
    ),
    (
        "But the truth might be even stranger.",
        "Mysterious glowing symbols on Mayan stone wall",
        4.0,
    ),
    (
        "What really happened to the Maya?",
        "Mayan calendar stone with dramatic lighting",
        4.0,
    ),
    (
        "Follow for more mysteries.",
        "Silhouette of explorer in front of Mayan pyramid at sunset",
        3.0,
    ),
];

/// 示例分镜图片（免费图库的竖版素材）
const FIXTURE_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1518638150340-f706e86654de?w=1080&h=1920&fit=crop",
    "https://images.unsplash.com/photo-1568402102990-bc541580b59f?w=1080&h=1920&fit=crop",
    "https://images.unsplash.com/photo-1509316785289-025f5b846b35?w=1080&h=1920&fit=crop",
    "https://images.unsplash.com/photo-1547471080-7cc2caa01a7e?w=1080&h=1920&fit=crop",
    "https://images.unsplash.com/photo-1464817739973-0128fe77aaa1?w=1080&h=1920&fit=crop",
];

/// 示例协作方：返回固定分镜、固定图库素材和静音音频，不依赖外部服务
#[derive(Debug, Default)]
pub struct FixtureCollaborator {
    image_index: AtomicUsize,
}

#[async_trait]
impl ScriptProvider for FixtureCollaborator {
    async fn generate_script(
        &self,
        topic: &str,
        _style: &str,
        scene_count: usize,
    ) -> Result<Vec<Scene>> {
        info!("[示例模式] 生成分镜脚本: {}", topic);

        if scene_count == 0 {
            return Err(ComposeError::InvalidInput(
                "分镜数量必须大于 0".to_string(),
            ));
        }

        Ok(FIXTURE_SCENES
            .iter()
            .take(scene_count)
            .map(|(text, prompt, duration)| Scene {
                text: text.to_string(),
                image_prompt: prompt.to_string(),
                duration: *duration,
            })
            .collect())
    }
}

#[async_trait]
impl ImageProvider for FixtureCollaborator {
    async fn generate_image(&self, prompt: &str, _style: &str) -> Result<String> {
        info!("[示例模式] 生成分镜图片: {:.50}", prompt);

        let index = self.image_index.fetch_add(1, Ordering::Relaxed);
        Ok(FIXTURE_IMAGES[index % FIXTURE_IMAGES.len()].to_string())
    }
}

#[async_trait]
impl SpeechProvider for FixtureCollaborator {
    async fn synthesize(&self, text: &str, _voice: &str) -> Result<Vec<u8>> {
        info!("[示例模式] 合成旁白语音，共 {} 字符", text.chars().count());

        // 重复的静音 MPEG 帧，足以当作占位音频
        let silent_frame: [u8; 32] = {
            let mut frame = [0u8; 32];
            frame[0] = 0xFF;
            frame[1] = 0xFB;
            frame[2] = 0x90;
            frame
        };

        let mut buffer = Vec::with_capacity(silent_frame.len() * 500);
        for _ in 0..500 {
            buffer.extend_from_slice(&silent_frame);
        }
        Ok(buffer)
    }
}
