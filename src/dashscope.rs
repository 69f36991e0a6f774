use crate::error::{ComposeError, Result};
use crate::provider::{ImageProvider, ScriptProvider, SpeechProvider};
use crate::scene::Scene;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

const DASHSCOPE_TEXT_API: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";
const DASHSCOPE_IMAGE_API: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text2image/image-synthesis";
const DASHSCOPE_TTS_API: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text2speech/speech-synthesis";
const DASHSCOPE_TASK_API: &str = "https://dashscope.aliyuncs.com/api/v1/tasks";

/// DashScope 协作方客户端，同时承担脚本、图片、语音三个角色
#[derive(Debug, Clone)]
pub struct DashScopeClient {
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    output: ImageOutput,
}

#[derive(Debug, Deserialize)]
struct ImageOutput {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct ImageTaskResponse {
    output: ImageTaskOutput,
}

#[derive(Debug, Deserialize)]
struct ImageTaskOutput {
    task_status: String,
    results: Option<Vec<ImageResult>>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    url: String,
}

/// 旁白音色表：友好名 -> cosyvoice 音色 id
const VOICES: &[(&str, &str)] = &[
    ("gentle", "longxiaochun"),
    ("bright", "longxiaoxia"),
    ("steady", "longshu"),
    ("news", "longshuo"),
    ("sweet", "longmiao"),
    ("stella", "loongstella"),
];

/// 未知音色回退到的默认音色
const DEFAULT_VOICE: &str = "longxiaochun";

/// 视觉风格对应的提示词后缀，未知风格按写实处理
fn style_suffix(style: &str) -> &'static str {
    match style {
        "realistic" => "photorealistic, cinematic lighting, 8k, highly detailed",
        "anime" => "anime style, vibrant colors, studio ghibli inspired",
        "horror" => "dark, eerie, horror movie aesthetic, dramatic shadows",
        "documentary" => "documentary style, realistic, historical accuracy",
        "fantasy" => "fantasy art, magical, ethereal lighting, detailed",
        "minimalist" => "minimalist, clean, modern design, simple",
        _ => "photorealistic, cinematic lighting, 8k, highly detailed",
    }
}

/// 按友好名解析音色 id
fn resolve_voice(voice: &str) -> &str {
    VOICES
        .iter()
        .find(|(name, _)| *name == voice)
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_VOICE)
}

impl DashScopeClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self { api_key, client }
    }

    /// 轮询文生图任务直到成功或超时，返回结果图片地址
    async fn wait_for_image_task(&self, task_id: &str) -> Result<String> {
        let max_retries = 60;
        let retry_interval = Duration::from_secs(5);

        for i in 0..max_retries {
            tokio::time::sleep(retry_interval).await;

            let get_url = format!("{}/{}", DASHSCOPE_TASK_API, task_id);
            let response = self
                .client
                .get(&get_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await?;
                warn!("查询任务状态失败 (HTTP {}): {}", status, error_text);
                continue;
            }

            let task_result: ImageTaskResponse = response.json().await?;
            match task_result.output.task_status.as_str() {
                "SUCCEEDED" => {
                    if let Some(url) = task_result
                        .output
                        .results
                        .and_then(|results| results.into_iter().next())
                        .map(|r| r.url)
                    {
                        return Ok(url);
                    }
                    return Err(ComposeError::Collaborator(
                        "图片任务成功但未返回图片地址".to_string(),
                    ));
                }
                "FAILED" => {
                    return Err(ComposeError::Collaborator("图片生成任务失败".to_string()));
                }
                other => {
                    info!("图片任务状态: {} ({}/{})", other, i + 1, max_retries);
                }
            }
        }

        Err(ComposeError::Collaborator("图片生成任务超时".to_string()))
    }
}

#[async_trait]
impl ScriptProvider for DashScopeClient {
    async fn generate_script(
        &self,
        topic: &str,
        style: &str,
        scene_count: usize,
    ) -> Result<Vec<Scene>> {
        info!("正在生成分镜脚本: {}", topic);

        let prompt = format!(
            r#"你是短视频爆款编剧。请围绕主题「{topic}」创作一段竖版短视频脚本，视觉风格为 {style}。

要求：
1. 恰好 {scene_count} 个分镜，开头必须有强钩子
2. 每个分镜的旁白简短有力，口语化，5-10 秒可以念完
3. 每个分镜的画面提示词用英文撰写，具体且有电影感，画面彼此不重复
4. 整条视频时长约 {total} 秒

请以 JSON 数组格式返回，每个元素包含：text（旁白）、imagePrompt（英文画面提示词）、duration（建议秒数，数字）

直接返回 JSON 数组，不要其他说明文字。"#,
            topic = topic,
            style = style,
            scene_count = scene_count,
            total = scene_count * 8,
        );

        let request_body = json!({
            "model": "qwen-plus",
            "input": {
                "messages": [
                    { "role": "user", "content": prompt }
                ]
            },
            "parameters": {
                "result_format": "message"
            }
        });

        let response = self
            .client
            .post(DASHSCOPE_TEXT_API)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ComposeError::Collaborator(format!(
                "脚本接口返回错误: {}",
                error_text
            )));
        }

        let response_json: serde_json::Value = response.json().await?;
        let generated_text = response_json["output"]["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ComposeError::Collaborator("脚本接口未返回文本内容".to_string())
            })?;

        // 清理可能的 markdown 代码块标记
        let json_text = generated_text
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        let scenes: Vec<Scene> = serde_json::from_str(json_text).map_err(|e| {
            ComposeError::InvalidInput(format!("分镜脚本不是预期的 JSON 结构: {}", e))
        })?;

        if scenes.is_empty() {
            return Err(ComposeError::InvalidInput(
                "脚本接口返回了空的分镜列表".to_string(),
            ));
        }

        info!("已生成 {} 个分镜", scenes.len());
        Ok(scenes)
    }
}

#[async_trait]
impl ImageProvider for DashScopeClient {
    async fn generate_image(&self, prompt: &str, style: &str) -> Result<String> {
        info!("正在生成分镜图片: {:.60}", prompt);

        let styled_prompt = format!("{}, {}", prompt, style_suffix(style));
        let request_body = json!({
            "model": "wanx-v1",
            "input": {
                "prompt": styled_prompt
            },
            "parameters": {
                "size": "1024*1792",
                "n": 1
            }
        });

        let response = self
            .client
            .post(DASHSCOPE_IMAGE_API)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-DashScope-Async", "enable")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ComposeError::Collaborator(format!(
                "图片接口返回错误: {}",
                error_text
            )));
        }

        let task_response: ImageGenerationResponse = response.json().await?;
        let task_id = task_response.output.task_id;
        info!("图片生成任务已提交: {}", task_id);

        self.wait_for_image_task(&task_id).await
    }
}

#[async_trait]
impl SpeechProvider for DashScopeClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        info!("正在合成旁白语音，共 {} 字符", text.chars().count());

        let request_body = json!({
            "model": "cosyvoice-v1",
            "input": {
                "text": text
            },
            "parameters": {
                "voice": resolve_voice(voice),
                "format": "mp3"
            }
        });

        let response = self
            .client
            .post(DASHSCOPE_TTS_API)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(ComposeError::Collaborator(format!(
                "语音接口返回错误: {}",
                error_text
            )));
        }

        let audio_data = response.bytes().await?;
        if audio_data.is_empty() {
            return Err(ComposeError::Collaborator(
                "语音接口返回了空音频".to_string(),
            ));
        }

        Ok(audio_data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_resolution_with_fallback() {
        assert_eq!(resolve_voice("gentle"), "longxiaochun");
        assert_eq!(resolve_voice("news"), "longshuo");
        assert_eq!(resolve_voice("no-such-voice"), DEFAULT_VOICE);
    }

    #[test]
    fn test_unknown_style_uses_realistic_suffix() {
        assert_eq!(style_suffix("unknown"), style_suffix("realistic"));
        assert!(style_suffix("anime").contains("anime"));
    }
}
