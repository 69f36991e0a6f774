use crate::dashscope::DashScopeClient;
use crate::error::Result;
use crate::fixture::FixtureCollaborator;
use crate::scene::Scene;
use async_trait::async_trait;

/// 脚本协作方：把主题扩写成有序的分镜列表
#[async_trait]
pub trait ScriptProvider: Send + Sync {
    async fn generate_script(
        &self,
        topic: &str,
        style: &str,
        scene_count: usize,
    ) -> Result<Vec<Scene>>;
}

/// 图片协作方：为单个分镜生成一张可抓取的画面，返回素材引用
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(&self, prompt: &str, style: &str) -> Result<String>;
}

/// 语音协作方：为整段脚本合成一条完整旁白音轨
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}

/// 一组绑定好的协作方
///
/// 在流水线构造时选定一次，时间轴 / 字幕 / 合成核心不感知具体后端
pub struct Collaborators {
    pub script: Box<dyn ScriptProvider>,
    pub image: Box<dyn ImageProvider>,
    pub speech: Box<dyn SpeechProvider>,
    /// 预览模式：跳过视频合成，把分镜图片列表直接作为产物
    pub preview_only: bool,
}

impl Collaborators {
    /// 真实后端：DashScope 的文本 / 文生图 / 语音合成服务
    pub fn dashscope(api_key: String) -> Self {
        let client = DashScopeClient::new(api_key);
        Self {
            script: Box::new(client.clone()),
            image: Box::new(client.clone()),
            speech: Box::new(client),
            preview_only: false,
        }
    }

    /// 示例数据后端：不依赖任何外部服务，用于演示与测试
    pub fn fixture() -> Self {
        Self {
            script: Box::new(FixtureCollaborator::default()),
            image: Box::new(FixtureCollaborator::default()),
            speech: Box::new(FixtureCollaborator::default()),
            preview_only: true,
        }
    }
}
