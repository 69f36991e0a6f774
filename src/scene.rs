use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 表示一个分镜：一段旁白文案加上对应的画面提示词
///
/// 由脚本阶段产出，合成开始前可以被调用方编辑，之后不再变化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// 旁白文案
    pub text: String,
    /// 图片生成提示词
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    /// 脚本阶段给出的建议时长（秒），仅供参考，不参与时间轴计算
    pub duration: f64,
}

/// 带有计算时间轴的分镜
///
/// 各分镜首尾相接：前一个的 start_time + duration 等于后一个的 start_time
#[derive(Debug, Clone)]
pub struct TimedScene {
    /// 旁白文案
    pub text: String,
    /// 在成片中的开始时间（秒）
    pub start_time: f64,
    /// 计算出的展示时长（秒），不低于最短时长
    pub duration: f64,
    /// 规整后的本地图片路径，在合成阶段填入
    pub image_path: Option<PathBuf>,
}

impl TimedScene {
    /// 分镜在成片中的结束时间（秒）
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}
