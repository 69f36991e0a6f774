use thiserror::Error;

/// 合成流水线的错误分类
#[derive(Error, Debug)]
pub enum ComposeError {
    /// 输入不合法（空旁白、音频时长为零、协作方返回无法解析等）
    #[error("输入不合法: {0}")]
    InvalidInput(String),

    /// 协作方调用失败（脚本 / 图片 / 语音接口）
    #[error("协作方调用失败: {0}")]
    Collaborator(String),

    /// 外部编码器执行失败（非零退出或未产出文件）
    #[error("编码失败: {0}")]
    Encoding(String),

    #[error("图片处理错误: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP 请求错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ComposeError>;
