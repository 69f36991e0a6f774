use crate::error::{ComposeError, Result};
use reqwest::Client;
use std::path::Path;
use tracing::info;

/// 把一个素材引用抓取到本地路径
///
/// 引用可以是 http(s) 地址，也可以是已经存在的本地文件路径
/// （协作方复用本地素材时直接返回路径）
pub async fn fetch_to_file(client: &Client, reference: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    if reference.starts_with("http://") || reference.starts_with("https://") {
        info!("正在下载素材: {}", reference);
        let response = client.get(reference).send().await?;
        if !response.status().is_success() {
            return Err(ComposeError::Collaborator(format!(
                "下载失败 (HTTP {}): {}",
                response.status(),
                reference
            )));
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
    } else {
        let src = Path::new(reference);
        if !src.is_file() {
            return Err(ComposeError::InvalidInput(format!(
                "素材引用既不是 URL 也不是本地文件: {}",
                reference
            )));
        }
        tokio::fs::copy(src, dest).await?;
    }

    info!("素材已保存到: {}", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_file_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.png");
        tokio::fs::write(&src, b"data").await.unwrap();

        let dest = dir.path().join("out/copy.png");
        let client = Client::new();
        fetch_to_file(&client, src.to_str().unwrap(), &dest)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_missing_local_reference_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("copy.png");
        let client = Client::new();

        let err = fetch_to_file(&client, "/no/such/file.png", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, ComposeError::InvalidInput(_)));
    }
}
