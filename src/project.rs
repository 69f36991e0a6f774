use crate::scene::Scene;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// 项目状态，沿固定顺序推进；complete 和 error 为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    GeneratingScript,
    GeneratingImages,
    GeneratingAudio,
    Assembling,
    Complete,
    Error,
}

impl ProjectStatus {
    /// 是否已到终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Complete | ProjectStatus::Error)
    }
}

/// 一次生成任务的共享记录
///
/// 运行期间仅由流水线修改，查询方拿到的是快照
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: String,
    pub topic: String,
    pub style: String,
    pub voice: String,
    pub music: String,
    pub scenes: Vec<Scene>,
    pub status: ProjectStatus,
    /// 进度百分比，成功路径上单调不减
    pub progress: u8,
    /// 成片路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<PathBuf>,
    /// 封面路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
    /// 各分镜的图片地址，预览回退时作为最终产物
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    /// 失败原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(topic: String, style: String, voice: String, music: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topic,
            style,
            voice,
            music,
            scenes: Vec::new(),
            status: ProjectStatus::Pending,
            progress: 0,
            video_path: None,
            thumbnail_path: None,
            image_urls: None,
            error: None,
            created_at: Utc::now(),
        }
    }
}

/// 注入式的项目记录存储，按 id 读写，可安全地跨任务共享
#[derive(Clone, Default)]
pub struct ProjectStore {
    inner: Arc<RwLock<HashMap<String, Project>>>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个新项目，返回其 id
    pub async fn insert(&self, project: Project) -> String {
        let id = project.id.clone();
        self.inner.write().await.insert(id.clone(), project);
        id
    }

    /// 读取某个项目的快照
    pub async fn get(&self, id: &str) -> Option<Project> {
        self.inner.read().await.get(id).cloned()
    }

    /// 按 id 原地更新
    pub async fn update<F>(&self, id: &str, f: F)
    where
        F: FnOnce(&mut Project),
    {
        if let Some(project) = self.inner.write().await.get_mut(id) {
            f(project);
        }
    }

    /// 所有项目的快照
    pub async fn list(&self) -> Vec<Project> {
        self.inner.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project::new(
            "maya".to_string(),
            "realistic".to_string(),
            "gentle".to_string(),
            "none".to_string(),
        )
    }

    #[test]
    fn test_new_project_defaults() {
        let project = sample_project();
        assert_eq!(project.status, ProjectStatus::Pending);
        assert_eq!(project.progress, 0);
        assert!(project.video_path.is_none());
        assert!(project.error.is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ProjectStatus::Complete.is_terminal());
        assert!(ProjectStatus::Error.is_terminal());
        assert!(!ProjectStatus::Assembling.is_terminal());
        assert!(!ProjectStatus::Pending.is_terminal());
    }

    #[tokio::test]
    async fn test_store_insert_get_update() {
        let store = ProjectStore::new();
        let id = store.insert(sample_project()).await;

        let snapshot = store.get(&id).await.unwrap();
        assert_eq!(snapshot.topic, "maya");

        store
            .update(&id, |p| {
                p.status = ProjectStatus::GeneratingScript;
                p.progress = 10;
            })
            .await;

        let snapshot = store.get(&id).await.unwrap();
        assert_eq!(snapshot.status, ProjectStatus::GeneratingScript);
        assert_eq!(snapshot.progress, 10);
    }

    #[tokio::test]
    async fn test_store_snapshot_is_detached() {
        let store = ProjectStore::new();
        let id = store.insert(sample_project()).await;

        let mut snapshot = store.get(&id).await.unwrap();
        snapshot.progress = 99;

        assert_eq!(store.get(&id).await.unwrap().progress, 0);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::GeneratingImages).unwrap();
        assert_eq!(json, "\"generating_images\"");
    }
}
