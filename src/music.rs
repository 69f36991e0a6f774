/// 背景音乐的情绪分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Dramatic,
    Upbeat,
    Mysterious,
    Calm,
    None,
}

/// 免版税背景音乐配置
#[derive(Debug, Clone)]
pub struct MusicTrack {
    /// 音轨 id
    pub id: &'static str,
    /// 展示名称
    pub name: &'static str,
    /// 简短描述
    pub description: &'static str,
    /// 可下载的音频地址，`none` 音轨为空
    pub url: &'static str,
    /// 情绪分类
    pub mood: Mood,
}

/// 内置音轨表（公共领域 / CC0 素材）
pub const MUSIC_TRACKS: &[MusicTrack] = &[
    MusicTrack {
        id: "none",
        name: "No Music",
        description: "Voice only",
        url: "",
        mood: Mood::None,
    },
    MusicTrack {
        id: "dramatic-orchestral",
        name: "Epic Journey",
        description: "Cinematic orchestral",
        url: "https://cdn.pixabay.com/audio/2022/01/18/audio_d1718ab41b.mp3",
        mood: Mood::Dramatic,
    },
    MusicTrack {
        id: "mysterious",
        name: "Dark Secrets",
        description: "Mysterious ambient",
        url: "https://cdn.pixabay.com/audio/2022/10/25/audio_946276e959.mp3",
        mood: Mood::Mysterious,
    },
    MusicTrack {
        id: "upbeat",
        name: "Energy Rise",
        description: "Motivational electronic",
        url: "https://cdn.pixabay.com/audio/2022/05/27/audio_1808fbf07a.mp3",
        mood: Mood::Upbeat,
    },
    MusicTrack {
        id: "calm",
        name: "Gentle Flow",
        description: "Peaceful piano",
        url: "https://cdn.pixabay.com/audio/2022/01/27/audio_15bd58c2cf.mp3",
        mood: Mood::Calm,
    },
];

/// 按 id 查找音轨
pub fn get_music_track(id: &str) -> Option<&'static MusicTrack> {
    MUSIC_TRACKS.iter().find(|t| t.id == id)
}

/// 按视觉风格推荐音轨（`none` 音轨始终包含在内）
pub fn tracks_for_style(style: &str) -> Vec<&'static MusicTrack> {
    let moods: &[Mood] = match style {
        "realistic" | "documentary" => &[Mood::Calm, Mood::Dramatic],
        "anime" => &[Mood::Upbeat, Mood::Dramatic],
        "horror" => &[Mood::Mysterious, Mood::Dramatic],
        "fantasy" => &[Mood::Dramatic, Mood::Mysterious],
        "minimalist" => &[Mood::Calm],
        _ => &[Mood::Calm, Mood::Dramatic],
    };

    MUSIC_TRACKS
        .iter()
        .filter(|t| t.mood == Mood::None || moods.contains(&t.mood))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(get_music_track("calm").unwrap().name, "Gentle Flow");
        assert!(get_music_track("missing").is_none());
    }

    #[test]
    fn test_none_track_has_no_url() {
        assert!(get_music_track("none").unwrap().url.is_empty());
    }

    #[test]
    fn test_style_suggestions_include_none() {
        let tracks = tracks_for_style("horror");
        assert!(tracks.iter().any(|t| t.id == "none"));
        assert!(tracks.iter().any(|t| t.id == "mysterious"));
        assert!(!tracks.iter().any(|t| t.id == "calm"));
    }
}
