use crate::error::{ComposeError, Result};
use crate::scene::{Scene, TimedScene};

/// 单个分镜的最短展示时长（秒）
pub const MIN_SCENE_SECONDS: f64 = 2.0;

/// 统计空白分隔的词数
fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 根据全文词数与实测音频总时长，为每个分镜推算开始时间与展示时长
///
/// 采用全局语速（词/秒）按词数比例分配，脚本阶段的建议时长不参与计算，
/// 因此即使建议时长偏差很大，时间轴依然与实际旁白对齐。
/// 分镜时长不低于 MIN_SCENE_SECONDS，总和可能因此略微超出音频时长，
/// 下游合成按音频长度截断成片。
pub fn estimate_timing(scenes: &[Scene], total_audio_duration: f64) -> Result<Vec<TimedScene>> {
    if total_audio_duration <= 0.0 {
        return Err(ComposeError::InvalidInput(format!(
            "音频总时长必须为正数: {}",
            total_audio_duration
        )));
    }

    let total_words: usize = scenes.iter().map(|s| word_count(&s.text)).sum();
    if total_words == 0 {
        return Err(ComposeError::InvalidInput(
            "所有分镜的旁白文案均为空".to_string(),
        ));
    }

    let words_per_second = total_words as f64 / total_audio_duration;

    let mut current_time = 0.0;
    let timed = scenes
        .iter()
        .map(|scene| {
            let words = word_count(&scene.text) as f64;
            let duration = (words / words_per_second).max(MIN_SCENE_SECONDS);
            let result = TimedScene {
                text: scene.text.clone(),
                start_time: current_time,
                duration,
                image_path: None,
            };
            current_time += duration;
            result
        })
        .collect();

    Ok(timed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_words(n: usize) -> Scene {
        Scene {
            text: vec!["word"; n].join(" "),
            image_prompt: String::new(),
            duration: 5.0,
        }
    }

    #[test]
    fn test_proportional_allocation() {
        // 30 个词、60 秒音频 => 语速 0.5 词/秒
        let scenes = vec![
            scene_with_words(10),
            scene_with_words(5),
            scene_with_words(15),
        ];
        let timed = estimate_timing(&scenes, 60.0).unwrap();

        assert_eq!(timed.len(), 3);
        assert!((timed[0].duration - 20.0).abs() < 1e-9);
        assert!((timed[1].duration - 10.0).abs() < 1e-9);
        assert!((timed[2].duration - 30.0).abs() < 1e-9);
        assert!((timed[0].start_time - 0.0).abs() < 1e-9);
        assert!((timed[1].start_time - 20.0).abs() < 1e-9);
        assert!((timed[2].start_time - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_contiguous_and_floored() {
        let scenes = vec![
            scene_with_words(1),
            scene_with_words(40),
            scene_with_words(3),
        ];
        let timed = estimate_timing(&scenes, 30.0).unwrap();

        assert_eq!(timed[0].start_time, 0.0);
        for pair in timed.windows(2) {
            assert!((pair[0].end_time() - pair[1].start_time).abs() < 1e-9);
        }
        for t in &timed {
            assert!(t.duration >= MIN_SCENE_SECONDS);
        }
    }

    #[test]
    fn test_floor_boundary() {
        // 1000 个词、100 秒 => 语速 10 词/秒
        // 19 个词的原始估计 1.9 秒，触发下限；21 个词的 2.1 秒不触发
        let scenes = vec![scene_with_words(19), scene_with_words(981)];
        let timed = estimate_timing(&scenes, 100.0).unwrap();
        assert!((timed[0].duration - 2.0).abs() < 1e-9);

        let scenes = vec![scene_with_words(21), scene_with_words(979)];
        let timed = estimate_timing(&scenes, 100.0).unwrap();
        assert!((timed[0].duration - 2.1).abs() < 1e-9);
    }

    #[test]
    fn test_zero_word_scene_gets_floor() {
        let scenes = vec![scene_with_words(0), scene_with_words(10)];
        let timed = estimate_timing(&scenes, 20.0).unwrap();
        assert!((timed[0].duration - MIN_SCENE_SECONDS).abs() < 1e-9);
        assert!((timed[1].start_time - MIN_SCENE_SECONDS).abs() < 1e-9);
    }

    #[test]
    fn test_scaling_word_counts_keeps_shares() {
        // 词数整体乘以常数后，各分镜占比不变（下限未触发时）
        let base = vec![
            scene_with_words(4),
            scene_with_words(8),
            scene_with_words(12),
        ];
        let scaled = vec![
            scene_with_words(8),
            scene_with_words(16),
            scene_with_words(24),
        ];
        let timed_base = estimate_timing(&base, 60.0).unwrap();
        let timed_scaled = estimate_timing(&scaled, 60.0).unwrap();

        for (a, b) in timed_base.iter().zip(&timed_scaled) {
            assert!((a.duration - b.duration).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_audio_duration_rejected() {
        let scenes = vec![scene_with_words(5)];
        let err = estimate_timing(&scenes, 0.0).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_narration_rejected() {
        let scenes = vec![scene_with_words(0), scene_with_words(0)];
        let err = estimate_timing(&scenes, 10.0).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidInput(_)));
    }

    #[test]
    fn test_single_long_scene_not_floored() {
        // 1 个词、100 秒 => 原始估计 100 秒，远超下限
        let scenes = vec![scene_with_words(1)];
        let timed = estimate_timing(&scenes, 100.0).unwrap();
        assert!((timed[0].duration - 100.0).abs() < 1e-9);
    }
}
