use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use video_compose::{
    create_project, Collaborators, ConfigLoader, ConfigOverrides, GenerateRequest, ProjectStatus,
    ProjectStore, CAPTION_STYLES, MUSIC_TRACKS,
};

/// 短视频生成工具 - 把一个主题变成带旁白与字幕的竖版成片
#[derive(Parser, Debug)]
#[command(name = "video-compose")]
#[command(about = "短视频生成工具：脚本、配图、旁白与字幕一键合成", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 生成一条短视频
    Generate {
        /// 视频主题
        #[arg(short, long)]
        topic: String,

        /// 视觉风格 (realistic / anime / horror / documentary / fantasy / minimalist)
        #[arg(long, default_value = "realistic")]
        style: String,

        /// 旁白音色
        #[arg(long, default_value = "gentle")]
        voice: String,

        /// 背景音乐 id（none 表示纯旁白）
        #[arg(long, default_value = "none")]
        music: String,

        /// 分镜数量
        #[arg(long, default_value_t = 6)]
        scenes: usize,

        /// 成片输出目录
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 画幅宽度
        #[arg(long)]
        width: Option<u32>,

        /// 画幅高度
        #[arg(long)]
        height: Option<u32>,

        /// 关闭字幕烧录
        #[arg(long)]
        no_captions: bool,

        /// 字幕样式 id
        #[arg(long)]
        caption_style: Option<String>,

        /// 背景音乐音量 (0.0-1.0)
        #[arg(long)]
        music_volume: Option<f64>,

        /// 不抽取封面
        #[arg(long)]
        no_thumbnail: bool,

        /// 示例模式：不调用外部服务，跳过视频合成，产出分镜图片预览
        #[arg(long)]
        demo: bool,

        /// DashScope API key
        #[arg(long)]
        api_key: Option<String>,
    },
    /// 列出内置字幕样式与背景音乐
    Styles,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    // 加载环境变量
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match args.command {
        Commands::Generate {
            topic,
            style,
            voice,
            music,
            scenes,
            output,
            width,
            height,
            no_captions,
            caption_style,
            music_volume,
            no_thumbnail,
            demo,
            api_key,
        } => {
            // 选定协作方后端：示例模式或真实服务
            let collaborators = if demo {
                Collaborators::fixture()
            } else {
                let api_key = api_key
                    .or_else(|| std::env::var("DASHSCOPE_API_KEY").ok())
                    .context(
                        "未找到 DASHSCOPE_API_KEY，请通过 --api-key 或环境变量提供，或改用 --demo 示例模式",
                    )?;
                Collaborators::dashscope(api_key)
            };

            let config = ConfigLoader::load_assemble_config(ConfigOverrides {
                width,
                height,
                captions: if no_captions { Some(false) } else { None },
                caption_style,
                music_volume,
                thumbnail: if no_thumbnail { Some(false) } else { None },
                output_dir: output,
            });

            let store = ProjectStore::new();
            let request = GenerateRequest {
                topic,
                style,
                voice,
                music,
                scene_count: scenes,
            };

            let id = create_project(store.clone(), Arc::new(collaborators), config, request).await;
            info!("项目已创建: {}", id);

            // 轮询共享记录直到终态
            let mut last_progress = 0;
            loop {
                tokio::time::sleep(Duration::from_millis(500)).await;

                let project = store
                    .get(&id)
                    .await
                    .context(format!("项目记录丢失: {}", id))?;

                if project.progress != last_progress {
                    info!("状态: {:?}, 进度: {}%", project.status, project.progress);
                    last_progress = project.progress;
                }

                match project.status {
                    ProjectStatus::Complete => {
                        if let Some(path) = &project.video_path {
                            info!("成片: {}", path.display());
                        }
                        if let Some(path) = &project.thumbnail_path {
                            info!("封面: {}", path.display());
                        }
                        if project.video_path.is_none() {
                            if let Some(urls) = &project.image_urls {
                                info!("预览图片共 {} 张:", urls.len());
                                for url in urls {
                                    info!("  {}", url);
                                }
                            }
                        }
                        break;
                    }
                    ProjectStatus::Error => {
                        anyhow::bail!(
                            "生成失败: {}",
                            project.error.unwrap_or_else(|| "未知错误".to_string())
                        );
                    }
                    _ => {}
                }
            }
        }
        Commands::Styles => {
            println!("字幕样式:");
            for style in CAPTION_STYLES {
                let outline = style.outline_color.unwrap_or("无描边");
                println!(
                    "  {:<10} 字体 {:<12} 颜色 {:<8} 描边 {:<8} 位置 {:?}",
                    style.id, style.font, style.primary_color, outline, style.position
                );
            }

            println!("\n背景音乐:");
            for track in MUSIC_TRACKS {
                println!("  {:<20} {:<14} {}", track.id, track.name, track.description);
            }
        }
    }

    Ok(())
}
