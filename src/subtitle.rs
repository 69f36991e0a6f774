use crate::scene::TimedScene;

/// 字幕的垂直位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalPosition {
    Top,
    Center,
    Bottom,
}

/// 字幕样式预设：字体、正文颜色、描边颜色与垂直位置
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    /// 样式 id
    pub id: &'static str,
    /// 字体
    pub font: &'static str,
    /// 正文颜色（#RRGGBB）
    pub primary_color: &'static str,
    /// 描边颜色（#RRGGBB），None 表示不描边
    pub outline_color: Option<&'static str>,
    /// 垂直位置
    pub position: VerticalPosition,
}

/// 内置样式表，第一项为默认样式
pub const CAPTION_STYLES: &[CaptionStyle] = &[
    CaptionStyle {
        id: "classic",
        font: "Arial",
        primary_color: "#FFFFFF",
        outline_color: Some("#000000"),
        position: VerticalPosition::Bottom,
    },
    CaptionStyle {
        id: "bold",
        font: "Impact",
        primary_color: "#FFFF00",
        outline_color: Some("#000000"),
        position: VerticalPosition::Bottom,
    },
    CaptionStyle {
        id: "clean",
        font: "Helvetica",
        primary_color: "#FFFFFF",
        outline_color: None,
        position: VerticalPosition::Center,
    },
    CaptionStyle {
        id: "headline",
        font: "Arial Black",
        primary_color: "#FFFFFF",
        outline_color: Some("#202020"),
        position: VerticalPosition::Top,
    },
];

/// 字号固定值
const FONT_SIZE: u32 = 72;
/// 配置了描边颜色时的描边宽度
const OUTLINE_WIDTH: u32 = 4;
/// 非居中样式的垂直边距
const MARGIN_V: u32 = 80;

/// 按 id 查找样式，未知 id 回退到默认样式，不报错
pub fn resolve_style(id: &str) -> &'static CaptionStyle {
    CAPTION_STYLES
        .iter()
        .find(|s| s.id == id)
        .unwrap_or(&CAPTION_STYLES[0])
}

/// 把 #RRGGBB 颜色转成 ASS 的 &HAABBGGRR 形式
///
/// 通道顺序反转为 BGR，alpha 固定为 00（完全不透明）
fn ass_color(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| -> u8 {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0xFF)
    };
    let r = channel(0..2);
    let g = channel(2..4);
    let b = channel(4..6);
    format!("&H00{:02X}{:02X}{:02X}", b, g, r)
}

/// 垂直位置对应的小键盘锚点编号
fn alignment_code(position: VerticalPosition) -> u8 {
    match position {
        VerticalPosition::Bottom => 2,
        VerticalPosition::Center => 5,
        VerticalPosition::Top => 8,
    }
}

/// 垂直边距：居中为 0，其余为固定值
fn margin_v(position: VerticalPosition) -> u32 {
    match position {
        VerticalPosition::Center => 0,
        _ => MARGIN_V,
    }
}

/// 把秒数格式化为 ASS 时间戳 H:MM:SS.cc（厘秒）
pub fn format_ass_time(seconds: f64) -> String {
    let h = (seconds / 3600.0).floor() as u64;
    let m = ((seconds % 3600.0) / 60.0).floor() as u64;
    let s = (seconds % 60.0).floor() as u64;
    let cs = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// 转义旁白文案中的 ASS 指令分隔符，防止文本被当成格式化指令
pub fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('{', "\\{")
        .replace('}', "\\}")
}

/// 由带时间轴的分镜与样式生成完整的 ASS 字幕文档
///
/// 结构：Script Info 头、一个全局样式块、每个分镜一条 Dialogue 事件
pub fn render_subtitles(
    timed_scenes: &[TimedScene],
    style: &CaptionStyle,
    width: u32,
    height: u32,
) -> String {
    let primary = ass_color(style.primary_color);
    let (outline_color, outline_width) = match style.outline_color {
        Some(hex) => (ass_color(hex), OUTLINE_WIDTH),
        None => ("&H00000000".to_string(), 0),
    };
    let alignment = alignment_code(style.position);
    let margin = margin_v(style.position);

    let header = format!(
        "[Script Info]\n\
         Title: AI Generated Video\n\
         ScriptType: v4.00+\n\
         PlayDepth: 0\n\
         PlayResX: {width}\n\
         PlayResY: {height}\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,{font},{size},{primary},&H000000FF,{outline_color},&H80000000,-1,0,0,0,100,100,0,0,1,{outline_width},2,{alignment},40,40,{margin},1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        width = width,
        height = height,
        font = style.font,
        size = FONT_SIZE,
        primary = primary,
        outline_color = outline_color,
        outline_width = outline_width,
        alignment = alignment,
        margin = margin,
    );

    let events: Vec<String> = timed_scenes
        .iter()
        .map(|scene| {
            format!(
                "Dialogue: 0,{},{},Default,,0,0,0,,{}",
                format_ass_time(scene.start_time),
                format_ass_time(scene.end_time()),
                escape_ass_text(&scene.text),
            )
        })
        .collect();

    header + &events.join("\n")
}
