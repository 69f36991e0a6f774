use crate::error::Result;
use image::imageops::FilterType;
use image::{imageops, DynamicImage, Rgb, RgbImage};
use std::path::Path;

/// 把任意宽高比的图片规整到目标画幅
///
/// 先按比例缩放到不超过目标尺寸，再居中贴到黑色画布上，
/// 多出的部分左右或上下对称补黑边，输出恒为 width x height
pub fn letterbox(img: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let scaled = img.resize(width, height, FilterType::Lanczos3).to_rgb8();
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    let x = (width - scaled.width()) / 2;
    let y = (height - scaled.height()) / 2;
    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

/// 读取源图片，规整到目标画幅后存为 PNG
///
/// 下载的素材文件名不一定带扩展名，按内容嗅探格式
pub fn normalize_image(src: &Path, dest: &Path, width: u32, height: u32) -> Result<()> {
    let img = image::io::Reader::open(src)?.with_guessed_format()?.decode()?;
    let canvas = letterbox(&img, width, height);
    canvas.save(dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn white_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_wide_image_letterboxed_vertically() {
        // 200x100 -> 100x100：缩放到 100x50，上下各补 25 像素黑边
        let out = letterbox(&white_image(200, 100), 100, 100);
        assert_eq!((out.width(), out.height()), (100, 100));

        assert_eq!(out.get_pixel(50, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(50, 99), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(50, 50), &Rgb([255, 255, 255]));

        // 黑边上下对称
        let top_band = (0..100).take_while(|&y| out.get_pixel(50, y)[0] == 0).count();
        let bottom_band = (0..100)
            .rev()
            .take_while(|&y| out.get_pixel(50, y)[0] == 0)
            .count();
        assert_eq!(top_band, bottom_band);
        assert_eq!(top_band, 25);
    }

    #[test]
    fn test_tall_image_letterboxed_horizontally() {
        // 100x200 -> 100x100：缩放到 50x100，左右各补 25 像素黑边
        let out = letterbox(&white_image(100, 200), 100, 100);
        assert_eq!((out.width(), out.height()), (100, 100));

        assert_eq!(out.get_pixel(0, 50), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(99, 50), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(50, 50), &Rgb([255, 255, 255]));

        let left_band = (0..100).take_while(|&x| out.get_pixel(x, 50)[0] == 0).count();
        let right_band = (0..100)
            .rev()
            .take_while(|&x| out.get_pixel(x, 50)[0] == 0)
            .count();
        assert_eq!(left_band, right_band);
        assert_eq!(left_band, 25);
    }

    #[test]
    fn test_matching_aspect_fills_frame() {
        // 宽高比一致时整幅填满，不产生黑边
        let out = letterbox(&white_image(50, 50), 100, 100);
        assert_eq!((out.width(), out.height()), (100, 100));
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(99, 99), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_vertical_frame_target() {
        // 横图放进竖版画幅：1080x1920 输出尺寸精确
        let out = letterbox(&white_image(1024, 1024), 108, 192);
        assert_eq!((out.width(), out.height()), (108, 192));
        assert_eq!(out.get_pixel(54, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(54, 96), &Rgb([255, 255, 255]));
    }
}
