// Dimensional and channel correction of a decoded upload into the model's
// input tensor. Pixel value scaling lives inside the model, not here.
use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;

pub const IMAGE_SIZE: u32 = 224;

/// Produces the (1, 224, 224, 3) input tensor for an arbitrary decoded
/// image. The resize does not preserve aspect ratio; an alpha channel, if
/// present, is dropped.
pub fn preprocess(image: &DynamicImage) -> Array4<f32> {
    let resized = image.resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let size = IMAGE_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, y as usize, x as usize, channel]] = f32::from(pixel[channel]);
        }
    }
    tensor
}
