use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

use super::error::ClassifierError;

/// Spatial size used when the model leaves height or width dynamic.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Channel ordering of the model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// `[batch, channels, height, width]`
    Nchw,
    /// `[batch, height, width, channels]`
    Nhwc,
}

/// Element type of the model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputElement {
    F32,
    U8,
}

/// Per-channel normalisation applied to `f32` inputs: `(x - mean) / std`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for Normalization {
    /// MobileNet convention, maps `[0, 255]` onto `[-1, 1]`.
    fn default() -> Self {
        Self {
            mean: [127.5; 3],
            std: [127.5; 3],
        }
    }
}

/// Shape and type of the image tensor a model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    pub layout: InputLayout,
    pub height: u32,
    pub width: u32,
    pub element: InputElement,
}

impl InputSpec {
    /// Derives the input spec from a rank-4 tensor shape. Dynamic dims are `-1`.
    pub fn from_dimensions(dims: &[i64], element: InputElement) -> Result<Self, ClassifierError> {
        if dims.len() != 4 {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model input must be rank 4 (image batch), found rank {}",
                dims.len()
            )));
        }

        let spatial = |d: i64| -> Result<u32, ClassifierError> {
            if d <= 0 {
                Ok(DEFAULT_INPUT_SIZE)
            } else {
                u32::try_from(d).map_err(|_| {
                    ClassifierError::ModelLoadError(format!("Input dimension {} out of range", d))
                })
            }
        };

        let (layout, height, width) = match (dims[1], dims[3]) {
            (3, _) => (InputLayout::Nchw, spatial(dims[2])?, spatial(dims[3])?),
            (_, 3) => (InputLayout::Nhwc, spatial(dims[1])?, spatial(dims[2])?),
            _ => {
                return Err(ClassifierError::ModelLoadError(format!(
                    "Model input {:?} has no 3-channel axis in NCHW or NHWC position",
                    dims
                )))
            }
        };

        Ok(Self { layout, height, width, element })
    }

    fn shape(&self) -> (usize, usize, usize, usize) {
        let (h, w) = (self.height as usize, self.width as usize);
        match self.layout {
            InputLayout::Nchw => (1, 3, h, w),
            InputLayout::Nhwc => (1, h, w, 3),
        }
    }
}

fn resize_rgb(image: &DynamicImage, spec: &InputSpec) -> RgbImage {
    image
        .resize_exact(spec.width, spec.height, FilterType::Triangle)
        .to_rgb8()
}

fn fill<T: Clone + Default>(
    rgb: &RgbImage,
    spec: &InputSpec,
    convert: impl Fn(u8, usize) -> T,
) -> Array4<T> {
    let mut tensor = Array4::<T>::default(spec.shape());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let value = convert(pixel[c], c);
            match spec.layout {
                InputLayout::Nchw => tensor[[0, c, y, x]] = value,
                InputLayout::Nhwc => tensor[[0, y, x, c]] = value,
            }
        }
    }
    tensor
}

/// Resizes the image to the model input size and converts it to a normalised `f32` tensor.
pub(crate) fn to_f32_tensor(image: &DynamicImage, spec: &InputSpec, norm: &Normalization) -> Array4<f32> {
    let rgb = resize_rgb(image, spec);
    fill(&rgb, spec, |v, c| (f32::from(v) - norm.mean[c]) / norm.std[c])
}

/// Resizes the image to the model input size and keeps raw `u8` pixel values.
pub(crate) fn to_u8_tensor(image: &DynamicImage, spec: &InputSpec) -> Array4<u8> {
    let rgb = resize_rgb(image, spec);
    fill(&rgb, spec, |v, _| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_spec_detects_layout() {
        let nchw = InputSpec::from_dimensions(&[1, 3, 224, 224], InputElement::F32).unwrap();
        assert_eq!(nchw.layout, InputLayout::Nchw);

        let nhwc = InputSpec::from_dimensions(&[-1, 192, 160, 3], InputElement::U8).unwrap();
        assert_eq!(nhwc.layout, InputLayout::Nhwc);
        assert_eq!((nhwc.height, nhwc.width), (192, 160));
    }

    #[test]
    fn test_spec_dynamic_dims_default() {
        let spec = InputSpec::from_dimensions(&[-1, 3, -1, -1], InputElement::F32).unwrap();
        assert_eq!((spec.height, spec.width), (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE));
    }

    #[test]
    fn test_spec_rejects_bad_shapes() {
        assert!(matches!(
            InputSpec::from_dimensions(&[1, 1000], InputElement::F32),
            Err(ClassifierError::ModelLoadError(_))
        ));
        assert!(InputSpec::from_dimensions(&[1, 4, 224, 224], InputElement::F32).is_err());
    }

    #[test]
    fn test_f32_tensor_normalised() {
        let spec = InputSpec::from_dimensions(&[1, 3, 4, 4], InputElement::F32).unwrap();
        let tensor = to_f32_tensor(&solid(8, 8, [255, 0, 127]), &spec, &Normalization::default());
        assert_eq!(tensor.shape(), &[1, 3, 4, 4]);
        assert!((tensor[[0, 0, 1, 1]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 2, 3]] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_u8_tensor_nhwc() {
        let spec = InputSpec::from_dimensions(&[1, 2, 2, 3], InputElement::U8).unwrap();
        let tensor = to_u8_tensor(&solid(5, 3, [10, 20, 30]), &spec);
        assert_eq!(tensor.shape(), &[1, 2, 2, 3]);
        assert_eq!(tensor[[0, 1, 0, 2]], 30);
    }
}
