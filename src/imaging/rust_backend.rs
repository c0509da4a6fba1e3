//! Pure Rust image backend, no system libraries.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Load (JPEG, PNG) | `image::ImageReader` (pure Rust decoders) |
//! | HEIF container | `avif-parse` (ISO-BMFF boxes, primary item extraction) |
//! | AV1 primary item | `rav1d` (pure Rust port of dav1d) + BT.601 YUV→RGB |
//!
//! HEVC-coded HEIC items have no pure-Rust decoder; `avif-parse` rejects
//! them and the caller sees a [`BackendError::ProcessingFailed`].

use super::backend::{BackendError, ImageBackend, PixelMode, RawImage};
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: {}",
                    path.display(),
                    e
                ))
            })
    }

    fn decode_container(&self, path: &Path) -> Result<RawImage, BackendError> {
        let file_data = std::fs::read(path).map_err(BackendError::Io)?;
        let heif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data)).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to parse HEIF container {}: {e:?}",
                path.display()
            ))
        })?;
        decode_av1_item(&heif.primary_item)
    }
}

/// Decode one AV1 still frame into packed RGB8 rows.
fn decode_av1_item(av1_bytes: &[u8]) -> Result<RawImage, BackendError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use std::ptr::NonNull;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    let settings_ptr = NonNull::new(settings.as_mut_ptr())
        .ok_or_else(|| BackendError::ProcessingFailed("rav1d settings alloc failed".into()))?;
    unsafe { rav1d::src::lib::dav1d_default_settings(settings_ptr) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "rav1d open failed ({})",
            rc.0
        )));
    }

    let mut data = Dav1dData::default();
    let buf_ptr =
        unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1_bytes.len()) };
    if buf_ptr.is_null() {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(BackendError::ProcessingFailed(
            "rav1d data_create failed".into(),
        ));
    }
    unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf_ptr, av1_bytes.len()) };

    let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(BackendError::ProcessingFailed(format!(
            "rav1d send_data failed ({})",
            rc.0
        )));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(BackendError::ProcessingFailed(format!(
            "rav1d get_picture failed ({})",
            rc.0
        )));
    }

    let layout = pic.p.layout;
    let subsampling = match layout {
        DAV1D_PIXEL_LAYOUT_I400 => Some((false, false)),
        DAV1D_PIXEL_LAYOUT_I420 => Some((true, true)),
        DAV1D_PIXEL_LAYOUT_I422 => Some((true, false)),
        DAV1D_PIXEL_LAYOUT_I444 => Some((false, false)),
        _ => None,
    };

    let result = match (subsampling, pic.data[0]) {
        (Some((ss_x, ss_y)), Some(y_plane)) => {
            let monochrome = layout == DAV1D_PIXEL_LAYOUT_I400;
            let y_ptr = y_plane.as_ptr() as *const u8;
            let chroma = |i: usize| {
                pic.data[i]
                    .map(|p| p.as_ptr() as *const u8)
                    .unwrap_or(y_ptr)
            };
            let planes = YuvPlanes {
                y_ptr,
                u_ptr: if monochrome { y_ptr } else { chroma(1) },
                v_ptr: if monochrome { y_ptr } else { chroma(2) },
                y_stride: pic.stride[0],
                uv_stride: if monochrome { 0 } else { pic.stride[1] },
                width: pic.p.w as u32,
                height: pic.p.h as u32,
                bpc: pic.p.bpc as u32,
                ss_x,
                ss_y,
                monochrome,
            };
            Ok(planes.to_raw_rgb())
        }
        (None, _) => Err(BackendError::ProcessingFailed(format!(
            "Unsupported pixel layout: {layout}"
        ))),
        (_, None) => Err(BackendError::ProcessingFailed(
            "rav1d returned a picture without a luma plane".into(),
        )),
    };

    unsafe {
        rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
        rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
    }

    result
}

/// YUV plane pointers borrowed from a live rav1d picture.
struct YuvPlanes {
    y_ptr: *const u8,
    u_ptr: *const u8,
    v_ptr: *const u8,
    y_stride: isize,
    uv_stride: isize,
    width: u32,
    height: u32,
    bpc: u32,
    /// Chroma subsampling: horizontal, vertical (e.g. I420 = true, true)
    ss_x: bool,
    ss_y: bool,
    monochrome: bool,
}

impl YuvPlanes {
    /// Convert to packed RGB8 using BT.601 coefficients.
    fn to_raw_rgb(&self) -> RawImage {
        let max_val = ((1u32 << self.bpc) - 1) as f32;
        let center = (1u32 << (self.bpc - 1)) as f32;
        let scale = 255.0 / max_val;
        let stride = self.width as usize * 3;

        let mut data = vec![0u8; stride * self.height as usize];

        for row in 0..self.height {
            for col in 0..self.width {
                let y_val = read_sample(self.y_ptr, self.y_stride, col, row, self.bpc);

                let (r, g, b) = if self.monochrome {
                    let v = (y_val * scale).clamp(0.0, 255.0);
                    (v, v, v)
                } else {
                    let u_col = if self.ss_x { col / 2 } else { col };
                    let u_row = if self.ss_y { row / 2 } else { row };
                    let cb = read_sample(self.u_ptr, self.uv_stride, u_col, u_row, self.bpc) - center;
                    let cr = read_sample(self.v_ptr, self.uv_stride, u_col, u_row, self.bpc) - center;

                    (
                        ((y_val + 1.402 * cr) * scale).clamp(0.0, 255.0),
                        ((y_val - 0.344136 * cb - 0.714136 * cr) * scale).clamp(0.0, 255.0),
                        ((y_val + 1.772 * cb) * scale).clamp(0.0, 255.0),
                    )
                };

                let idx = row as usize * stride + col as usize * 3;
                data[idx] = r as u8;
                data[idx + 1] = g as u8;
                data[idx + 2] = b as u8;
            }
        }

        RawImage {
            mode: PixelMode::Rgb8,
            width: self.width,
            height: self.height,
            stride,
            data,
        }
    }
}

/// Read one sample from a plane; 10/12-bit content is stored as u16.
#[inline]
fn read_sample(ptr: *const u8, stride: isize, x: u32, y: u32, bpc: u32) -> f32 {
    if bpc <= 8 {
        (unsafe { *ptr.offset(y as isize * stride + x as isize) }) as f32
    } else {
        let byte_offset = y as isize * stride + x as isize * 2;
        (unsafe { (ptr.offset(byte_offset) as *const u16).read_unaligned() }) as f32
    }
}
