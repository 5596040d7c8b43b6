//! Owned pixel buffer shared by every filter and the canvas history.
//!
//! A [`PixelBuffer`] wraps an `Array3<u8>` of shape `(height, width, channels)`
//! in standard (row-major) layout, so the sample for channel `c` of pixel
//! `(x, y)` lives at offset `(y * width + x) * channels + c`.
//!
//! ## Supported Formats
//!
//! | Channels | Layout | Description |
//! |----------|--------|-------------|
//! | 1 | (H, W, 1) | Grayscale, 0-255 |
//! | 3 | (H, W, 3) | Red, green, blue, 0-255 |
//! | 4 | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! Buffers are immutable once built. Pixels can only be written through a
//! [`PixelBufferBuilder`]; filters always allocate a fresh output.

use ndarray::{Array3, ArrayView1, ArrayView3, ArrayViewMut1, Axis, Zip};

use crate::error::{FilterError, FilterResult};

/// Row-major 8-bit image with 1, 3 or 4 channels.
///
/// The backing array is always in standard layout and owns exactly
/// `width * height * channels` samples starting at offset 0, so
/// [`samples`](Self::samples) and [`into_raw_vec`](Self::into_raw_vec) see
/// the whole image and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

/// Validate a shape and return its sample count.
fn check_dimensions(width: usize, height: usize, channels: usize) -> FilterResult<usize> {
    if width == 0 || height == 0 {
        return Err(FilterError::MalformedBuffer(format!(
            "zero-sized buffer ({}x{})",
            width, height
        )));
    }
    if width > u32::MAX as usize || height > u32::MAX as usize {
        return Err(FilterError::MalformedBuffer(format!(
            "dimensions {}x{} exceed u32",
            width, height
        )));
    }
    if !matches!(channels, 1 | 3 | 4) {
        return Err(FilterError::InvalidArgument(format!(
            "unsupported channel count {} (expected 1, 3 or 4)",
            channels
        )));
    }

    // ndarray caps the element count at isize::MAX
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .filter(|&len| len <= isize::MAX as usize)
        .ok_or_else(|| {
            FilterError::MalformedBuffer(format!(
                "image dimensions {}x{}x{} overflow",
                width, height, channels
            ))
        })
}

impl PixelBuffer {
    /// Build a buffer from row-major samples.
    ///
    /// Fails with `MalformedBuffer` when `samples.len()` does not equal
    /// `width * height * channels` or either dimension is zero.
    pub fn from_raw(width: u32, height: u32, channels: usize, samples: Vec<u8>) -> FilterResult<Self> {
        let (w, h) = (width as usize, height as usize);
        let expected = check_dimensions(w, h, channels)?;

        if samples.len() != expected {
            return Err(FilterError::MalformedBuffer(format!(
                "expected {} samples for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channels,
                samples.len()
            )));
        }

        let data = Array3::from_shape_vec((h, w, channels), samples)
            .map_err(|e| FilterError::MalformedBuffer(e.to_string()))?;
        Ok(Self { data })
    }

    /// Wrap an existing `(height, width, channels)` array.
    ///
    /// Non-contiguous arrays, and sliced arrays that start inside a larger
    /// allocation, are copied into a tightly packed buffer.
    pub fn from_array(array: Array3<u8>) -> FilterResult<Self> {
        let (h, w, c) = array.dim();
        let expected = check_dimensions(w, h, c)?;

        let samples = if array.is_standard_layout() {
            let (raw, offset) = array.into_raw_vec_and_offset();
            let start = offset.unwrap_or(0);
            if start == 0 && raw.len() == expected {
                raw
            } else {
                raw.get(start..start + expected)
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| FilterError::MalformedBuffer("array extends past its storage".into()))?
            }
        } else {
            array.iter().copied().collect()
        };

        let data = Array3::from_shape_vec((h, w, c), samples)
            .map_err(|e| FilterError::MalformedBuffer(e.to_string()))?;
        Ok(Self { data })
    }

    /// Black (all-zero) buffer.
    pub fn new(width: u32, height: u32, channels: usize) -> FilterResult<Self> {
        let (w, h) = (width as usize, height as usize);
        check_dimensions(w, h, channels)?;
        Ok(Self {
            data: Array3::zeros((h, w, channels)),
        })
    }

    /// Buffer where every pixel equals `pixel`; the channel count is `pixel.len()`.
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> FilterResult<Self> {
        let (w, h) = (width as usize, height as usize);
        check_dimensions(w, h, pixel.len())?;
        Ok(Self {
            data: Array3::from_shape_fn((h, w, pixel.len()), |(_, _, c)| pixel[c]),
        })
    }

    /// Wrap filter output whose shape was derived from an already valid buffer.
    pub(crate) fn from_filtered(data: Array3<u8>) -> Self {
        debug_assert!(data.as_slice().is_some());
        Self { data }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Number of channels carrying color (alpha excluded).
    #[inline]
    pub fn color_channels(&self) -> usize {
        if self.has_alpha() {
            3
        } else {
            self.channels()
        }
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.channels() == 4
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.data.len()
    }

    /// Row-major samples, exactly `width * height * channels` of them.
    pub fn samples(&self) -> &[u8] {
        debug_assert!(self.data.as_slice().is_some(), "pixel buffer lost standard layout");
        self.data.as_slice().unwrap_or(&[])
    }

    /// Borrowed `(height, width, channels)` view.
    #[inline]
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// Samples of the pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> FilterResult<ArrayView1<'_, u8>> {
        if x >= self.width() || y >= self.height() {
            return Err(FilterError::OutOfRange {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(self
            .data
            .index_axis(Axis(0), y as usize)
            .index_axis_move(Axis(0), x as usize))
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    pub fn into_raw_vec(self) -> Vec<u8> {
        self.data.into_raw_vec_and_offset().0
    }

    /// Pointwise transform into a new buffer with the same channel count.
    ///
    /// `f` receives the source pixel and the (zeroed) destination pixel.
    pub fn map<F>(&self, f: F) -> PixelBuffer
    where
        F: Fn(ArrayView1<u8>, ArrayViewMut1<u8>) + Sync + Send,
    {
        Self::from_filtered(self.map_lanes(self.channels(), f))
    }

    /// Pointwise transform into a new buffer with `channels` channels.
    pub fn map_to<F>(&self, channels: usize, f: F) -> FilterResult<PixelBuffer>
    where
        F: Fn(ArrayView1<u8>, ArrayViewMut1<u8>) + Sync + Send,
    {
        check_dimensions(self.width() as usize, self.height() as usize, channels)?;
        Ok(Self::from_filtered(self.map_lanes(channels, f)))
    }

    fn map_lanes<F>(&self, channels: usize, f: F) -> Array3<u8>
    where
        F: Fn(ArrayView1<u8>, ArrayViewMut1<u8>) + Sync + Send,
    {
        let (height, width, _) = self.data.dim();
        let mut output = Array3::<u8>::zeros((height, width, channels));

        Zip::from(output.lanes_mut(Axis(2)))
            .and(self.data.lanes(Axis(2)))
            .par_for_each(|dst, src| f(src, dst));

        output
    }
}

/// Incremental construction of a [`PixelBuffer`].
///
/// The only place where individual pixels may be written.
#[derive(Debug, Clone)]
pub struct PixelBufferBuilder {
    data: Array3<u8>,
}

impl PixelBufferBuilder {
    pub fn new(width: u32, height: u32, channels: usize) -> FilterResult<Self> {
        let buffer = PixelBuffer::new(width, height, channels)?;
        Ok(Self { data: buffer.data })
    }

    /// Set every pixel to `pixel`.
    pub fn fill(mut self, pixel: &[u8]) -> FilterResult<Self> {
        self.check_pixel(pixel)?;
        for mut lane in self.data.lanes_mut(Axis(2)) {
            for (dst, &src) in lane.iter_mut().zip(pixel) {
                *dst = src;
            }
        }
        Ok(self)
    }

    pub fn set(&mut self, x: u32, y: u32, pixel: &[u8]) -> FilterResult<&mut Self> {
        let (height, width, _) = self.data.dim();
        if x as usize >= width || y as usize >= height {
            return Err(FilterError::OutOfRange {
                x,
                y,
                width: width as u32,
                height: height as u32,
            });
        }
        self.check_pixel(pixel)?;
        for (c, &v) in pixel.iter().enumerate() {
            self.data[[y as usize, x as usize, c]] = v;
        }
        Ok(self)
    }

    pub fn build(self) -> PixelBuffer {
        PixelBuffer::from_filtered(self.data)
    }

    fn check_pixel(&self, pixel: &[u8]) -> FilterResult<()> {
        let channels = self.data.dim().2;
        if pixel.len() != channels {
            return Err(FilterError::InvalidArgument(format!(
                "pixel has {} samples, buffer has {} channels",
                pixel.len(),
                channels
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    #[test]
    fn test_from_raw_offsets() {
        let samples: Vec<u8> = (0..24).collect();
        let buf = PixelBuffer::from_raw(4, 2, 3, samples).unwrap();

        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.channels(), 3);
        // (y * width + x) * channels = (1 * 4 + 2) * 3 = 18
        assert_eq!(buf.get(2, 1).unwrap().to_vec(), vec![18, 19, 20]);
        assert_eq!(buf.samples().len(), 24);
    }

    #[test]
    fn test_from_raw_length_mismatch() {
        let err = PixelBuffer::from_raw(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(err, FilterError::MalformedBuffer(_)));
    }

    #[test]
    fn test_zero_sized_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 5, 1),
            Err(FilterError::MalformedBuffer(_))
        ));
        assert!(matches!(
            PixelBuffer::from_raw(3, 0, 4, vec![]),
            Err(FilterError::MalformedBuffer(_))
        ));
    }

    #[test]
    fn test_unsupported_channels() {
        assert!(matches!(
            PixelBuffer::new(2, 2, 2),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_get_out_of_range() {
        let buf = PixelBuffer::new(3, 2, 1).unwrap();
        match buf.get(3, 0) {
            Err(FilterError::OutOfRange { x, y, width, height }) => {
                assert_eq!((x, y, width, height), (3, 0, 3, 2));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(buf.get(0, 2).is_err());
    }

    #[test]
    fn test_from_array_non_standard_layout() {
        let mut arr = Array3::<u8>::zeros((3, 2, 1));
        arr[[2, 1, 0]] = 7;
        // Swapping the spatial axes yields a transposed, non-contiguous view.
        let transposed = arr.permuted_axes([1, 0, 2]);
        let buf = PixelBuffer::from_array(transposed).unwrap();

        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.get(2, 1).unwrap()[0], 7);
        assert_eq!(buf.samples()[1 * 3 + 2], 7);
    }

    #[test]
    fn test_from_array_sliced_storage_is_packed() {
        let arr = Array3::from_shape_vec((4, 2, 1), vec![0, 1, 10, 11, 20, 21, 30, 31]).unwrap();

        // Rows 1..3 start two samples into the original allocation.
        let middle = PixelBuffer::from_array(arr.clone().slice_move(s![1..3, .., ..])).unwrap();
        assert_eq!(middle.samples(), &[10, 11, 20, 21]);
        assert_eq!(middle.sample_count(), 4);
        assert_eq!(middle.into_raw_vec(), vec![10, 11, 20, 21]);

        // Rows 0..2 start at offset 0 but leave a tail behind.
        let head = PixelBuffer::from_array(arr.slice_move(s![0..2, .., ..])).unwrap();
        assert_eq!(head.into_raw_vec(), vec![0, 1, 10, 11]);
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(u32::MAX, u32::MAX, 4),
            Err(FilterError::MalformedBuffer(_))
        ));
        // Fits in usize on 64-bit targets but exceeds isize::MAX
        assert!(matches!(
            PixelBuffer::new(u32::MAX, u32::MAX, 1),
            Err(FilterError::MalformedBuffer(_))
        ));
        assert!(matches!(
            PixelBuffer::filled(u32::MAX, u32::MAX, &[1, 2, 3]),
            Err(FilterError::MalformedBuffer(_))
        ));
        assert!(matches!(
            PixelBufferBuilder::new(u32::MAX, u32::MAX, 4),
            Err(FilterError::MalformedBuffer(_))
        ));
    }

    #[test]
    fn test_builder_set_and_bounds() {
        let mut builder = PixelBufferBuilder::new(2, 2, 4)
            .unwrap()
            .fill(&[10, 20, 30, 255])
            .unwrap();
        builder.set(1, 1, &[1, 2, 3, 4]).unwrap();
        assert!(matches!(
            builder.set(2, 0, &[0, 0, 0, 0]),
            Err(FilterError::OutOfRange { .. })
        ));
        assert!(matches!(
            builder.set(0, 0, &[0, 0, 0]),
            Err(FilterError::InvalidArgument(_))
        ));

        let buf = builder.build();
        assert_eq!(buf.get(0, 0).unwrap().to_vec(), vec![10, 20, 30, 255]);
        assert_eq!(buf.get(1, 1).unwrap().to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_map_allocates_new_buffer() {
        let src = PixelBuffer::filled(3, 3, &[100, 150, 200]).unwrap();
        let dst = src.map(|p, mut out| {
            for c in 0..p.len() {
                out[c] = p[c] / 2;
            }
        });

        assert_eq!(dst.get(1, 1).unwrap().to_vec(), vec![50, 75, 100]);
        assert_eq!(src.get(1, 1).unwrap().to_vec(), vec![100, 150, 200]);
    }

    #[test]
    fn test_map_to_changes_channels() {
        let src = PixelBuffer::filled(2, 1, &[9, 9, 9, 200]).unwrap();
        let gray = src.map_to(1, |p, mut out| out[0] = p[0]).unwrap();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.samples(), &[9, 9]);

        assert!(src.map_to(5, |_, _| {}).is_err());
    }

    #[test]
    fn test_into_raw_vec_is_row_major() {
        let mut builder = PixelBufferBuilder::new(2, 2, 1).unwrap();
        builder.set(1, 0, &[1]).unwrap();
        builder.set(0, 1, &[2]).unwrap();
        assert_eq!(builder.build().into_raw_vec(), vec![0, 1, 2, 0]);
    }
}
