//! Kayn image filter engine
//!
//! Pixel-transformation filters and a bounded undo/redo canvas history,
//! implemented in Rust with Python bindings via PyO3 and WASM bindings for
//! JavaScript.
//!
//! ## Image Format
//! Every filter works on a [`PixelBuffer`] with one of three channel layouts:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Samples are 8-bit (0-255). Filters never modify their input; each call
//! returns a freshly allocated buffer of the same dimensions.
//!
//! ## Usage
//! ```
//! use kayn::{filters, CanvaState, FilterKind, FilterParams, PixelBuffer, StateManager};
//!
//! let image = PixelBuffer::filled(4, 4, &[200, 120, 40]).unwrap();
//! let mut history = StateManager::default();
//! history.add(CanvaState::with_input(image.clone()));
//!
//! let params = FilterParams::default();
//! let gray = filters::apply(FilterKind::Grayscale, &image, &params).unwrap();
//! history.add(CanvaState::with_output(gray));
//!
//! assert!(history.prev().is_some());
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod filters;
pub mod history;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::{PixelBuffer, PixelBufferBuilder};
pub use config::EngineConfig;
pub use error::{FilterError, FilterResult};
pub use filters::{apply, ChannelKind, FilterKind, FilterParams, GrayscaleMethod};
pub use history::{CanvaState, StateManager};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray1, PyArray3, PyReadonlyArray3, ToPyArray};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::buffer::PixelBuffer;
    use crate::error::FilterError;
    use crate::filters::{self, ChannelKind, FilterKind, FilterParams, GrayscaleMethod};
    use crate::history::{self, CanvaState};

    impl From<FilterError> for PyErr {
        fn from(err: FilterError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    fn to_buffer(image: &PyReadonlyArray3<'_, u8>) -> Result<PixelBuffer, FilterError> {
        PixelBuffer::from_array(image.as_array().to_owned())
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Apply a filter by name.
    ///
    /// # Arguments
    /// * `image` - Input image (H, W, 1|3|4) uint8
    /// * `name` - Filter name, e.g. "binarize" or "blur_median"
    /// * `threshold` - Binarize / limiarize cut-off, clamped to 0-255
    /// * `radius` - Neighborhood radius for blur, rank and border filters
    /// * `probability`, `seed` - Salt and pepper noise
    /// * `luma` - Use BT.709 weights instead of the RGB mean for grayscale
    /// * `constant`, `gamma` - Dynamic compression
    #[pyfunction]
    #[pyo3(signature = (
        image, name, threshold=128, radius=1, probability=0.05, seed=0,
        luma=false, constant=1.0, gamma=1.0
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn apply_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
        threshold: i64,
        radius: u32,
        probability: f64,
        seed: u64,
        luma: bool,
        constant: f32,
        gamma: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kind: FilterKind = name.parse()?;
        let params = FilterParams {
            kernel_radius: radius,
            noise_probability: probability,
            rng_seed: seed,
            grayscale: if luma {
                GrayscaleMethod::Luma
            } else {
                GrayscaleMethod::Average
            },
            constant,
            gamma,
            ..FilterParams::default()
        }
        .with_threshold(threshold);

        let input = to_buffer(&image)?;
        let result = filters::apply(kind, &input, &params)?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// Keep one color channel ("red", "green" or "blue"), zeroing the others.
    #[pyfunction]
    pub fn channel<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        color: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let color: ChannelKind = color.parse()?;
        let result = filters::channel(color, &to_buffer(&image)?);
        Ok(result.into_array().into_pyarray(py))
    }

    /// Intensity histogram (256 buckets) normalized so the fullest bucket is 1.0.
    #[pyfunction]
    pub fn histogram<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let hist = filters::histogram(&to_buffer(&image)?);
        Ok(hist.to_vec().into_pyarray(py))
    }

    /// Threshold chosen by Otsu's method.
    #[pyfunction]
    pub fn otsu_threshold(image: PyReadonlyArray3<'_, u8>) -> PyResult<u8> {
        Ok(filters::otsu_threshold(&to_buffer(&image)?))
    }

    // ========================================================================
    // History
    // ========================================================================

    type Snapshot<'py> = (
        Option<Bound<'py, PyArray3<u8>>>,
        Option<Bound<'py, PyArray3<u8>>>,
    );

    fn snapshot<'py>(py: Python<'py>, state: &CanvaState) -> Snapshot<'py> {
        (
            state.input.as_ref().map(|b| b.view().to_pyarray(py)),
            state.output.as_ref().map(|b| b.view().to_pyarray(py)),
        )
    }

    /// Bounded undo/redo history of (input, output) canvas snapshots.
    #[pyclass(name = "StateManager")]
    pub struct PyStateManager {
        inner: history::StateManager,
    }

    #[pymethods]
    impl PyStateManager {
        #[new]
        #[pyo3(signature = (capacity=history::DEFAULT_CAPACITY))]
        fn new(capacity: usize) -> Self {
            Self {
                inner: history::StateManager::new(capacity),
            }
        }

        #[pyo3(signature = (input=None, output=None))]
        fn add(
            &mut self,
            input: Option<PyReadonlyArray3<'_, u8>>,
            output: Option<PyReadonlyArray3<'_, u8>>,
        ) -> PyResult<()> {
            let input = input.as_ref().map(to_buffer).transpose()?;
            let output = output.as_ref().map(to_buffer).transpose()?;
            self.inner.add(CanvaState::new(input, output));
            Ok(())
        }

        /// Undo; returns `(input, output)` or None.
        fn prev<'py>(&mut self, py: Python<'py>) -> Option<Snapshot<'py>> {
            self.inner.prev().map(|state| snapshot(py, state))
        }

        /// Redo; returns `(input, output)` or None.
        fn next<'py>(&mut self, py: Python<'py>) -> Option<Snapshot<'py>> {
            self.inner.next().map(|state| snapshot(py, state))
        }

        fn current<'py>(&self, py: Python<'py>) -> Option<Snapshot<'py>> {
            self.inner.current().map(|state| snapshot(py, state))
        }

        fn can_undo(&self) -> bool {
            self.inner.can_undo()
        }

        fn can_redo(&self) -> bool {
            self.inner.can_redo()
        }

        fn clear(&mut self) {
            self.inner.clear();
        }

        #[getter]
        fn capacity(&self) -> usize {
            self.inner.capacity()
        }

        #[getter]
        fn cursor(&self) -> Option<usize> {
            self.inner.cursor()
        }

        fn __len__(&self) -> usize {
            self.inner.len()
        }
    }

    /// Kayn image filter engine module
    #[pymodule]
    pub fn kayn(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(apply_filter, m)?)?;
        m.add_function(wrap_pyfunction!(channel, m)?)?;
        m.add_function(wrap_pyfunction!(histogram, m)?)?;
        m.add_function(wrap_pyfunction!(otsu_threshold, m)?)?;
        m.add_class::<PyStateManager>()?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::kayn;
