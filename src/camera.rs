// Owns the image sensor and mediates every access to it.
// `CaptureSource` carries the lifecycle rules (one handle, idempotent release,
// read-back of the negotiated resolution); `SensorBackend` is the device itself.

use std::fmt;

use crate::error::{CaptureError, CaptureMiss, Error};
use crate::types::{Frame, PixelLayout, Resolution};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera, query,
    pixel_format::RgbFormat,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
};

/// A physical (or simulated) frame source.
pub trait SensorBackend {
    /// Ask for a resolution. The device may pick another one.
    fn request_resolution(&mut self, requested: Resolution) -> Result<(), String>;
    /// The resolution the device is actually delivering.
    fn resolution(&self) -> Resolution;
    /// Grab one frame.
    fn grab(&mut self) -> Result<Frame, CaptureMiss>;
    /// Stop streaming and give the device back to the OS.
    fn close(&mut self);
}

/// Exclusive handle to the sensor. Dropping it releases the device.
pub struct CaptureSource<B: SensorBackend> {
    index: u32,
    backend: Option<B>,
}

impl<B: SensorBackend> fmt::Debug for CaptureSource<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSource")
            .field("index", &self.index)
            .field("released", &self.is_released())
            .finish()
    }
}

impl<B: SensorBackend> CaptureSource<B> {
    /// Wrap an already opened backend.
    pub fn from_backend(index: u32, backend: B) -> Self {
        Self {
            index,
            backend: Some(backend),
        }
    }

    /// Request a capture size and return what the device actually chose.
    /// A refused request leaves the current mode in place. `None` once released.
    pub fn configure_resolution(&mut self, requested: Resolution) -> Option<Resolution> {
        let Some(backend) = self.backend.as_mut() else {
            log::warn!("configure_resolution on released camera {}", self.index);
            return None;
        };

        if let Err(e) = backend.request_resolution(requested) {
            log::warn!("camera {} refused {requested}: {e}", self.index);
        }
        let actual = backend.resolution();
        log::debug!(
            "camera {} resolution requested {requested}, actual {actual}",
            self.index
        );
        Some(actual)
    }

    /// The negotiated resolution, or `None` once released.
    pub fn resolution(&self) -> Option<Resolution> {
        self.backend.as_ref().map(|b| b.resolution())
    }

    /// Try to get the next frame. Misses are transient; callers retry next tick.
    pub fn read_frame(&mut self) -> Result<Frame, CaptureMiss> {
        let backend = self.backend.as_mut().ok_or(CaptureMiss::Released)?;
        let frame = backend.grab()?;
        if !frame.is_well_formed() {
            return Err(CaptureMiss::EmptyFrame);
        }
        Ok(frame)
    }

    /// Give the device back. Safe to call any number of times.
    pub fn release(&mut self) {
        match self.backend.take() {
            Some(mut backend) => {
                backend.close();
                log::info!("camera {} released", self.index);
            }
            None => log::debug!("camera {} already released", self.index),
        }
    }

    pub fn is_released(&self) -> bool {
        self.backend.is_none()
    }
}

impl<B: SensorBackend> Drop for CaptureSource<B> {
    fn drop(&mut self) {
        self.release();
    }
}

/// The real sensor, via nokhwa.
pub struct NokhwaSensor {
    cam: Camera,
}

impl NokhwaSensor {
    /// Create the camera and start streaming. Fails if the device is busy,
    /// absent or not permitted.
    pub fn open(index: u32) -> Result<Self, CaptureError> {
        let unavailable = |reason: String| CaptureError::DeviceUnavailable { index, reason };

        // Ask for RGB frames; the exact size is negotiated afterwards.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| unavailable(format!("create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| unavailable(format!("open stream: {e}")))?;

        Ok(Self { cam })
    }
}

impl SensorBackend for NokhwaSensor {
    fn request_resolution(&mut self, requested: Resolution) -> Result<(), String> {
        self.cam
            .set_resolution(nokhwa::utils::Resolution::new(
                requested.width,
                requested.height,
            ))
            .map_err(|e| e.to_string())
    }

    fn resolution(&self) -> Resolution {
        let res = self.cam.resolution();
        Resolution::new(res.width(), res.height())
    }

    fn grab(&mut self) -> Result<Frame, CaptureMiss> {
        let buffer = self
            .cam
            .frame()
            .map_err(|e| CaptureMiss::NoFrame(e.to_string()))?;

        // Decode whatever the device sends (MJPEG, YUYV, NV12) to RGB.
        let rgb = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureMiss::Decode(e.to_string()))?;
        let (width, height) = rgb.dimensions();

        Ok(Frame {
            width,
            height,
            layout: PixelLayout::Rgb,
            data: rgb.into_raw(),
        })
    }

    fn close(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("stop stream: {e}");
        }
    }
}

/// Open camera `index` with the nokhwa backend.
pub fn open(index: u32) -> Result<CaptureSource<NokhwaSensor>, CaptureError> {
    log::debug!("opening camera {index}");
    let sensor = NokhwaSensor::open(index)?;
    log::debug!("camera {index} opened");
    Ok(CaptureSource::from_backend(index, sensor))
}

/// An available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// The number to pass to `--device`. Backends that name devices by string
/// (AVFoundation, MediaFoundation) fall back to the enumeration position.
fn device_index(index: &CameraIndex, position: usize) -> u32 {
    index.as_index().unwrap_or(position as u32)
}

/// List cameras the OS reports. No cameras is an empty list, not an error.
pub fn list_devices() -> Result<Vec<CameraInfo>, Error> {
    let devices = query(ApiBackend::Auto).map_err(|e| Error::DeviceQuery(e.to_string()))?;

    Ok(devices
        .into_iter()
        .enumerate()
        .map(|(position, d)| CameraInfo {
            index: device_index(d.index(), position),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Sensor that only supports 640x480 and counts closes.
    struct FixedSensor {
        closes: Rc<Cell<u32>>,
        frames: Vec<Result<Frame, CaptureMiss>>,
    }

    impl SensorBackend for FixedSensor {
        fn request_resolution(&mut self, _requested: Resolution) -> Result<(), String> {
            Ok(())
        }

        fn resolution(&self) -> Resolution {
            Resolution::new(640, 480)
        }

        fn grab(&mut self) -> Result<Frame, CaptureMiss> {
            self.frames
                .pop()
                .unwrap_or(Err(CaptureMiss::NoFrame("drained".into())))
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    fn source(
        frames: Vec<Result<Frame, CaptureMiss>>,
    ) -> (CaptureSource<FixedSensor>, Rc<Cell<u32>>) {
        let closes = Rc::new(Cell::new(0));
        let sensor = FixedSensor {
            closes: Rc::clone(&closes),
            frames,
        };
        (CaptureSource::from_backend(0, sensor), closes)
    }

    #[test]
    fn test_configure_returns_actual_not_requested() {
        let (mut cam, _) = source(vec![]);
        let actual = cam.configure_resolution(Resolution::new(1920, 1080));
        assert_eq!(actual, Some(Resolution::new(640, 480)));
        assert_eq!(cam.resolution(), actual);
    }

    #[test]
    fn test_configure_after_release_reports_nothing() {
        let (mut cam, _) = source(vec![]);
        cam.release();
        assert_eq!(cam.configure_resolution(Resolution::new(1920, 1080)), None);
    }

    #[test]
    fn test_device_index_keeps_numeric_and_falls_back_to_position() {
        assert_eq!(device_index(&CameraIndex::Index(3), 0), 3);
        assert_eq!(device_index(&CameraIndex::String("2".to_string()), 0), 2);
        let named = CameraIndex::String("0x14200000046d0825".to_string());
        assert_eq!(device_index(&named, 1), 1);
    }

    #[test]
    fn test_release_twice_is_noop() {
        let (mut cam, closes) = source(vec![]);
        cam.release();
        cam.release();
        assert!(cam.is_released());
        assert_eq!(closes.get(), 1);
        drop(cam);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let (cam, closes) = source(vec![]);
        drop(cam);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_read_after_release_is_a_miss() {
        let (mut cam, _) = source(vec![]);
        cam.release();
        assert_eq!(cam.read_frame().unwrap_err(), CaptureMiss::Released);
        assert_eq!(cam.resolution(), None);
    }

    #[test]
    fn test_zero_sized_frame_becomes_miss() {
        let empty = Frame {
            width: 0,
            height: 0,
            layout: PixelLayout::Rgb,
            data: vec![],
        };
        let (mut cam, _) = source(vec![Ok(empty)]);
        assert_eq!(cam.read_frame().unwrap_err(), CaptureMiss::EmptyFrame);
    }

    #[test]
    fn test_camera_info_display() {
        let info = CameraInfo {
            index: 0,
            name: "USB Microscope".to_string(),
            description: "v4l2".to_string(),
        };
        assert_eq!(format!("{}", info), "[0] USB Microscope (v4l2)");
    }
}
