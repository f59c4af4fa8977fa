use std::path::Path;

use image::GrayImage;
use tracing::warn;

use crate::error::{FaceIdError, Result};

/// Scores how sharp an image is, in `[min, max]`.
///
/// One score is computed per image and shared by every face found in it.
/// Implementations never fail: unreadable input maps to a fallback score.
pub trait ClarityScorer: Send + Sync {
    fn clarity(&self, path: &Path) -> f32;
}

/// Tuning for [`LaplacianClarity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClarityConfig {
    /// Laplacian variance that maps to a score of 1.0. Default: 1500.
    pub scale: f64,

    /// Lower clamp so blurry images still carry some weight. Default: 0.05.
    pub min: f32,

    /// Upper clamp. Default: 1.0.
    pub max: f32,

    /// Score used when the image cannot be decoded. Default: 0.3.
    pub fallback: f32,
}

impl Default for ClarityConfig {
    fn default() -> Self {
        Self {
            scale: 1500.0,
            min: 0.05,
            max: 1.0,
            fallback: 0.3,
        }
    }
}

impl ClarityConfig {
    /// Replaces zero fields with their defaults.
    pub fn with_defaults(mut self) -> Self {
        let d = Self::default();
        if self.scale == 0.0 {
            self.scale = d.scale;
        }
        if self.min == 0.0 {
            self.min = d.min;
        }
        if self.max == 0.0 {
            self.max = d.max;
        }
        if self.fallback == 0.0 {
            self.fallback = d.fallback;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(FaceIdError::InvalidConfig(format!(
                "clarity scale must be positive, got {}",
                self.scale
            )));
        }
        if !(0.0 < self.min && self.min <= self.max && self.max <= 1.0) {
            return Err(FaceIdError::InvalidConfig(format!(
                "clarity bounds must satisfy 0 < min <= max <= 1, got [{}, {}]",
                self.min, self.max
            )));
        }
        if !(self.min..=self.max).contains(&self.fallback) {
            return Err(FaceIdError::InvalidConfig(format!(
                "clarity fallback {} outside [{}, {}]",
                self.fallback, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Maps a raw Laplacian variance onto the clamped score range.
    pub fn score(&self, variance: f64) -> f32 {
        let scaled = (variance / self.scale) as f32;
        scaled.min(self.max).max(self.min)
    }
}

/// Focus measure based on the variance of the 4-neighbour Laplacian.
#[derive(Debug, Clone, Default)]
pub struct LaplacianClarity {
    cfg: ClarityConfig,
}

impl LaplacianClarity {
    pub fn new(cfg: ClarityConfig) -> Self {
        Self {
            cfg: cfg.with_defaults(),
        }
    }

    pub fn config(&self) -> &ClarityConfig {
        &self.cfg
    }

    /// Scores an already decoded grayscale image.
    pub fn score_image(&self, img: &GrayImage) -> f32 {
        match laplacian_variance(img) {
            Some(v) => self.cfg.score(v),
            None => self.cfg.fallback,
        }
    }
}

impl ClarityScorer for LaplacianClarity {
    fn clarity(&self, path: &Path) -> f32 {
        match image::open(path) {
            Ok(img) => self.score_image(&img.to_luma8()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "decode failed, using fallback clarity");
                self.cfg.fallback
            }
        }
    }
}

/// Population variance of the Laplacian response
/// `[[0, 1, 0], [1, -4, 1], [0, 1, 0]]` over every pixel.
///
/// Borders reflect without repeating the edge pixel (`dcb|abcd|cba`).
/// Returns `None` for an empty image.
pub fn laplacian_variance(img: &GrayImage) -> Option<f64> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    if w == 0 || h == 0 {
        return None;
    }
    let raw = img.as_raw();
    let px = |x: isize, y: isize| -> f64 {
        let xi = reflect101(x, w);
        let yi = reflect101(y, h);
        raw[yi * w + xi] as f64
    };

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in 0..h as isize {
        for x in 0..w as isize {
            let resp = px(x - 1, y) + px(x + 1, y) + px(x, y - 1) + px(x, y + 1) - 4.0 * px(x, y);
            sum += resp;
            sum_sq += resp * resp;
        }
    }
    let n = (w * h) as f64;
    let mean = sum / n;
    Some((sum_sq / n - mean * mean).max(0.0))
}

fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i > last {
        i = 2 * last - i;
    }
    i as usize
}
