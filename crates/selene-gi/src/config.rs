use selene_core::{Result, SeleneError};

/// Quality presets trading probe density against cascade reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiQuality {
    /// 4 cascades, 8px probe stride
    Low,
    /// 6 cascades, 4px probe stride (default)
    Medium,
    /// 6 cascades, 2px probe stride
    High,
}

impl GiQuality {
    pub fn cascade_count(&self) -> u32 {
        match self {
            GiQuality::Low => 4,
            GiQuality::Medium | GiQuality::High => 6,
        }
    }

    pub fn base_stride(&self) -> u32 {
        match self {
            GiQuality::Low => 8,
            GiQuality::Medium => 4,
            GiQuality::High => 2,
        }
    }
}

impl Default for GiQuality {
    fn default() -> Self {
        GiQuality::Medium
    }
}

/// Configuration for the radiance-cascades GI subsystem.
#[derive(Debug, Clone)]
pub struct GiConfig {
    /// Number of cascades `N`.
    pub cascade_count: u32,
    /// Base ray interval length `L` in world units; cascade 0 marches `[0, 4L)`.
    pub base_interval: f32,
    /// Fraction of the previous cascade's length marched past the band end to
    /// hide seams between cascades.
    pub overlap_fraction: f32,
    /// Probe stride in screen pixels at cascade 0; doubles per cascade.
    pub base_stride: u32,
    /// Directional tile edge at cascade 0; doubles per cascade.
    pub base_tile: u32,
    /// Cap on depth pyramid mip levels.
    pub max_pyramid_levels: u32,
    /// History weight of the temporal blend; 0 disables accumulation.
    pub temporal_blend: f32,
    /// World-space distance beyond which a reprojected history sample is
    /// treated as disoccluded and discarded.
    pub reprojection_tolerance: f32,
    /// Frame-slot count `F` (frames in flight).
    pub frames_in_flight: u32,
    /// Radiance written on ray miss before the coarser cascade fills in.
    pub ambient: f32,
    /// Overall output multiplier.
    pub gi_intensity: f32,
}

impl Default for GiConfig {
    fn default() -> Self {
        Self {
            cascade_count: 6,
            base_interval: 0.25,
            overlap_fraction: 0.15,
            base_stride: 4,
            base_tile: 4,
            max_pyramid_levels: 12,
            temporal_blend: 0.9,
            reprojection_tolerance: 0.1,
            frames_in_flight: 3,
            ambient: 0.0,
            gi_intensity: 1.0,
        }
    }
}

impl GiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(mut self, quality: GiQuality) -> Self {
        self.cascade_count = quality.cascade_count();
        self.base_stride = quality.base_stride();
        self
    }

    pub fn with_cascade_count(mut self, count: u32) -> Self {
        self.cascade_count = count;
        self
    }

    pub fn with_base_interval(mut self, interval: f32) -> Self {
        self.base_interval = interval;
        self
    }

    pub fn with_overlap_fraction(mut self, fraction: f32) -> Self {
        self.overlap_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_temporal_blend(mut self, blend: f32) -> Self {
        self.temporal_blend = blend.clamp(0.0, 1.0);
        self
    }

    pub fn with_gi_intensity(mut self, intensity: f32) -> Self {
        self.gi_intensity = intensity.max(0.0);
        self
    }

    pub fn with_ambient(mut self, ambient: f32) -> Self {
        self.ambient = ambient.max(0.0);
        self
    }

    /// Checked once at subsystem construction; per-frame code assumes a valid
    /// configuration.
    pub fn validate(&self) -> Result<()> {
        if self.cascade_count == 0 {
            return Err(SeleneError::InvalidConfiguration(
                "cascade_count must be at least 1".into(),
            ));
        }
        if !(self.base_interval > 0.0) {
            return Err(SeleneError::InvalidConfiguration(format!(
                "base_interval must be positive, got {}",
                self.base_interval
            )));
        }
        if self.base_stride == 0 || self.base_tile == 0 {
            return Err(SeleneError::InvalidConfiguration(
                "base_stride and base_tile must be at least 1".into(),
            ));
        }
        if self.max_pyramid_levels == 0 {
            return Err(SeleneError::InvalidConfiguration(
                "max_pyramid_levels must be at least 1".into(),
            ));
        }
        if self.frames_in_flight < 2 {
            return Err(SeleneError::InvalidConfiguration(
                "frames_in_flight must be at least 2: the resolver reads the previous slot's output as history".into(),
            ));
        }
        Ok(())
    }
}
