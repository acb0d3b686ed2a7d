use glam::Mat4;

/// Camera data the GI passes consume each frame.
///
/// `prev_view_proj` is the *previous* frame's combined matrix and is what the
/// resolver reprojects with; the caller is responsible for latching it before
/// updating the camera for the current frame.
#[derive(Clone, Copy, Debug)]
pub struct CameraState {
    pub view: Mat4,
    pub proj: Mat4,
    pub prev_view_proj: Mat4,
    pub near: f32,
    pub far: f32,
}

impl CameraState {
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            prev_view_proj: Mat4::IDENTITY,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4Swizzles};

    #[test]
    fn view_proj_composes_in_projection_major_order() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let cam = CameraState {
            view,
            proj,
            ..Default::default()
        };
        let clip = cam.view_proj() * Vec3::ZERO.extend(1.0);
        // A point 5 units in front of the camera projects to screen centre.
        assert!(clip.xy().length() < 1e-5);
        assert!(clip.w > 0.0);
    }
}
