use shadebench_common::CameraMovement;

/// A high-level action produced by one input poll.
///
/// The render loop consumes actions, never raw window events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move the camera one step along a basis direction.
    Move(CameraMovement),
    /// Mouse-look offset; positive `dy` looks up.
    Look { dx: f32, dy: f32 },
    /// Scroll-wheel offset; positive zooms in.
    Zoom(f32),
    /// Leave the render loop.
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_compare_by_value() {
        assert_eq!(
            Action::Move(CameraMovement::Forward),
            Action::Move(CameraMovement::Forward)
        );
        assert_ne!(Action::Zoom(1.0), Action::Zoom(-1.0));
        assert!(matches!(Action::Look { dx: 1.0, dy: 0.0 }, Action::Look { .. }));
    }
}
