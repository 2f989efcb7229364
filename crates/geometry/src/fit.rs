//! Fitting planar geometry into a canvas rectangle.
//!
//! The fit uses one uniform scale so routes are never distorted, centres the
//! scaled bounding box in the target and flips y (north up).

use poster_common::{BoundingBox, PlanarPoint, PosterError, PosterResult, Rect, Transform};

/// Transformed points plus the transform that produced them, so markers and
/// ticks can be placed without refitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub points: Vec<PlanarPoint>,
    pub transform: Transform,
}

fn check_rect(rect: &Rect) -> PosterResult<()> {
    let finite = [rect.x, rect.y, rect.width, rect.height]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(PosterError::invalid_parameter(
            "target_rect",
            format!("non-finite rectangle {:?}", rect),
        ));
    }
    if rect.width < 0.0 || rect.height < 0.0 {
        return Err(PosterError::invalid_parameter(
            "target_rect",
            format!("negative size {}x{}", rect.width, rect.height),
        ));
    }
    Ok(())
}

/// Transform that fits `bbox` into `rect`.
///
/// Zero-extent axes are replaced by a minimum extent, so a vertical line is
/// scaled by its height and centred horizontally, and a single point lands
/// on the rectangle's centre.
pub fn fit_transform(bbox: &BoundingBox, rect: &Rect) -> PosterResult<Transform> {
    check_rect(rect)?;

    let scale = (rect.width / bbox.safe_width()).min(rect.height / bbox.safe_height());
    let (cx, cy) = rect.center();
    let center = bbox.center();
    Ok(Transform::new(
        scale,
        (cx - center.x * scale, cy + center.y * scale),
    ))
}

/// Fit `points` into `rect`. Empty input yields no points and a transform
/// that maps the origin to the rectangle's centre.
pub fn fit(points: &[PlanarPoint], rect: &Rect) -> PosterResult<FitResult> {
    check_rect(rect)?;

    let transform = match BoundingBox::from_points(points) {
        Some(bbox) => fit_transform(&bbox, rect)?,
        None => Transform::new(1.0, rect.center()),
    };

    Ok(FitResult {
        points: transform.apply_all(points),
        transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiting_axis_sets_scale() {
        let pts = [PlanarPoint::new(0.0, 0.0), PlanarPoint::new(200.0, 100.0)];
        let fitted = fit(&pts, &Rect::new(0.0, 0.0, 300.0, 300.0)).unwrap();
        assert_eq!(fitted.transform.scale, 1.5);
        // 300x150 centred vertically, y flipped.
        assert_eq!(fitted.points[0], PlanarPoint::new(0.0, 225.0));
        assert_eq!(fitted.points[1], PlanarPoint::new(300.0, 75.0));
    }

    #[test]
    fn test_single_point_lands_on_centre() {
        let pts = [PlanarPoint::new(4.0, -2.0)];
        let fitted = fit(&pts, &Rect::new(10.0, 20.0, 100.0, 50.0)).unwrap();
        assert!((fitted.points[0].x - 60.0).abs() < 1e-6);
        assert!((fitted.points[0].y - 45.0).abs() < 1e-6);
        assert!(fitted.transform.scale.is_finite());
    }

    #[test]
    fn test_vertical_line_centred_horizontally() {
        let pts = [PlanarPoint::new(3.0, 0.0), PlanarPoint::new(3.0, 10.0)];
        let fitted = fit(&pts, &Rect::new(0.0, 0.0, 100.0, 200.0)).unwrap();
        assert_eq!(fitted.transform.scale, 20.0);
        assert!(fitted.points.iter().all(|p| (p.x - 50.0).abs() < 1e-9));
        assert_eq!(fitted.points[0].y, 200.0);
        assert_eq!(fitted.points[1].y, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let fitted = fit(&[], &Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert!(fitted.points.is_empty());
        assert_eq!(fitted.transform.apply(PlanarPoint::new(0.0, 0.0)), PlanarPoint::new(5.0, 5.0));
    }

    #[test]
    fn test_rejects_negative_or_non_finite_rect() {
        let pts = [PlanarPoint::new(0.0, 0.0), PlanarPoint::new(1.0, 1.0)];
        assert!(matches!(
            fit(&pts, &Rect::new(0.0, 0.0, -1.0, 10.0)),
            Err(PosterError::InvalidParameter { .. })
        ));
        assert!(fit(&pts, &Rect::new(0.0, 0.0, f64::INFINITY, 10.0)).is_err());
        assert!(fit(&pts, &Rect::new(0.0, 0.0, 0.0, 0.0)).is_ok());
    }
}
