//! Heads-up display drawn on top of the rendered scene.

use crate::{
    interaction::{to_canvas, CanvasSize, Region},
    landmarks::{hand, LandmarkSet},
    quiz::{banner_region, choice_regions, Feedback, QuizState},
    utils::safe_cast::{f32_to_i32_clamp, to_pixel},
    Result,
};
use opencv::{
    core::{self, Mat, Point, Rect, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8, LINE_AA},
    prelude::*,
};
use std::time::Instant;

const WHITE: (f64, f64, f64) = (255.0, 255.0, 255.0);
const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);
const GREEN: (f64, f64, f64) = (0.0, 255.0, 0.0);
const RED: (f64, f64, f64) = (0.0, 0.0, 255.0);

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

/// Hershey fonts only cover ASCII; fold Turkish letters to their base form
fn hershey_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ç' => 'c',
            'Ç' => 'C',
            'ğ' => 'g',
            'Ğ' => 'G',
            'ı' => 'i',
            'İ' => 'I',
            'ö' => 'o',
            'Ö' => 'O',
            'ş' => 's',
            'Ş' => 'S',
            'ü' => 'u',
            'Ü' => 'U',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

fn to_rect(region: &Region) -> Rect {
    let origin = to_pixel(region.x, region.y);
    Rect::new(
        origin.x,
        origin.y,
        f32_to_i32_clamp(region.width.round(), 0, i32::MAX),
        f32_to_i32_clamp(region.height.round(), 0, i32::MAX),
    )
}

/// Stroke sizes for the hand skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandStyle {
    pub connector_thickness: i32,
    pub joint_radius: i32,
    pub pointer_radius: i32,
    /// Mark the other fingertips as well as the pointer
    pub mark_fingertips: bool,
}

impl HandStyle {
    /// Thin skeleton used next to the model buttons
    pub const BUTTONS: Self = Self {
        connector_thickness: 5,
        joint_radius: 0,
        pointer_radius: 10,
        mark_fingertips: true,
    };

    /// Bold skeleton that stays visible over the quiz boxes
    pub const QUIZ: Self = Self {
        connector_thickness: 20,
        joint_radius: 10,
        pointer_radius: 20,
        mark_fingertips: false,
    };
}

/// Part of `rect` inside the canvas, if any
fn clip_to_canvas(rect: Rect, canvas: &Mat) -> Option<Rect> {
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = rect.x.saturating_add(rect.width).min(canvas.cols());
    let y1 = rect.y.saturating_add(rect.height).min(canvas.rows());
    (x1 > x0 && y1 > y0).then(|| Rect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Fill `region` with `color` blended at `alpha` over the canvas
///
/// # Errors
///
/// Returns an error if an `OpenCV` call fails
pub fn translucent_box(canvas: &mut Mat, region: &Region, color: Scalar, alpha: f64) -> Result<()> {
    let Some(rect) = clip_to_canvas(to_rect(region), canvas) else {
        return Ok(());
    };
    let mut roi = canvas.roi_mut(rect)?;
    let base = roi.try_clone()?;
    let fill = Mat::new_rows_cols_with_default(rect.height, rect.width, base.typ(), color)?;
    core::add_weighted(&fill, alpha, &base, 1.0 - alpha, 0.0, &mut roi, -1)?;
    Ok(())
}

/// Draw `text` centred in `region`
///
/// # Errors
///
/// Returns an error if an `OpenCV` call fails
pub fn centered_text(canvas: &mut Mat, text: &str, region: &Region, scale: f64, color: Scalar) -> Result<()> {
    let text = hershey_text(text);
    let thickness = 2;
    let mut baseline = 0;
    let size = imgproc::get_text_size(&text, FONT_HERSHEY_SIMPLEX, scale, thickness, &mut baseline)?;
    let center = region.center();
    let origin = Point::new(
        f32_to_i32_clamp(center.x, i32::MIN, i32::MAX) - size.width / 2,
        f32_to_i32_clamp(center.y, i32::MIN, i32::MAX) + size.height / 2,
    );
    imgproc::put_text(canvas, &text, origin, FONT_HERSHEY_SIMPLEX, scale, color, thickness, LINE_AA, false)?;
    Ok(())
}

/// Draw a status line with a dark outline so it reads on any background
///
/// # Errors
///
/// Returns an error if an `OpenCV` call fails
pub fn label(canvas: &mut Mat, text: &str, origin: Point) -> Result<()> {
    let text = hershey_text(text);
    imgproc::put_text(canvas, &text, origin, FONT_HERSHEY_SIMPLEX, 0.8, bgr(BLACK), 4, LINE_AA, false)?;
    imgproc::put_text(canvas, &text, origin, FONT_HERSHEY_SIMPLEX, 0.8, bgr(WHITE), 2, LINE_AA, false)?;
    Ok(())
}

/// Draw a clickable button
///
/// # Errors
///
/// Returns an error if an `OpenCV` call fails
pub fn button(canvas: &mut Mat, region: &Region, text: &str, armed: bool) -> Result<()> {
    let fill = if armed { bgr(GREEN) } else { bgr(WHITE) };
    translucent_box(canvas, region, fill, 0.7)?;
    imgproc::rectangle(canvas, to_rect(region), bgr(BLACK), 2, LINE_8, 0)?;
    centered_text(canvas, text, region, 0.9, bgr(BLACK))
}

/// Draw one hand's skeleton in display coordinates
///
/// # Errors
///
/// Returns an error if an `OpenCV` call fails
pub fn hand_skeleton(
    canvas: &mut Mat,
    landmarks: &LandmarkSet,
    size: CanvasSize,
    mirrored: bool,
    style: HandStyle,
) -> Result<()> {
    let pixel = |index: usize| {
        landmarks.get(index).map(|lm| {
            let p = to_canvas(lm.x, lm.y, size, mirrored);
            to_pixel(p.x, p.y)
        })
    };

    for &(a, b) in &hand::CONNECTIONS {
        if let (Some(pa), Some(pb)) = (pixel(a), pixel(b)) {
            imgproc::line(canvas, pa, pb, bgr(GREEN), style.connector_thickness, LINE_AA, 0)?;
        }
    }

    if style.joint_radius > 0 {
        for index in 0..landmarks.len() {
            if let Some(p) = pixel(index) {
                imgproc::circle(canvas, p, style.joint_radius, bgr(GREEN), -1, LINE_AA, 0)?;
            }
        }
    }

    if style.mark_fingertips {
        for &index in &hand::OTHER_FINGERTIPS {
            if let Some(p) = pixel(index) {
                imgproc::circle(canvas, p, style.pointer_radius, bgr(GREEN), -1, LINE_AA, 0)?;
            }
        }
    }

    if let Some(p) = pixel(hand::INDEX_FINGER_TIP) {
        imgproc::circle(canvas, p, style.pointer_radius, bgr(RED), -1, LINE_AA, 0)?;
    }
    Ok(())
}

/// Draw the quiz banner, choices, score and feedback
///
/// # Errors
///
/// Returns an error if an `OpenCV` call fails
pub fn quiz(canvas: &mut Mat, state: &QuizState, size: CanvasSize, now: Instant) -> Result<()> {
    let banner = banner_region(size);
    translucent_box(canvas, &banner, bgr(BLACK), 0.4)?;
    centered_text(canvas, &state.question().text, &banner, 0.9, bgr(WHITE))?;

    for (region, index) in choice_regions(size) {
        translucent_box(canvas, &region, bgr(WHITE), 0.9)?;
        centered_text(canvas, &state.question().choices[index], &region, 1.0, bgr(BLACK))?;
    }

    label(canvas, &format!("Score: {}", state.score()), Point::new(20, 40))?;

    if let Some(feedback) = state.feedback(now) {
        let color = match feedback {
            Feedback::Correct => bgr(GREEN),
            Feedback::Incorrect => bgr(RED),
        };
        let center = Region::new(0.0, 0.0, size.width, size.height);
        centered_text(canvas, feedback.label(), &center, 2.5, color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use crate::quiz::{QuizQuestion, QuizTimings};
    use opencv::core::{Vec3b, CV_8UC3};

    fn canvas() -> Mat {
        Mat::new_rows_cols_with_default(720, 1280, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_hershey_text_folds_turkish() {
        assert_eq!(hershey_text("Doğru! Yanlış! Şçİ"), "Dogru! Yanlis! ScI");
        assert_eq!(hershey_text("5 €"), "5 ?");
    }

    #[test]
    fn test_translucent_box_blends() {
        let mut mat = canvas();
        let region = Region::new(10.0, 10.0, 20.0, 20.0);
        translucent_box(&mut mat, &region, Scalar::all(200.0), 0.5).unwrap();
        let inside = *mat.at_2d::<Vec3b>(20, 20).unwrap();
        let outside = *mat.at_2d::<Vec3b>(100, 100).unwrap();
        assert_eq!(inside[0], 100);
        assert_eq!(outside[0], 0);
    }

    #[test]
    fn test_translucent_box_clips_to_canvas() {
        let mut mat = canvas();
        let corner = Region::new(1270.0, 710.0, 50.0, 50.0);
        translucent_box(&mut mat, &corner, Scalar::all(200.0), 0.5).unwrap();
        assert_eq!(mat.at_2d::<Vec3b>(719, 1279).unwrap()[0], 100);
        assert_eq!(mat.at_2d::<Vec3b>(700, 1260).unwrap()[0], 0);

        let outside = Region::new(-100.0, -100.0, 50.0, 50.0);
        translucent_box(&mut mat, &outside, Scalar::all(200.0), 0.5).unwrap();
        assert_eq!(mat.at_2d::<Vec3b>(0, 0).unwrap()[0], 0);
    }

    #[test]
    fn test_hand_skeleton_marks_pointer() {
        let mut mat = canvas();
        let points = (0..21).map(|_| Landmark::new(0.25, 0.5, 0.0)).collect();
        let hand = LandmarkSet::new(points);
        hand_skeleton(&mut mat, &hand, CanvasSize::new(1280.0, 720.0), true, HandStyle::BUTTONS).unwrap();
        // mirrored: x = 1280 - 0.25 * 1280 = 960
        let pointer = *mat.at_2d::<Vec3b>(360, 960).unwrap();
        assert_eq!(pointer[2], 255);
        assert_eq!(pointer[1], 0);
    }

    #[test]
    fn test_quiz_draws_without_error() {
        let mut mat = canvas();
        let question = QuizQuestion {
            text: "Is this a test?".to_string(),
            choices: ["Yes".to_string(), "No".to_string()],
            correct_index: 0,
        };
        let now = Instant::now();
        let mut state = QuizState::new(question, QuizTimings::default());
        state.select(0, now);
        quiz(&mut mat, &state, CanvasSize::new(1280.0, 720.0), now).unwrap();
    }
}
