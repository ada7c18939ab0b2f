//! Heuristic image explanation: a synthetic radial heatmap per segment.
//!
//! A visual placeholder for when the backend's attention maps are
//! unavailable. Centers are deterministic per segment index; the scattered
//! points are random on every call.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::Rng;

use crate::models::explanation::{
    mean_confidence, ExplanationSource, HeatPoint, ImageExplanation, ImageMapping, MappingMethod,
};
use crate::models::segment::Segment;

const POINTS_PER_SEGMENT: usize = 24;
/// Heat radius as a fraction of the canvas width.
const RADIUS_FRACTION: f64 = 0.15;
/// Centers fall inside the middle 60% of each axis.
const CENTER_MARGIN: f64 = 0.2;
const CENTER_SPAN: f64 = 0.6;

pub fn approximate_image_explanation<R: Rng>(
    segments: &[Segment],
    width: u32,
    height: u32,
    rng: &mut R,
) -> ImageExplanation {
    let (w, h) = (width as f64, height as f64);
    let radius = w * RADIUS_FRACTION;

    let mappings: Vec<ImageMapping> = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let (cx, cy) = pseudo_center(index, w, h);
            let importance = segment.importance().clamp(0.0, 1.0);

            let points = (0..POINTS_PER_SEGMENT)
                .map(|_| {
                    let angle = rng.gen::<f64>() * TAU;
                    let distance = rng.gen::<f64>() * radius;
                    let falloff = if radius > 0.0 {
                        1.0 - distance / radius
                    } else {
                        1.0
                    };
                    HeatPoint {
                        x: (cx + distance * angle.cos()).clamp(0.0, w),
                        y: (cy + distance * angle.sin()).clamp(0.0, h),
                        intensity: (falloff * importance).clamp(0.0, 1.0),
                    }
                })
                .collect();

            ImageMapping {
                segment_id: segment.id.clone(),
                center: (cx, cy),
                points,
                confidence: (0.5 + 0.4 * importance).min(0.95),
                method: MappingMethod::RadialHeatmap,
            }
        })
        .collect();

    let contributions = segment_contributions(segments);
    ImageExplanation {
        width,
        height,
        attention_summary: attention_summary(segments, &contributions),
        segment_contributions: contributions,
        overall_confidence: mean_confidence(mappings.iter().map(|m| m.confidence)),
        mappings,
        source: ExplanationSource::Heuristic,
        fallback_reason: None,
    }
}

/// Spreads successive indices over the canvas with two independent
/// irrational strides.
fn pseudo_center(index: usize, width: f64, height: f64) -> (f64, f64) {
    let i = index as f64;
    let fx = (i * 0.618_034 + 0.13).fract();
    let fy = (i * 0.414_214 + 0.29).fract();
    (
        width * (CENTER_MARGIN + CENTER_SPAN * fx),
        height * (CENTER_MARGIN + CENTER_SPAN * fy),
    )
}

/// Each segment's share of `importance * confidence`. Equal split when every
/// weight is zero.
pub fn segment_contributions(segments: &[Segment]) -> HashMap<String, f64> {
    if segments.is_empty() {
        return HashMap::new();
    }

    let weight = |s: &Segment| s.importance() * s.metadata.confidence.unwrap_or(0.5);
    let total: f64 = segments.iter().map(weight).sum();

    segments
        .iter()
        .map(|s| {
            let share = if total > 0.0 {
                weight(s) / total
            } else {
                1.0 / segments.len() as f64
            };
            (s.id.clone(), (share * 1000.0).round() / 1000.0)
        })
        .collect()
}

/// Names the most influential segment and up to two runners-up above 10%.
pub fn attention_summary(segments: &[Segment], contributions: &HashMap<String, f64>) -> String {
    let share = |s: &Segment| contributions.get(&s.id).copied().unwrap_or(0.0);

    let mut ranked: Vec<&Segment> = segments.iter().collect();
    ranked.sort_by(|a, b| share(*b).total_cmp(&share(*a)));

    let Some(&top) = ranked.first() else {
        return "No segments provided for analysis.".to_string();
    };

    let mut parts = vec![format!(
        "The most influential part of your prompt is '{}' (category: {}), contributing approximately {:.1}% to the image.",
        top.text,
        top.category().as_str(),
        share(top) * 100.0
    )];
    for &segment in ranked.iter().skip(1).take(2) {
        let contribution = share(segment);
        if contribution > 0.1 {
            parts.push(format!(
                "'{}' also influences the result with a {:.1}% contribution.",
                segment.text,
                contribution * 100.0
            ));
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::segment::{Category, SegmentMetadata, SegmentType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seg(id: &str, text: &str, importance: f64, confidence: Option<f64>) -> Segment {
        Segment {
            id: id.to_string(),
            text: text.to_string(),
            segment_type: SegmentType::Keyword,
            start_index: 0,
            end_index: text.chars().count(),
            metadata: SegmentMetadata {
                category: Category::Subject,
                importance,
                confidence,
                color: Category::Subject.color().to_string(),
            },
        }
    }

    fn segments() -> Vec<Segment> {
        vec![
            seg("a", "a girl", 0.9, Some(0.8)),
            seg("b", "neon umbrella", 0.6, Some(0.5)),
            seg("c", "rain", 0.3, None),
        ]
    }

    #[test]
    fn test_points_stay_inside_canvas_with_bounded_intensity() {
        let mut rng = StdRng::seed_from_u64(1);
        let explanation = approximate_image_explanation(&segments(), 512, 384, &mut rng);
        assert_eq!(explanation.mappings.len(), 3);
        for (mapping, segment) in explanation.mappings.iter().zip(segments()) {
            assert_eq!(mapping.points.len(), POINTS_PER_SEGMENT);
            assert_eq!(mapping.method, MappingMethod::RadialHeatmap);
            assert!((0.0..=1.0).contains(&mapping.confidence));
            for p in &mapping.points {
                assert!((0.0..=512.0).contains(&p.x));
                assert!((0.0..=384.0).contains(&p.y));
                assert!(p.intensity >= 0.0 && p.intensity <= segment.importance());
            }
        }
    }

    #[test]
    fn test_centers_are_deterministic_and_central() {
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(99);
        let a = approximate_image_explanation(&segments(), 500, 500, &mut rng_a);
        let b = approximate_image_explanation(&segments(), 500, 500, &mut rng_b);
        for (ma, mb) in a.mappings.iter().zip(&b.mappings) {
            assert_eq!(ma.center, mb.center);
            assert!((100.0..=400.0).contains(&ma.center.0));
            assert!((100.0..=400.0).contains(&ma.center.1));
        }
        assert_ne!(a.mappings[0].points, b.mappings[0].points);
    }

    #[test]
    fn test_overall_confidence_is_mean() {
        let mut rng = StdRng::seed_from_u64(3);
        let explanation = approximate_image_explanation(&segments(), 256, 256, &mut rng);
        let expected = (0.86 + 0.74 + 0.62) / 3.0;
        assert!((explanation.overall_confidence - expected).abs() < 1e-9);
        assert_eq!(explanation.source, ExplanationSource::Heuristic);
    }

    #[test]
    fn test_no_segments() {
        let mut rng = StdRng::seed_from_u64(3);
        let explanation = approximate_image_explanation(&[], 256, 256, &mut rng);
        assert!(explanation.mappings.is_empty());
        assert_eq!(explanation.overall_confidence, 0.0);
        assert_eq!(explanation.attention_summary, "No segments provided for analysis.");
    }

    #[test]
    fn test_contributions_share_weights() {
        let contributions = segment_contributions(&segments());
        // weights 0.72, 0.30, 0.15 of 1.17
        assert_eq!(contributions["a"], 0.615);
        assert_eq!(contributions["b"], 0.256);
        assert_eq!(contributions["c"], 0.128);
    }

    #[test]
    fn test_zero_weights_split_equally() {
        let segments = vec![seg("a", "x", 0.0, Some(0.9)), seg("b", "y", 0.0, None)];
        let contributions = segment_contributions(&segments);
        assert_eq!(contributions["a"], 0.5);
        assert_eq!(contributions["b"], 0.5);
    }

    #[test]
    fn test_attention_summary_names_top_segments() {
        let contributions = segment_contributions(&segments());
        let summary = attention_summary(&segments(), &contributions);
        assert!(summary.starts_with("The most influential part of your prompt is 'a girl'"));
        assert!(summary.contains("61.5%"));
        assert!(summary.contains("'neon umbrella' also influences"));
        assert!(summary.contains("'rain' also influences"));
    }
}
