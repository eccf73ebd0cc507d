//! Collision relaxation in the stacking/jitter plane.
//!
//! Overlapping spheres are pushed apart along (y, z) only; x carries the depth reading of the
//! tree and is never touched. After each pass every free body springs part of the way back to
//! its anchor so the result stays tied to the tree shape.

use super::RelaxOptions;
use super::hash::pair_direction;
use crate::graph::{Bucket, Position};
use nalgebra::Vector2;

/// Distances and plane vectors shorter than this count as zero.
const EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: String,
    pub bucket: Bucket,
    pub radius: f64,
    /// Pinned bodies (the center) take part in overlap tests but never move.
    pub pinned: bool,
    pub anchor: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxOutcome {
    pub positions: Vec<Position>,
    pub iterations: usize,
    /// `true` when the last pass found no overlapping pair.
    pub converged: bool,
}

pub fn relax(bodies: &[Body], opts: &RelaxOptions) -> RelaxOutcome {
    let mut positions: Vec<Position> = bodies.iter().map(|b| b.anchor).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.iterations {
        iterations += 1;
        // Stop before springing back so a converged result is overlap-free.
        if !separate_pass(bodies, &mut positions, opts.padding) {
            converged = true;
            break;
        }
        spring_back(bodies, &mut positions, opts.spring_strength);
    }

    tracing::trace!(bodies = bodies.len(), iterations, converged, "relaxation finished");
    RelaxOutcome {
        positions,
        iterations,
        converged,
    }
}

/// Largest penetration depth (`minimum distance - distance`) over all pairs that are relaxed
/// against each other, or `0.0` when nothing overlaps.
pub fn max_overlap(bodies: &[Body], positions: &[Position], padding: f64) -> f64 {
    let mut worst: f64 = 0.0;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (a, b) = (&bodies[i], &bodies[j]);
            if (a.pinned && b.pinned) || !a.bucket.interacts_with(b.bucket) {
                continue;
            }
            let minimum = a.radius + b.radius + padding;
            worst = worst.max(minimum - positions[i].distance(&positions[j]));
        }
    }
    worst
}

/// One sweep over all eligible pairs. Returns whether any pair overlapped.
fn separate_pass(bodies: &[Body], positions: &mut [Position], padding: f64) -> bool {
    let mut overlapped = false;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (a, b) = (&bodies[i], &bodies[j]);
            if !a.bucket.interacts_with(b.bucket) {
                continue;
            }

            let (pa, pb) = (positions[i], positions[j]);
            let distance = pa.distance(&pb);
            let minimum = a.radius + b.radius + padding;
            if distance >= minimum {
                continue;
            }
            overlapped = true;

            let overlap = minimum - distance.max(EPSILON);
            let dir = push_direction(a, b, pa, pb);
            let step = dir * (overlap / 2.0);
            if !a.pinned {
                positions[i].y -= step.x;
                positions[i].z -= step.y;
            }
            if !b.pinned {
                positions[j].y += step.x;
                positions[j].z += step.y;
            }
        }
    }
    overlapped
}

/// Unit vector from `a` toward `b` in the (y, z) plane.
fn push_direction(a: &Body, b: &Body, pa: Position, pb: Position) -> Vector2<f64> {
    let delta = Vector2::new(pb.y - pa.y, pb.z - pa.z);
    let len = delta.norm();
    if len < EPSILON {
        pair_direction(&a.id, &b.id)
    } else {
        delta / len
    }
}

fn spring_back(bodies: &[Body], positions: &mut [Position], k: f64) {
    for (body, p) in bodies.iter().zip(positions.iter_mut()) {
        if body.pinned {
            continue;
        }
        p.y = p.y * (1.0 - k) + body.anchor.y * k;
        p.z = p.z * (1.0 - k) + body.anchor.z * k;
    }
}

#[cfg(test)]
mod tests {
    use super::{Body, max_overlap, relax};
    use crate::algo::RelaxOptions;
    use crate::graph::{Bucket, Position};

    fn body(id: &str, bucket: Bucket, anchor: Position) -> Body {
        Body {
            id: id.to_string(),
            bucket,
            radius: 0.45,
            pinned: false,
            anchor,
        }
    }

    #[test]
    fn separated_bodies_converge_on_the_first_pass() {
        let bodies = vec![
            body("a", Bucket::Left, Position::new(-10.0, 0.0, 0.0)),
            body("b", Bucket::Left, Position::new(-10.0, 5.0, 0.0)),
        ];
        let out = relax(&bodies, &RelaxOptions::default());
        assert!(out.converged);
        assert_eq!(out.iterations, 1);
        assert_eq!(out.positions[0], bodies[0].anchor);
        assert_eq!(out.positions[1], bodies[1].anchor);
    }

    #[test]
    fn different_side_buckets_never_interact() {
        let bodies = vec![
            body("l", Bucket::Left, Position::new(0.0, 0.0, 0.0)),
            body("r", Bucket::Right, Position::new(0.0, 0.0, 0.0)),
            body("o", Bucket::Other, Position::new(0.0, 0.0, 0.0)),
        ];
        let out = relax(&bodies, &RelaxOptions::default());
        assert!(out.converged);
        assert_eq!(max_overlap(&bodies, &out.positions, 0.35), 0.0);
        assert!(out.positions.iter().all(|p| *p == Position::ORIGIN));
    }

    #[test]
    fn coincident_bodies_separate_without_nan_and_keep_x() {
        let bodies = vec![
            body("a", Bucket::Right, Position::new(10.0, 0.0, 0.0)),
            body("b", Bucket::Right, Position::new(10.0, 0.0, 0.0)),
        ];
        let out = relax(&bodies, &RelaxOptions::default());
        for p in &out.positions {
            assert!(p.y.is_finite() && p.z.is_finite());
            assert_eq!(p.x, 10.0);
        }
        assert!(out.positions[0] != out.positions[1]);

        // Both anchors sit on the same spot, so the spring keeps pulling the pair back into a
        // shallow overlap and the budget runs out: 1.25 * (1 - 0.065) apart at the end.
        assert!(!out.converged);
        assert_eq!(out.iterations, 120);
        let residual = max_overlap(&bodies, &out.positions, 0.35);
        assert!(residual > 0.0 && residual < 0.1, "residual {residual}");
        assert!(residual < max_overlap(&bodies, &[bodies[0].anchor, bodies[1].anchor], 0.35));
    }

    #[test]
    fn pinned_body_never_moves_and_partner_moves_half_the_overlap() {
        let mut center = body("c", Bucket::Center, Position::ORIGIN);
        center.pinned = true;
        let other = body("n", Bucket::Other, Position::new(0.0, 0.5, 0.0));
        let bodies = vec![center, other];
        let out = relax(
            &bodies,
            &RelaxOptions {
                iterations: 1,
                spring_strength: 0.0,
                ..RelaxOptions::default()
            },
        );
        assert_eq!(out.positions[0], Position::ORIGIN);
        // minimum 1.25, distance 0.5 -> overlap 0.75, half of it applied to the free body.
        assert!((out.positions[1].y - 0.875).abs() < 1e-12);
        assert!(!out.converged);
    }

    #[test]
    fn zero_iterations_returns_anchors_unconverged() {
        let bodies = vec![
            body("a", Bucket::Left, Position::ORIGIN),
            body("b", Bucket::Left, Position::ORIGIN),
        ];
        let out = relax(
            &bodies,
            &RelaxOptions {
                iterations: 0,
                ..RelaxOptions::default()
            },
        );
        assert_eq!(out.iterations, 0);
        assert!(!out.converged);
        assert_eq!(out.positions, vec![Position::ORIGIN, Position::ORIGIN]);
    }
}
