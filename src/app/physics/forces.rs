use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

#[derive(Clone, Copy)]
pub(super) struct LinkParams {
    pub(super) distance: f32,
    pub(super) alpha: f32,
}

/// Spring relaxation along every link. Each endpoint's share of the
/// correction is weighted by degree so hubs move less than leaves.
pub(super) fn accumulate_link_forces(
    links: &[(usize, usize)],
    predicted: &[Vec2],
    degrees: &[usize],
    radii: &[f32],
    params: LinkParams,
    deltas: &mut [Vec2],
) {
    for &(source, target) in links {
        let delta = predicted[target] - predicted[source];
        if !delta.is_finite() {
            continue;
        }
        let distance = delta.length();
        if distance <= 0.0001 {
            continue;
        }

        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        let strength = 1.0 / source_degree.min(target_degree);
        let bias = source_degree / (source_degree + target_degree);

        let preferred = params.distance + radii[source] + radii[target];
        let correction = delta * ((distance - preferred) / distance * params.alpha * strength);
        if !correction.is_finite() {
            continue;
        }

        deltas[target] -= correction * bias;
        deltas[source] += correction * (1.0 - bias);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) collision_strength: f32,
    pub(super) max_collision_distance_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    if min_distance.is_nan() || min_distance <= 0.0 {
        return;
    }

    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }

    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        let angle =
            ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    };

    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let from_share = to_sq / (from_sq + to_sq);
    let overlap_push = (min_distance - distance) * params.collision_strength;

    deltas[from] += direction * (overlap_push * from_share);
    deltas[to] -= direction * (overlap_push * (1.0 - from_share));
}

/// Walks every pair of cells close enough to hold overlapping circles and
/// pushes overlapping pairs apart, lighter circles further.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_collision_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                for j in (i + 1)..node_a.indices.len() {
                    collide_pair(
                        node_a.indices[i],
                        node_a.indices[j],
                        positions,
                        radii,
                        params,
                        deltas,
                    );
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, positions, radii, params, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, deltas);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, deltas,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, deltas);
        }
    }
}

/// Uniform translation moving the centroid of the finite positions
/// `strength` of the way to `center`.
pub(super) fn centering_shift(positions: &[Vec2], center: Vec2, strength: f32) -> Vec2 {
    let mut centroid = Vec2::ZERO;
    let mut count = 0usize;
    for position in positions.iter().filter(|position| position.is_finite()) {
        centroid += *position;
        count += 1;
    }

    if count == 0 {
        return Vec2::ZERO;
    }
    (center - centroid / count as f32) * strength
}
