// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

use std::cmp::Ordering;

const SAH_BUCKETS: usize = 12;
const DEFAULT_MAX_LEAF_SIZE: usize = 4;

/// How a node's primitives are divided between its two children.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SplitMethod {
    /// Sort by centroid along the widest axis and cut at the median.
    Naive,
    /// Bucketed surface area heuristic.
    Sah,
}

impl Default for SplitMethod {
    fn default() -> Self {
        SplitMethod::Sah
    }
}

#[derive(Clone)]
enum BVHNode {
    Leaf { bounds: AABB, start: usize, count: usize },
    Interior { bounds: AABB, left: usize, right: usize },
}

impl BVHNode {
    fn bounds(&self) -> &AABB {
        match self {
            BVHNode::Leaf { bounds, .. } => bounds,
            BVHNode::Interior { bounds, .. } => bounds,
        }
    }
}

/// Bounding volume hierarchy over primitive boxes. It never sees the
/// primitives themselves; hit tests are supplied by the caller per query.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    prim_bounds: Vec<AABB>,
    prim_centroids: Vec<Vector3f>,
    max_leaf_size: usize,
    split_method: SplitMethod,
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>, split_method: SplitMethod) -> Self {
        Self::with_max_leaf_size(prim_bounds, split_method, DEFAULT_MAX_LEAF_SIZE)
    }

    pub fn with_max_leaf_size(prim_bounds: Vec<AABB>,
                              split_method: SplitMethod,
                              max_leaf_size: usize) -> Self {
        let prim_centroids = prim_bounds.iter().map(|b| b.center()).collect();
        let mut bvh = Self {
            nodes: Vec::new(),
            indices: (0..prim_bounds.len()).collect(),
            prim_bounds,
            prim_centroids,
            max_leaf_size: max_leaf_size.max(1),
            split_method,
        };

        if !bvh.indices.is_empty() {
            bvh.build(0, bvh.indices.len());
        }
        log::debug!("BVH ({:?}): {} primitives, {} nodes",
                    bvh.split_method, bvh.indices.len(), bvh.nodes.len());

        bvh
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bounds(&self) -> AABB {
        self.nodes.first().map(|n| *n.bounds()).unwrap_or_default()
    }

    /// Closest hit. `hit_fn` tests one primitive against the (shrinking)
    /// ray and returns its payload with the hit distance.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut ray = *ray;
        let mut closest: Option<(usize, T)> = None;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds().ray_intersect(&ray) {
                continue;
            }

            match *node {
                BVHNode::Leaf { start, count, .. } => {
                    for &prim_idx in &self.indices[start..start + count] {
                        if let Some((hit, t)) = hit_fn(prim_idx, &ray) {
                            if ray.update(t) {
                                closest = Some((prim_idx, hit));
                            }
                        }
                    }
                }
                BVHNode::Interior { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        closest
    }

    /// Any hit; stops at the first primitive `hit_fn` accepts.
    pub fn ray_intersection_t<F>(&self, ray: &Ray3f, mut hit_fn: F) -> bool
    where
        F: FnMut(usize, &Ray3f) -> bool,
    {
        if self.nodes.is_empty() {
            return false;
        }

        let mut stack = vec![0usize];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds().ray_intersect(ray) {
                continue;
            }

            match *node {
                BVHNode::Leaf { start, count, .. } => {
                    if self.indices[start..start + count].iter().any(|&idx| hit_fn(idx, ray)) {
                        return true;
                    }
                }
                BVHNode::Interior { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        false
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        let (bounds, centroid_bounds) = self.compute_bounds(start, end);
        let count = end - start;
        let node_idx = self.nodes.len();
        self.nodes.push(BVHNode::Leaf { bounds, start, count });

        if count <= self.max_leaf_size {
            return node_idx;
        }

        let axis = centroid_bounds.max_extent();
        if centroid_bounds.diagonal()[axis] < 1e-6 {
            return node_idx;
        }

        let mid = match self.split_method {
            SplitMethod::Naive => Some(self.split_median(start, end, axis)),
            SplitMethod::Sah => self.split_sah(start, end, axis, &bounds, &centroid_bounds),
        };

        let mid = match mid {
            Some(mid) if mid > start && mid < end => mid,
            _ => return node_idx,
        };

        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[node_idx] = BVHNode::Interior { bounds, left, right };
        node_idx
    }

    fn split_median(&mut self, start: usize, end: usize, axis: usize) -> usize {
        let mid = start + (end - start) / 2;
        let centroids = &self.prim_centroids;
        self.indices[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            centroids[a][axis].partial_cmp(&centroids[b][axis]).unwrap_or(Ordering::Equal)
        });
        mid
    }

    fn bucket_of(&self, prim_idx: usize, axis: usize, centroid_bounds: &AABB) -> usize {
        let lo = centroid_bounds.p_min[axis];
        let extent = centroid_bounds.p_max[axis] - lo;
        let c = self.prim_centroids[prim_idx][axis];
        (((c - lo) / extent * SAH_BUCKETS as Float) as usize).min(SAH_BUCKETS - 1)
    }

    /// Returns `None` when a leaf is cheaper than any split.
    fn split_sah(&mut self, start: usize, end: usize, axis: usize,
                 bounds: &AABB, centroid_bounds: &AABB) -> Option<usize> {
        let mut buckets = [(0usize, AABB::default()); SAH_BUCKETS];
        for &idx in &self.indices[start..end] {
            let b = self.bucket_of(idx, axis, centroid_bounds);
            buckets[b].0 += 1;
            buckets[b].1.expand_by_aabb(&self.prim_bounds[idx]);
        }

        let area = bounds.surface_area().max(1e-6);
        let mut best: Option<(usize, Float)> = None;
        for split in 0..(SAH_BUCKETS - 1) {
            let (mut b0, mut b1) = (AABB::default(), AABB::default());
            let (mut count0, mut count1) = (0usize, 0usize);
            for (count, bb) in &buckets[..=split] {
                count0 += count;
                b0.expand_by_aabb(bb);
            }
            for (count, bb) in &buckets[split + 1..] {
                count1 += count;
                b1.expand_by_aabb(bb);
            }
            let cost = 1.0 + (count0 as Float * b0.surface_area()
                              + count1 as Float * b1.surface_area()) / area;
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((split, cost));
            }
        }

        let (split, cost) = best?;
        if cost >= (end - start) as Float {
            return None;
        }

        let mut mid = start;
        for i in start..end {
            if self.bucket_of(self.indices[i], axis, centroid_bounds) <= split {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }
        Some(mid)
    }

    fn compute_bounds(&self, start: usize, end: usize) -> (AABB, AABB) {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for &idx in &self.indices[start..end] {
            bounds.expand_by_aabb(&self.prim_bounds[idx]);
            centroid_bounds.expand_by_point(&self.prim_centroids[idx]);
        }
        (bounds, centroid_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shape::Shape;
    use crate::shapes::triangle::Triangle;

    fn build_triangles() -> Vec<Triangle> {
        let mut tris = Vec::new();
        for i in 0..32 {
            let x = (i % 8) as Float * 2.0;
            let z = (i / 8) as Float * -1.0;
            let p0 = Vector3f::new(x, 0.0, z);
            let p1 = Vector3f::new(x + 1.5, 0.0, z);
            let p2 = Vector3f::new(x, 1.5, z);
            tris.push(Triangle::new(p0, p1, p2));
        }
        tris
    }

    fn brute_force(triangles: &[Triangle], ray: &Ray3f) -> Option<(usize, Float)> {
        triangles.iter().enumerate()
            .filter_map(|(i, tri)| tri.ray_intersection(ray).map(|h| (i, h.t())))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let triangles = build_triangles();
        let bounds: Vec<AABB> = triangles.iter().map(|t| t.bounding_box()).collect();

        for method in [SplitMethod::Naive, SplitMethod::Sah] {
            let bvh = BVH::with_max_leaf_size(bounds.clone(), method, 2);
            assert!(bvh.node_count() > 1);

            for i in 0..40 {
                let origin = Vector3f::new(i as Float * 0.4 + 0.1, 0.3, 1.0);
                let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.05, -1.0), None, None);

                let bvh_hit = bvh.ray_intersection(&ray, |idx, r| {
                    triangles[idx].ray_intersection(r).map(|h| (h.t(), h.t()))
                });
                let expected = brute_force(&triangles, &ray);

                match (bvh_hit, expected) {
                    (Some((idx, t)), Some((e_idx, e_t))) => {
                        assert_eq!(idx, e_idx, "{:?} ray {}", method, i);
                        assert!((t - e_t).abs() < 1e-5);
                    }
                    (None, None) => {}
                    other => panic!("{:?} ray {} disagrees: {:?}", method, i, other),
                }

                let any = bvh.ray_intersection_t(&ray, |idx, r| triangles[idx].ray_intersection_t(r));
                assert_eq!(any, expected.is_some());
            }
        }
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = BVH::new(Vec::new(), SplitMethod::Naive);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(bvh.ray_intersection(&ray, |_, _| Some(((), 1.0))).is_none());
        assert!(!bvh.ray_intersection_t(&ray, |_, _| true));
    }
}
