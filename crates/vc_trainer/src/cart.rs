//! CART classification tree builder
//!
//! Greedy binary splits minimizing weighted Gini impurity over a random
//! subset of features at each node. Leaves store the fraction of acquired
//! samples that reached them.

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::matrix::FeatureMatrix;

/// One tree node; leaves carry a value, internal nodes a split.
/// Rows with `x[feature_index] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub feature_index: u32,
    pub threshold: f32,
    pub left: u32,
    pub right: u32,
    pub value: Option<f32>,
}

impl Node {
    fn leaf(value: f32) -> Self {
        Self {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }
}

/// Flat node array; the root is node 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Leaf value reached by row `row` of `features`
    pub fn predict(&self, features: &FeatureMatrix, row: usize) -> f32 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if let Some(value) = node.value {
                return value;
            }
            idx = if features.get(row, node.feature_index as usize) <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.value.is_some()).count()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            max_depth = max_depth.max(depth);
            if node.value.is_none() {
                stack.push((node.left as usize, depth + 1));
                stack.push((node.right as usize, depth + 1));
            }
        }
        max_depth
    }
}

/// Growth limits for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Non-constant features examined per node
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

/// Pending node: its slot, its samples and its depth
struct Task {
    slot: usize,
    samples: Vec<usize>,
    depth: usize,
}

/// n times the Gini impurity of a node with `pos` positives out of `n`
fn weighted_gini(n: usize, pos: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let (n, pos) = (n as f64, pos as f64);
    let neg = n - pos;
    n - (pos * pos + neg * neg) / n
}

/// Threshold strictly below `hi` and not below `lo`
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = lo / 2.0 + hi / 2.0;
    if mid >= hi || mid < lo {
        lo
    } else {
        mid
    }
}

/// Builds classification trees over a shared feature matrix
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a FeatureMatrix,
    labels: &'a [u8],
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a FeatureMatrix, labels: &'a [u8], config: TreeConfig) -> Self {
        Self {
            config,
            features,
            labels,
        }
    }

    /// Grow a tree on `samples` (row indices, repeats allowed)
    pub fn build(&self, samples: Vec<usize>, rng: &mut StdRng) -> Tree {
        let mut nodes = vec![Node::leaf(0.0)];
        let mut order: Vec<usize> = (0..self.features.n_cols()).collect();
        let mut scratch: Vec<(f32, u8)> = Vec::with_capacity(samples.len());
        let mut stack = vec![Task {
            slot: 0,
            samples,
            depth: 0,
        }];

        while let Some(task) = stack.pop() {
            let n = task.samples.len();
            let pos = self.positives(&task.samples);
            let value = if n == 0 { 0.0 } else { pos as f32 / n as f32 };

            if self.is_terminal(n, pos, task.depth) {
                nodes[task.slot] = Node::leaf(value);
                continue;
            }

            let Some(split) = self.find_best_split(&task.samples, pos, &mut order, &mut scratch, rng)
            else {
                nodes[task.slot] = Node::leaf(value);
                continue;
            };

            let column = self.features.column(split.feature);
            let (left, right): (Vec<usize>, Vec<usize>) = task
                .samples
                .iter()
                .partition(|&&i| column[i] <= split.threshold);

            let left_slot = nodes.len();
            let right_slot = left_slot + 1;
            nodes.push(Node::leaf(0.0));
            nodes.push(Node::leaf(0.0));
            nodes[task.slot] = Node {
                feature_index: split.feature as u32,
                threshold: split.threshold,
                left: left_slot as u32,
                right: right_slot as u32,
                value: None,
            };

            stack.push(Task {
                slot: right_slot,
                samples: right,
                depth: task.depth + 1,
            });
            stack.push(Task {
                slot: left_slot,
                samples: left,
                depth: task.depth + 1,
            });
        }

        Tree { nodes }
    }

    fn positives(&self, samples: &[usize]) -> usize {
        samples.iter().filter(|&&i| self.labels[i] == 1).count()
    }

    fn is_terminal(&self, n: usize, pos: usize, depth: usize) -> bool {
        n < self.config.min_samples_split.max(2)
            || n < 2 * self.config.min_samples_leaf
            || pos == 0
            || pos == n
            || self.config.max_depth.is_some_and(|d| depth >= d)
    }

    /// Draw features without replacement until `max_features` non-constant
    /// ones have been scored; constant features do not count.
    fn find_best_split(
        &self,
        samples: &[usize],
        pos: usize,
        order: &mut [usize],
        scratch: &mut Vec<(f32, u8)>,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n_features = order.len();
        let budget = self.config.max_features.clamp(1, n_features.max(1));
        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;

        for k in 0..n_features {
            if visited >= budget {
                break;
            }
            let j = rng.gen_range(k..n_features);
            order.swap(k, j);
            let feature = order[k];

            let Some(candidate) = self.best_threshold(feature, samples, pos, scratch) else {
                continue;
            };
            visited += 1;

            // strict improvement keeps the earliest drawn feature on ties
            if best.map_or(true, |b| candidate.impurity < b.impurity) {
                best = Some(candidate);
            }
        }

        best
    }

    /// Best threshold on one feature; None for a constant feature or when
    /// no threshold respects `min_samples_leaf`.
    fn best_threshold(
        &self,
        feature: usize,
        samples: &[usize],
        pos: usize,
        scratch: &mut Vec<(f32, u8)>,
    ) -> Option<SplitCandidate> {
        let column = self.features.column(feature);
        let first = column[samples[0]];
        if samples.iter().all(|&i| column[i] == first) {
            return None;
        }

        scratch.clear();
        scratch.extend(samples.iter().map(|&i| (column[i], self.labels[i])));
        scratch.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let n = scratch.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;
        let mut left_n = 0;
        let mut left_pos = 0;

        for k in 0..n - 1 {
            left_n += 1;
            left_pos += scratch[k].1 as usize;
            let (lo, hi) = (scratch[k].0, scratch[k + 1].0);
            if lo == hi || left_n < min_leaf || n - left_n < min_leaf {
                continue;
            }
            let impurity = weighted_gini(left_n, left_pos) + weighted_gini(n - left_n, pos - left_pos);
            if best.map_or(true, |b| impurity < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: midpoint(lo, hi),
                    impurity,
                });
            }
        }

        best
    }
}
