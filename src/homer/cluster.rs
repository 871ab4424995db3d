//! Default hierarchy builder: balanced k-means over label columns.
//!
//! Each label is embedded as its instance-membership column (1.0 where the
//! label is true). Balanced assignment caps every cluster at `ceil(m / k)`
//! members so the synthesized tree stays shallow and even, which is the point
//! of an artificial hierarchy.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

use crate::dataset::MultiLabelDataset;
use crate::hierarchy::LabelHierarchy;

use super::{HierarchyBuilder, HomerError};

/// Tuning knobs for [`BalancedKMeansBuilder`].
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Maximum k-means refinement iterations per split.
    pub iterations: usize,
    /// RNG seed for centroid initialization.
    pub seed: u64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            iterations: 10,
            seed: 42,
        }
    }
}

/// Balanced k-means hierarchy builder.
#[derive(Debug, Clone, Default)]
pub struct BalancedKMeansBuilder {
    options: ClusterOptions,
}

impl BalancedKMeansBuilder {
    pub fn new(options: ClusterOptions) -> Self {
        Self { options }
    }
}

impl HierarchyBuilder for BalancedKMeansBuilder {
    fn build_label_hierarchy(
        &self,
        dataset: &MultiLabelDataset,
        num_clusters: usize,
    ) -> Result<LabelHierarchy, HomerError> {
        let labels = dataset.label_names();
        if num_clusters < 2 {
            return Err(HomerError::HierarchyConstruction {
                reason: format!("need at least 2 clusters, got {num_clusters}"),
            });
        }
        if labels.len() <= num_clusters {
            return Err(HomerError::HierarchyConstruction {
                reason: format!(
                    "cannot partition {} labels into {} clusters",
                    labels.len(),
                    num_clusters
                ),
            });
        }

        // Embed each label as its column over the instances.
        let columns: Vec<Vec<f32>> = (0..labels.len())
            .map(|col| {
                (0..dataset.num_rows())
                    .map(|row| {
                        if dataset.labels_of(row)[col].is_true() {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();

        let mut partitioner = Partitioner {
            labels,
            columns: &columns,
            num_clusters,
            iterations: self.options.iterations.max(1),
            rng: StdRng::seed_from_u64(self.options.seed),
            taken: labels.iter().map(|l| l.clone()).collect(),
            meta_counter: 0,
            pairs: Vec::new(),
        };
        let all: Vec<usize> = (0..labels.len()).collect();
        partitioner.split(&all, None);

        let pairs: Vec<(&str, Option<&str>)> = partitioner
            .pairs
            .iter()
            .map(|(name, parent)| (name.as_str(), parent.as_deref()))
            .collect();
        Ok(LabelHierarchy::from_parent_pairs(&pairs)?)
    }
}

struct Partitioner<'a> {
    labels: &'a [String],
    columns: &'a [Vec<f32>],
    num_clusters: usize,
    iterations: usize,
    rng: StdRng,
    /// Names already in use (original labels plus issued meta names).
    taken: BTreeSet<String>,
    meta_counter: usize,
    pairs: Vec<(String, Option<String>)>,
}

impl Partitioner<'_> {
    fn split(&mut self, group: &[usize], parent: Option<&str>) {
        if group.len() <= self.num_clusters {
            for &idx in group {
                self.pairs
                    .push((self.labels[idx].clone(), parent.map(String::from)));
            }
            return;
        }
        let clusters = self.balanced_kmeans(group);
        for cluster in clusters {
            match cluster.len() {
                0 => {}
                1 => self
                    .pairs
                    .push((self.labels[cluster[0]].clone(), parent.map(String::from))),
                _ => {
                    let meta = self.fresh_meta_name();
                    self.pairs.push((meta.clone(), parent.map(String::from)));
                    self.split(&cluster, Some(&meta));
                }
            }
        }
    }

    fn fresh_meta_name(&mut self) -> String {
        loop {
            let candidate = format!("meta{}", self.meta_counter);
            self.meta_counter += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Capacity-capped k-means over the group's label columns. Deterministic
    /// for a fixed seed: ties break on label position, then cluster index.
    fn balanced_kmeans(&mut self, group: &[usize]) -> Vec<Vec<usize>> {
        let k = self.num_clusters;
        let m = group.len();
        let capacity = m.div_ceil(k);

        let mut seeds: Vec<usize> = group.to_vec();
        seeds.shuffle(&mut self.rng);
        let mut centroids: Vec<Vec<f32>> = seeds
            .iter()
            .take(k)
            .map(|&idx| self.columns[idx].clone())
            .collect();

        let mut assignment = vec![usize::MAX; m];
        for _iter in 0..self.iterations {
            // Greedy balanced assignment: closest pairs first, capped per
            // cluster.
            let mut scored: Vec<(f32, usize, usize)> = Vec::with_capacity(m * k);
            for (pos, &idx) in group.iter().enumerate() {
                for (cluster, centroid) in centroids.iter().enumerate() {
                    scored.push((distance(&self.columns[idx], centroid), pos, cluster));
                }
            }
            scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

            let mut next = vec![usize::MAX; m];
            let mut sizes = vec![0usize; k];
            let mut placed = 0usize;
            for &(_, pos, cluster) in &scored {
                if next[pos] != usize::MAX || sizes[cluster] >= capacity {
                    continue;
                }
                next[pos] = cluster;
                sizes[cluster] += 1;
                placed += 1;
                if placed == m {
                    break;
                }
            }

            let converged = next == assignment;
            assignment = next;
            if converged {
                break;
            }

            // Recompute centroids as member means; empty clusters keep their
            // previous centroid.
            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<usize> = group
                    .iter()
                    .enumerate()
                    .filter(|(pos, _)| assignment[*pos] == cluster)
                    .map(|(_, &idx)| idx)
                    .collect();
                if members.is_empty() {
                    continue;
                }
                for value in centroid.iter_mut() {
                    *value = 0.0;
                }
                for &idx in &members {
                    for (value, x) in centroid.iter_mut().zip(&self.columns[idx]) {
                        *value += x;
                    }
                }
                let scale = 1.0 / members.len() as f32;
                for value in centroid.iter_mut() {
                    *value *= scale;
                }
            }
        }

        let mut clusters = vec![Vec::new(); k];
        for (pos, &idx) in group.iter().enumerate() {
            clusters[assignment[pos]].push(idx);
        }
        clusters
    }
}

fn distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
