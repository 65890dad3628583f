//! Connected-component clustering of scored pairs

use std::collections::HashMap;

use serde::Serialize;

use super::scoring::ScoredPair;

/// A cluster of records linked transitively by above-threshold pairs.
///
/// `confidence` is the mean of the pair scores actually observed inside the
/// cluster — pairs never compared because blocking put them in different
/// blocks are excluded from the average, not treated as zero. A transitively
/// linked pair may therefore sit below the threshold; that is expected.
#[derive(Clone, Debug, Serialize)]
pub struct DuplicateCluster {
    /// Stable id assigned in enumeration order, before the confidence sort
    pub cluster_id: usize,
    /// Member record indices, ascending
    pub record_indices: Vec<usize>,
    /// Mean observed intra-cluster pair score
    pub confidence: f64,
    /// Mean per-field similarity over observed pairs
    pub field_similarities: HashMap<String, f64>,
}

/// Arena union-find over record indices. Records already carry stable
/// integer indices, so parent/rank live in flat arrays.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}

/// Union scored pairs into duplicate clusters.
///
/// Cluster ids follow enumeration order over the union-find roots; the
/// returned list is then sorted by confidence descending without
/// reassigning ids. Deterministic for a given input order.
pub fn cluster_pairs(scored_pairs: &[ScoredPair], record_count: usize) -> Vec<DuplicateCluster> {
    if scored_pairs.is_empty() {
        return Vec::new();
    }

    let mut uf = UnionFind::new(record_count);
    for pair in scored_pairs {
        uf.union(pair.left, pair.right);
    }

    // Group member indices by root, keeping first-seen root order
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut root_slot: HashMap<usize, usize> = HashMap::new();
    for pair in scored_pairs {
        for index in [pair.left, pair.right] {
            let root = uf.find(index);
            let slot = *root_slot.entry(root).or_insert_with(|| {
                groups.push((root, Vec::new()));
                groups.len() - 1
            });
            if !groups[slot].1.contains(&index) {
                groups[slot].1.push(index);
            }
        }
    }

    // Index observed pair scores for the aggregate pass
    let by_pair: HashMap<(usize, usize), &ScoredPair> = scored_pairs
        .iter()
        .map(|p| ((p.left, p.right), p))
        .collect();

    let mut clusters = Vec::new();
    for (cluster_id, (_, mut indices)) in groups.into_iter().enumerate() {
        if indices.len() < 2 {
            continue;
        }
        indices.sort_unstable();

        let mut total_score = 0.0;
        let mut observed_pairs = 0usize;
        let mut field_sums: HashMap<String, (f64, usize)> = HashMap::new();

        for i in 0..indices.len() {
            for j in (i + 1)..indices.len() {
                let key = (indices[i], indices[j]);
                if let Some(pair) = by_pair.get(&key) {
                    total_score += pair.score;
                    observed_pairs += 1;
                    for (field, score) in &pair.field_scores {
                        let entry = field_sums.entry(field.clone()).or_insert((0.0, 0));
                        entry.0 += score;
                        entry.1 += 1;
                    }
                }
            }
        }

        let confidence = if observed_pairs > 0 {
            total_score / observed_pairs as f64
        } else {
            0.0
        };
        let field_similarities = field_sums
            .into_iter()
            .map(|(field, (sum, count))| (field, sum / count as f64))
            .collect();

        clusters.push(DuplicateCluster {
            cluster_id,
            record_indices: indices,
            confidence,
            field_similarities,
        });
    }

    clusters.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cluster_id.cmp(&b.cluster_id))
    });
    clusters
}
