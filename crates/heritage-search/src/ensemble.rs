//! Z-score fusion of per-model rankings.

use std::collections::HashMap;

use crate::searcher::SearchHit;

/// One model's ranked hits and its blending weight
#[derive(Debug, Clone)]
pub struct ModelHits {
    pub model: String,
    pub weight: f64,
    pub hits: Vec<SearchHit>,
}

/// Blend per-model rankings into one list of at most `top_k` hits.
///
/// Each model's scores are normalized against that model's own result set
/// (population standard deviation, 1 when zero). An artifact a model did not
/// return gets no term from that model. Ties keep first-appearance order.
pub fn fuse_zscores(per_model: Vec<ModelHits>, top_k: usize) -> Vec<SearchHit> {
    struct Accumulator {
        hit: SearchHit,
        weighted_sum: f64,
        terms: usize,
    }

    let mut order: Vec<String> = Vec::new();
    let mut fused: HashMap<String, Accumulator> = HashMap::new();

    for ModelHits { weight, hits, .. } in per_model {
        if hits.is_empty() {
            continue;
        }
        let (mean, std) = mean_and_std(hits.iter().map(|h| h.score));

        for hit in hits {
            let z = (hit.score - mean) / std;
            match fused.get_mut(&hit.artifact.id) {
                Some(acc) => {
                    acc.weighted_sum += weight * z;
                    acc.terms += 1;
                }
                None => {
                    order.push(hit.artifact.id.clone());
                    fused.insert(
                        hit.artifact.id.clone(),
                        Accumulator {
                            hit,
                            weighted_sum: weight * z,
                            terms: 1,
                        },
                    );
                }
            }
        }
    }

    let mut results: Vec<SearchHit> = order
        .into_iter()
        .filter_map(|id| fused.remove(&id))
        .map(|acc| SearchHit {
            score: acc.weighted_sum / acc.terms as f64,
            ..acc.hit
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(top_k);
    results
}

fn mean_and_std(scores: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = scores.clone().count() as f64;
    let mean = scores.clone().sum::<f64>() / n;
    let variance = scores.map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    (mean, if std == 0.0 { 1.0 } else { std })
}
