//! Vector similarity.

/// Cosine similarity over the first `min(a.len(), b.len())` components.
///
/// Vectors of different lengths are compared on their common prefix, so
/// outputs of differently sized models can still be ranked together.
/// Returns 0.0 when either truncated vector has zero norm.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len().min(b.len());
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);

    for (&x, &y) in a[..n].iter().zip(&b[..n]) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
