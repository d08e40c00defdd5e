/// Cosine similarity over positionally aligned components.
///
/// Vectors of different length are compared over their common prefix. Empty or
/// zero-magnitude input yields 0.0, a neutral signal rather than an error.
pub fn cosine_similarity(left: &[f64], right: &[f64]) -> f64 {
    let (dot, left_norm, right_norm) = left
        .iter()
        .zip(right.iter())
        .fold((0.0, 0.0, 0.0), |(dot, left_norm, right_norm), (a, b)| {
            (dot + a * b, left_norm + a * a, right_norm + b * b)
        });

    let denominator = left_norm.sqrt() * right_norm.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    let similarity = dot / denominator;
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
