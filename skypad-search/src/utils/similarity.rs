//! Vector similarity functions.

use ndarray::ArrayView1;

/// Compute the cosine similarity between two f32 slices.
///
/// Returns `0.0` for empty slices, mismatched lengths, or zero vectors, so a
/// candidate with a malformed embedding simply ranks as unrelated.
/// Returns a value in `[-1.0, 1.0]` for valid non-zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if !same_dimensions(a, b) {
        return 0.0;
    }

    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);

    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    a.dot(&b) / (norm_a * norm_b)
}

/// True when both vectors are non-empty and share a dimensionality.
pub fn same_dimensions(a: &[f32], b: &[f32]) -> bool {
    !a.is_empty() && a.len() == b.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn identical_vectors_score_one() {
        let v = [1.0_f32, 2.0, 3.0];
        assert!(approx_eq(cosine_similarity(&v, &v), 1.0));
    }

    #[test]
    fn self_similarity_for_assorted_vectors() {
        let vectors: [&[f32]; 4] = [
            &[0.5, -0.25, 4.0],
            &[1e-3, 1e-3],
            &[-7.0],
            &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        ];
        for v in vectors {
            let s = cosine_similarity(v, v);
            assert!((s - 1.0).abs() < 1e-5, "self-similarity of {v:?} was {s}");
        }
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs: [(&[f32], &[f32]); 3] = [
            (&[3.0, 4.0], &[4.0, 3.0]),
            (&[1.0, -2.0, 0.5], &[-0.3, 0.9, 2.0]),
            (&[0.0, 0.0], &[1.0, 1.0]),
        ];
        for (a, b) in pairs {
            assert_eq!(cosine_similarity(a, b), cosine_similarity(b, a));
        }
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let a = [1.0_f32, 0.0, 0.0];
        let b = [-1.0_f32, 0.0, 0.0];
        assert!(approx_eq(cosine_similarity(&a, &b), -1.0));
    }

    #[test]
    fn known_vectors() {
        // dot = 24, |a| = |b| = 5
        assert!(approx_eq(cosine_similarity(&[3.0, 4.0], &[4.0, 3.0]), 0.96));
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zero = [0.0_f32, 0.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn same_dimensions_rejects_empty() {
        assert!(!same_dimensions(&[], &[]));
        assert!(same_dimensions(&[1.0], &[2.0]));
        assert!(!same_dimensions(&[1.0], &[2.0, 3.0]));
    }
}
