/// Added to the norm before dividing so all-zero embeddings stay finite.
pub const NORM_EPSILON: f64 = 1e-6;

/// Returns `v / (||v|| + ε)`.
///
/// Accumulates in f64 so long embeddings (512-d and up) keep their precision.
/// An all-zero input yields an all-zero output.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// In-place variant of [`normalize`].
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v);
    let scale = 1.0 / (norm + NORM_EPSILON);
    for x in v.iter_mut() {
        *x = (*x as f64 * scale) as f32;
    }
}

/// Euclidean length of `v`.
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| (x as f64) * (x as f64))
        .sum::<f64>()
        .sqrt()
}

/// Dot product. For unit vectors this is the cosine similarity.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x as f64) * (y as f64))
        .sum::<f64>() as f32
}

/// Cosine similarity between two vectors of any length.
/// Returns 0 when either side has zero norm.
pub fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    let denom = l2_norm(a) * l2_norm(b);
    if denom == 0.0 {
        return 0.0;
    }
    (dot(a, b) as f64 / denom) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_unit_length() {
        let v = normalize(&[3.0, 4.0]);
        let norm = l2_norm(&v);
        assert!((norm - 1.0).abs() < 1e-5, "should be unit length, got {norm}");
        assert!((v[0] - 0.6).abs() < 1e-5);
        assert!((v[1] - 0.8).abs() < 1e-5);
    }

    #[test]
    fn normalize_zero_vector_stays_zero() {
        let v = normalize(&[0.0, 0.0, 0.0]);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
        assert!(v.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs: [&[f32]; 4] = [
            &[1.0, 2.0, 3.0],
            &[-0.5, 0.25, 10.0, 7.0],
            &[0.3, 0.0, -0.4],
            &[42.0],
        ];
        for v in inputs {
            let once = normalize(v);
            let twice = normalize(&once);
            for (a, b) in once.iter().zip(&twice) {
                assert!((a - b).abs() < 1e-4, "normalize not idempotent for {v:?}");
            }
        }
    }

    #[test]
    fn tiny_norm_vectors_stay_finite_and_shrink() {
        // With ||v|| near ε the result falls short of unit length.
        for v in [[1e-3f32, 0.0, -1e-3], [1e-7, 1e-7, 0.0]] {
            let out = normalize(&v);
            assert!(out.iter().all(|x| x.is_finite()), "non-finite for {v:?}");
            let n = l2_norm(&out);
            assert!(n < 1.0, "norm {n} for {v:?}");
            let expected = l2_norm(&v) / (l2_norm(&v) + NORM_EPSILON);
            assert!((n - expected).abs() < 1e-4, "norm {n}, expected {expected}");
        }
    }

    #[test]
    fn dot_of_unit_vectors_is_cosine() {
        let a = normalize(&[1.0, 1.0, 0.0]);
        let b = normalize(&[1.0, 0.0, 0.0]);
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((dot(&a, &b) - expected).abs() < 1e-5);
        assert!((cosine_sim(&[1.0, 1.0, 0.0], &[2.0, 0.0, 0.0]) - expected).abs() < 1e-6);
    }

    #[test]
    fn cosine_sim_degenerate() {
        assert_eq!(cosine_sim(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        let opposite = cosine_sim(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((opposite + 1.0).abs() < 1e-6);
    }
}
