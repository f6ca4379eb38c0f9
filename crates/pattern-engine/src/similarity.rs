//! Cosine similarity.

use crate::error::PatternError;

/// Cosine similarity of two vectors, `dot(a, b) / (|a| * |b|)`.
///
/// Accumulates in `f64`. Fails when the lengths differ or either vector has
/// zero norm, instead of returning 0 or NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, PatternError> {
    if a.len() != b.len() {
        return Err(PatternError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(PatternError::ZeroNorm);
    }

    // Rounding can push identical vectors a hair past 1.
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// True when every component is zero.
pub(crate) fn is_zero_norm(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let v = [0.3, -1.2, 4.0, 0.0, 2.5];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaled_vector_is_identical_direction() {
        let sim = cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((sim + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_fails() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            PatternError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_zero_norm_fails() {
        assert!(matches!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]),
            Err(PatternError::ZeroNorm)
        ));
        assert!(matches!(
            cosine_similarity(&[], &[]),
            Err(PatternError::ZeroNorm)
        ));
    }

    #[test]
    fn test_is_zero_norm() {
        assert!(is_zero_norm(&[0.0, 0.0]));
        assert!(is_zero_norm(&[]));
        assert!(!is_zero_norm(&[0.0, 0.1]));
    }
}
