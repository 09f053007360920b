//! Cosine similarity with lenient handling of degenerate input.
//!
//! - Vectors of different length: the shorter one is zero-padded.
//! - NaN / ±inf components count as 0 in the dot product and both norms.
//! - A zero norm on either side gives similarity 0, never NaN.
//!
//! Each side is divided by its largest finite magnitude before summing, so
//! very large or very small components neither overflow nor underflow.

/// Cosine similarity in [-1, 1].
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let scale_a = max_magnitude(a);
    let scale_b = max_magnitude(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }

    let len = a.len().max(b.len());
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for i in 0..len {
        let x = component(a, i) / scale_a;
        let y = component(b, i) / scale_b;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if !denom.is_finite() || denom == 0.0 {
        return 0.0;
    }
    let sim = dot / denom;
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Largest finite |component|, 0 for an all-zero or empty vector.
fn max_magnitude(v: &[f64]) -> f64 {
    v.iter()
        .filter(|x| x.is_finite())
        .fold(0.0_f64, |m, x| m.max(x.abs()))
}

/// Component `i`, or 0 when absent or non-finite.
#[inline]
fn component(v: &[f64], i: usize) -> f64 {
    match v.get(i) {
        Some(x) if x.is_finite() => *x,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_similarity_is_one() {
        let v = [0.3, -0.2, 0.9, 0.5];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthogonal_is_zero() {
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn opposite_is_minus_one() {
        let a = [0.4, -0.1, 0.7];
        let b = [-0.4, 0.1, -0.7];
        assert!((cosine(&a, &b) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_is_zero() {
        assert_eq!(cosine(&[0.0; 12], &[0.5; 12]), 0.0);
        assert_eq!(cosine(&[0.5; 12], &[0.0; 12]), 0.0);
        assert_eq!(cosine(&[], &[]), 0.0);
        assert_eq!(cosine(&[], &[1.0]), 0.0);
    }

    #[test]
    fn non_finite_components_count_as_zero() {
        let a = [1.0, f64::NAN, 0.0];
        let b = [1.0, 5.0, f64::INFINITY];
        // effectively [1,0,0] vs [1,5,0]
        let expected = 1.0 / 26f64.sqrt();
        assert!((cosine(&a, &b) - expected).abs() < 1e-12);
        assert_eq!(cosine(&[f64::NAN; 4], &[1.0; 4]), 0.0);
    }

    #[test]
    fn mismatched_length_pads_shorter() {
        let short = [1.0, 2.0];
        let long = [1.0, 2.0, 3.0];
        let padded = [1.0, 2.0, 0.0];
        assert_eq!(cosine(&short, &long), cosine(&padded, &long));
        assert_eq!(cosine(&long, &short), cosine(&long, &padded));
    }

    #[test]
    fn huge_components_keep_self_similarity() {
        let a = [f64::MAX, f64::MAX];
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-12);

        let b = [1e200, 2e200, 3e200];
        assert!((cosine(&b, &b) - 1.0).abs() < 1e-12);
        let opposite = [-1e200, -2e200, -3e200];
        assert!((cosine(&b, &opposite) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn tiny_components_keep_self_similarity() {
        let a = [1e-200, 2e-200];
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-12);

        let sub = [f64::MIN_POSITIVE / 4.0, f64::MIN_POSITIVE / 2.0];
        assert!((cosine(&sub, &sub) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scale_does_not_change_similarity() {
        let a = [0.3, -0.2, 0.9];
        let b = [0.1, 0.4, 0.8];
        let big: Vec<f64> = a.iter().map(|x| x * 1e250).collect();
        let small: Vec<f64> = b.iter().map(|x| x * 1e-250).collect();
        assert!((cosine(&big, &small) - cosine(&a, &b)).abs() < 1e-12);
    }
}
