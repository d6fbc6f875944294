//! Auswertung nach dem Readback: Prüfung gegen die Host-Referenz oder
//! Ausgabe der ersten Werte.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verdict {
    Correct,
    /// erstes abweichendes Element
    Incorrect { index: usize, expected: f32, actual: f32 },
    /// Ergebnis hat nicht die Länge der Eingaben
    Truncated { expected_len: usize, actual_len: usize },
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = if self.is_correct() { "correct" } else { "incorrect" };
        write!(f, "Result is {word}")
    }
}

/// Exakter Vergleich `c[i] == a[i] + b[i]`.
///
/// Die Host-Referenz rechnet in derselben IEEE-Einfachgenauigkeit wie der
/// Kernel, daher ohne Toleranz.
pub fn verify(a: &[f32], b: &[f32], c: &[f32]) -> Verdict {
    if a.len() != b.len() || c.len() != a.len() {
        return Verdict::Truncated { expected_len: a.len().max(b.len()), actual_len: c.len() };
    }

    a.iter()
        .zip(b)
        .zip(c)
        .enumerate()
        .find_map(|(index, ((&x, &y), &actual))| {
            let expected = x + y;
            (actual != expected).then_some(Verdict::Incorrect { index, expected, actual })
        })
        .unwrap_or(Verdict::Correct)
}

/// Die ersten `count` Werte als `C[i] = v`
pub fn sample(c: &[f32], count: usize) -> Vec<String> {
    c.iter()
        .take(count)
        .enumerate()
        .map(|(i, v)| format!("C[{i}] = {v}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_fill_sums_to_three() {
        let a = vec![1.0_f32; 1024];
        let b = vec![2.0_f32; 1024];
        let c = vec![3.0_f32; 1024];
        assert_eq!(verify(&a, &b, &c), Verdict::Correct);
        assert_eq!(verify(&a, &b, &c).to_string(), "Result is correct");
    }

    #[test]
    fn first_mismatch_is_reported() {
        let a = vec![1.0_f32; 8];
        let b = vec![2.0_f32; 8];
        let mut c = vec![3.0_f32; 8];
        c[5] = 0.0;
        c[7] = 0.0;
        assert_eq!(
            verify(&a, &b, &c),
            Verdict::Incorrect { index: 5, expected: 3.0, actual: 0.0 }
        );
        assert_eq!(verify(&a, &b, &c).to_string(), "Result is incorrect");
    }

    #[test]
    fn nan_output_is_incorrect() {
        let v = verify(&[1.0], &[2.0], &[f32::NAN]);
        assert!(!v.is_correct());
    }

    #[test]
    fn short_output_is_truncated() {
        let a = vec![1.0_f32; 4];
        let v = verify(&a, &a, &[2.0, 2.0]);
        assert_eq!(v, Verdict::Truncated { expected_len: 4, actual_len: 2 });
        assert!(!v.is_correct());
    }

    #[test]
    fn arbitrary_fill_matches_host_reference() {
        let a: Vec<f32> = (0..1024).map(|i| i as f32 * 0.1).collect();
        let b: Vec<f32> = (0..1024).map(|i| 1.0 / (i as f32 + 1.0)).collect();
        let c: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        assert!(verify(&a, &b, &c).is_correct());
    }

    #[test]
    fn sample_formats_first_values() {
        let lines = sample(&[3.0, 3.5, 4.0], 2);
        assert_eq!(lines, vec!["C[0] = 3", "C[1] = 3.5"]);
        assert_eq!(sample(&[1.0], 10).len(), 1);
    }
}
