use crate::C;

/// Solves the dense `n` x `n` system `a * x = b` in place by Gaussian
/// elimination with partial pivoting.
///
/// `a` is row-major. Returns `None` if `a` is singular.
pub(crate) fn solve(mut a: Vec<C>, mut b: Vec<C>) -> Option<Vec<C>> {
    let n = b.len();
    debug_assert_eq!(a.len(), n * n);

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i * n + col].abs().total_cmp(&a[j * n + col].abs())
        })?;
        if a[pivot * n + col].abs() < C::EPSILON {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap(pivot * n + k, col * n + k);
            }
            b.swap(pivot, col);
        }
        for row in col + 1..n {
            let factor = a[row * n + col] / a[col * n + col];
            if factor != 0.0 {
                for k in col..n {
                    a[row * n + k] -= factor * a[col * n + k];
                }
                b[row] -= factor * b[col];
            }
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: C = (row + 1..n).map(|k| a[row * n + k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row * n + row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::solve;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve() {
        #[rustfmt::skip]
        let a = vec![
            0.0, 2.0, 1.0,
            1.0, 1.0, 0.0,
            3.0, 0.0, 1.0,
        ];
        let x = solve(a, vec![5.0, 3.0, 6.0]).unwrap();
        assert_relative_eq!(x[0], 1.4, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.6, epsilon = 1e-12);
        assert_relative_eq!(x[2], 1.8, epsilon = 1e-12);
    }

    #[test]
    fn test_singular() {
        assert!(solve(vec![1.0, 2.0, 2.0, 4.0], vec![1.0, 2.0]).is_none());
    }
}
