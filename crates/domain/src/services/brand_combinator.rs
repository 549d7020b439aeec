//! BrandCombinator - joint-promotion brand subsets

/// Enumerates brand subsets of size 2..=n
pub struct BrandCombinator;

impl BrandCombinator {
    /// Every subset of size 2..=n, by increasing size and, within a size,
    /// in the relative order of `items`. Fewer than two items yield nothing.
    pub fn combinations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
        let n = items.len();
        let mut result = Vec::with_capacity(Self::expected_count(n));

        for size in 2..=n {
            let mut indices: Vec<usize> = (0..size).collect();
            loop {
                result.push(indices.iter().map(|&i| items[i].clone()).collect());

                // Rightmost index that can still advance
                let Some(pivot) = (0..size).rev().find(|&i| indices[i] != i + n - size) else {
                    break;
                };
                indices[pivot] += 1;
                for i in pivot + 1..size {
                    indices[i] = indices[i - 1] + 1;
                }
            }
        }

        result
    }

    /// `2^n - n - 1`
    pub fn expected_count(n: usize) -> usize {
        if n < 2 {
            return 0;
        }
        (1usize << n) - n - 1
    }
}
