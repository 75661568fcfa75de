use itertools::iproduct;
use std::ops::{Index, IndexMut};

/// A dense scalar field over the nodes of a grid.
///
/// Nodes are addressed with 1-based `(i, j, k)` triples. Storage is row-major with
/// `k` varying fastest, so the flat offset of a node is
/// `(i - 1) * ny * nz + (j - 1) * nz + (k - 1)`, which is also the ordering of the
/// unknowns in the assembled linear system.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField<T> {
    dims: [usize; 3],
    data: Vec<T>,
}

impl<T: Copy> GridField<T> {
    pub fn filled(dims: [usize; 3], value: T) -> Self {
        Self {
            dims,
            data: vec![value; dims[0] * dims[1] * dims[2]],
        }
    }

    pub fn from_fn<F>(dims: [usize; 3], mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> T,
    {
        let data = iproduct!(1..=dims[0], 1..=dims[1], 1..=dims[2])
            .map(|(i, j, k)| f(i, j, k))
            .collect();
        Self { dims, data }
    }

    /// Wraps a flat vector laid out in the field's row-major order.
    ///
    /// Returns `None` when the length does not match the dimensions.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Option<Self> {
        (data.len() == dims[0] * dims[1] * dims[2]).then_some(Self { dims, data })
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, i: usize, j: usize, k: usize) -> bool {
        (1..=self.dims[0]).contains(&i)
            && (1..=self.dims[1]).contains(&j)
            && (1..=self.dims[2]).contains(&k)
    }

    /// Row-major offset of node `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics if the node lies outside the field.
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        assert!(
            self.in_bounds(i, j, k),
            "node ({i}, {j}, {k}) is outside a field of dimensions {:?}",
            self.dims
        );
        (i - 1) * self.dims[1] * self.dims[2] + (j - 1) * self.dims[2] + (k - 1)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> T {
        self.data[self.flat_index(i, j, k)]
    }

    #[inline]
    pub fn try_get(&self, i: usize, j: usize, k: usize) -> Option<T> {
        self.in_bounds(i, j, k).then(|| self.get(i, j, k))
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: T) {
        let idx = self.flat_index(i, j, k);
        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn map<U, F>(&self, f: F) -> GridField<U>
    where
        U: Copy,
        F: FnMut(T) -> U,
    {
        GridField {
            dims: self.dims,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    /// All node triples in storage order.
    pub fn indices(&self) -> impl Iterator<Item = (usize, usize, usize)> + use<T> {
        let [nx, ny, nz] = self.dims;
        iproduct!(1..=nx, 1..=ny, 1..=nz)
    }

    /// Node triples that are not on a face of the grid, in storage order.
    pub fn interior_indices(&self) -> impl Iterator<Item = (usize, usize, usize)> + use<T> {
        let [nx, ny, nz] = self.dims;
        iproduct!(2..nx, 2..ny, 2..nz)
    }
}

impl<T: Copy + Into<f64>> GridField<T> {
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v.into()).sum()
    }
}

impl<T: Copy> Index<(usize, usize, usize)> for GridField<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j, k): (usize, usize, usize)) -> &Self::Output {
        &self.data[self.flat_index(i, j, k)]
    }
}

impl<T: Copy> IndexMut<(usize, usize, usize)> for GridField<T> {
    #[inline]
    fn index_mut(&mut self, (i, j, k): (usize, usize, usize)) -> &mut Self::Output {
        let idx = self.flat_index(i, j, k);
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_is_row_major_with_k_fastest() {
        let field = GridField::filled([3, 4, 5], 0.0);
        assert_eq!(field.flat_index(1, 1, 1), 0);
        assert_eq!(field.flat_index(1, 1, 2), 1);
        assert_eq!(field.flat_index(1, 2, 1), 5);
        assert_eq!(field.flat_index(2, 1, 1), 20);
        assert_eq!(field.flat_index(3, 4, 5), 59);
    }

    #[test]
    fn from_fn_visits_nodes_in_storage_order() {
        let field = GridField::from_fn([2, 2, 2], |i, j, k| (100 * i + 10 * j + k) as f64);
        assert_eq!(field.as_slice()[0], 111.0);
        assert_eq!(field.as_slice()[1], 112.0);
        assert_eq!(field.as_slice()[7], 222.0);
        assert_eq!(field.get(2, 1, 2), 212.0);
    }

    #[test]
    fn set_and_index_write_the_same_node() {
        let mut field = GridField::filled([3, 3, 3], 0.0);
        field.set(2, 3, 1, 4.0);
        field[(1, 1, 3)] = 7.0;
        assert_eq!(field[(2, 3, 1)], 4.0);
        assert_eq!(field.get(1, 1, 3), 7.0);
        assert_eq!(field.sum(), 11.0);
    }

    #[test]
    fn try_get_returns_none_outside_the_field() {
        let field = GridField::filled([2, 2, 2], 1.0);
        assert_eq!(field.try_get(0, 1, 1), None);
        assert_eq!(field.try_get(1, 3, 1), None);
        assert_eq!(field.try_get(2, 2, 2), Some(1.0));
    }

    #[test]
    #[should_panic(expected = "outside a field")]
    fn get_panics_on_zero_index() {
        let field = GridField::filled([2, 2, 2], 1.0);
        field.get(0, 1, 1);
    }

    #[test]
    fn interior_indices_skip_faces() {
        let field = GridField::filled([4, 3, 5], 0.0);
        let interior: Vec<_> = field.interior_indices().collect();
        assert_eq!(interior.len(), 2 * 1 * 3);
        assert!(interior.iter().all(|&(i, j, k)| i > 1 && i < 4 && j == 2 && k > 1 && k < 5));
    }

    #[test]
    fn indices_cover_every_node() {
        let field = GridField::filled([2, 3, 4], 0u8);
        assert_eq!(field.indices().count(), field.len());
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(GridField::from_vec([2, 2, 2], vec![0.0; 8]).is_some());
        assert!(GridField::from_vec([2, 2, 2], vec![0.0; 7]).is_none());
    }

    #[test]
    fn map_preserves_dimensions() {
        let field = GridField::filled([2, 3, 1], 2.0);
        let mapped = field.map(|v| v > 1.0);
        assert_eq!(mapped.dims(), [2, 3, 1]);
        assert!(mapped.as_slice().iter().all(|&b| b));
    }
}
